pub mod config_gen;
pub mod link_management;

pub use config_gen::generate_config;
pub use link_management::{create_link, deactivate_link, link_info, list_links, link_stats, resolve_link};
