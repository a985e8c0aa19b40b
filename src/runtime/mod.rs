pub mod lifetime;

pub use lifetime::shutdown::shutdown;
pub use lifetime::startup::{StartupContext, prepare_startup};
