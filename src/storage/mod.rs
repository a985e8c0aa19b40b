pub mod backend;
pub mod models;
mod store;

pub use backend::{Backend, SeaOrmStorage};
pub use models::{DeactivateOutcome, Link, LinkId, NewLink, OwnerId};
pub use store::LinkStore;
