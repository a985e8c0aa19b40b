//! Service layer for business logic

mod allocator;
mod link_service;
pub mod owner;

pub use allocator::{CodeAllocator, MAX_CODE_LEN};
pub use link_service::*;
pub use owner::{HttpOwnerDirectory, OwnerDirectory, StaticOwnerDirectory, create_owner_directory};
