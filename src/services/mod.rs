pub mod avatar_storage;
pub mod contact_service;

pub use avatar_storage::{AvatarStorage, UploadError};
pub use contact_service::{ContactPage, ContactService};
