pub mod contacts;
pub mod fallback;
pub mod system;
