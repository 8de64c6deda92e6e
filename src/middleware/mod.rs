pub mod response;
pub mod upload;

pub use response::{ApiResponse, ApiResult};
pub use upload::ContactForm;
