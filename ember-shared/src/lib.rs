pub mod db;
pub mod errors;
pub mod middleware;
pub mod retry;
pub mod types;

pub use errors::{AppError, AppResult, ErrorCode};
pub use retry::with_retry;
pub use types::*;
