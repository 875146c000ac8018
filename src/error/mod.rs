mod app_error;
mod error_num;

pub use app_error::{AppError, AppResult};
pub use error_num::ErrorNum;
