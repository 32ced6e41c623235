pub mod error;
pub mod utils;

pub use error::{InvocationFailure, Result, ReviewError};
pub use utils::{diagnostic_line, truncate_chars};
