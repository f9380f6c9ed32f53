pub mod config;
pub mod error;
pub mod text;
pub mod types;

pub use config::NikConfig;
pub use error::{NikError, Result};
pub use types::*;
