//! Key-path parsing and the top-level access engine.

mod engine;
mod error;
mod path;

pub use engine::{AccessEngine, GetResult, UnknownKeyPolicy};
pub use error::AccessError;
pub use path::{KEY_PATH_DELIMITER, KeyPath, PathParseError};
