//! XML document access.

mod reader;

pub use reader::{Element, XmlDocument};

use crate::error::ExtractionError;

/// Result type for XML operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
