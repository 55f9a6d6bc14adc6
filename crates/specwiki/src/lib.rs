//! specwiki library.
//!
//! Exposes the conversion pipeline and the serving mode for the `specwiki`
//! binary and its tests.

pub mod convert;
pub mod server;

pub use convert::{convert_file, convert_str, ConversionSummary, ConvertError, OutputFormat};
pub use server::{serve, ConvertService, ServeConfig};
