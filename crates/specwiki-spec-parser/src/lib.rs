//! Swagger 2.0 spec parser.
//!
//! Loads a YAML/JSON spec into an order-preserving tree, resolves the
//! `definitions` registry, extracts `paths` operations grouped by tag, and
//! links every `$ref` so the resulting [`ApiModel`] needs no further lookups.

pub mod definitions;
pub mod error;
pub mod linker;
pub mod model;
pub mod node;
pub mod parser;
pub mod paths;

pub use error::ParseError;
pub use model::{ApiModel, Definitions, Group, Groups, Operation, Param, Schema, DEFAULT_GROUP};
pub use node::Node;
pub use parser::{build_model, parse_spec, parse_spec_file};
