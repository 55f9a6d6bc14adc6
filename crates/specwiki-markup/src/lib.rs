//! Renders a linked API model as Jira wiki markup.
//!
//! One `h3.` section per group, one `h4.` subsection per operation, and up to
//! three parameter tables (query, request, response) per operation. Nested
//! attributes are flattened into rows with dotted names.

pub mod markup;
pub mod render;

pub use render::{render, render_model};
