use std::path::Path;

use tracing::debug;

use crate::definitions::resolve_definitions;
use crate::error::ParseError;
use crate::linker::{link_definitions, link_operations};
use crate::model::ApiModel;
use crate::node::Node;
use crate::paths::extract_operations;

/// Parse a Swagger 2.0 style spec from a YAML/JSON string into a linked model.
pub fn parse_spec(input: &str) -> Result<ApiModel, ParseError> {
    let root = Node::from_yaml(input)?;
    build_model(&root)
}

/// Parse a spec from a file path.
pub fn parse_spec_file(path: &Path) -> Result<ApiModel, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_spec(&content)
}

/// Build the model from an already loaded document tree.
pub fn build_model(root: &Node) -> Result<ApiModel, ParseError> {
    // Non-mapping roots are rejected here rather than silently ignored.
    root.as_mapping("document")?;

    let raw_definitions = resolve_definitions(root)?;
    let mut groups = extract_operations(root)?;

    let definitions = link_definitions(&raw_definitions);
    link_operations(&mut groups, &definitions);

    let model = ApiModel {
        groups,
        definitions,
    };
    debug!(
        groups = model.groups.len(),
        operations = model.operation_count(),
        definitions = model.definitions.len(),
        "built api model"
    );
    Ok(model)
}
