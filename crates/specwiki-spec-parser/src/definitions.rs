//! Builds the registry of named schemas from the `definitions` section.

use tracing::debug;

use crate::error::ParseError;
use crate::model::{Definitions, Param, Schema};
use crate::node::{child_path, Node};

/// Locator prefix stripped from `$ref` values.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Build the (unlinked) definitions registry from the document root.
///
/// A missing `definitions` key yields an empty registry. Nested references
/// are left as bare names for the linker to resolve.
pub fn resolve_definitions(root: &Node) -> Result<Definitions, ParseError> {
    let mut definitions = Definitions::new();

    let Some(section) = root.get("definitions") else {
        return Ok(definitions);
    };

    for (name, body) in section.as_mapping("definitions")? {
        let at = child_path("definitions", name);
        let schema = parse_definition(name, body, &at)?;
        debug!(
            definition = %name,
            attributes = schema.attributes.len(),
            "parsed definition"
        );
        // A repeated name replaces the earlier definition.
        definitions.insert(name.clone(), schema);
    }

    Ok(definitions)
}

fn parse_definition(name: &str, body: &Node, at: &str) -> Result<Schema, ParseError> {
    let mut schema = Schema::reference(name);
    let mut required = Vec::new();

    for (key, value) in body.as_mapping(at)? {
        let at = child_path(at, key);
        match key.as_str() {
            "properties" => {
                for (property, node) in value.as_mapping(&at)? {
                    let param = parse_property(property, node, &child_path(&at, property))?;
                    schema.attributes.push(param);
                }
            }
            "required" => required = value.as_string_list(&at)?,
            _ => {}
        }
    }

    mark_required(&mut schema, &required);
    Ok(schema)
}

/// Flag every attribute named in `required`. Unknown names are ignored.
fn mark_required(schema: &mut Schema, required: &[String]) {
    for attribute in &mut schema.attributes {
        if required.iter().any(|r| *r == attribute.name) {
            attribute.mandatory = true;
            schema.has_mandatory_params = true;
        }
    }
}

/// Parse one schema property. Keys apply in document order, so a later
/// `type` overrides an `array of ...` type set by an earlier `items`.
fn parse_property(name: &str, node: &Node, at: &str) -> Result<Param, ParseError> {
    let mut param = Param {
        name: name.to_string(),
        ..Param::default()
    };

    for (key, value) in node.as_mapping(at)? {
        let at = child_path(at, key);
        match key.as_str() {
            "type" => param.param_type = value.as_str(&at)?.to_string(),
            "description" => param.description = value.as_str(&at)?.to_string(),
            "$ref" => param.schema = Schema::reference(ref_name(value.as_str(&at)?)),
            "items" => {
                for (item_key, item_value) in value.as_mapping(&at)? {
                    let at = child_path(&at, item_key);
                    match item_key.as_str() {
                        "$ref" => {
                            param.schema = Schema::reference(ref_name(item_value.as_str(&at)?))
                        }
                        "type" => param.param_type = format!("array of {}", item_value.as_str(&at)?),
                        "description" => param.description = item_value.as_str(&at)?.to_string(),
                        _ => {}
                    }
                }
            }
            "enum" => param.enum_values = value.as_string_list(&at)?,
            _ => {}
        }
    }

    Ok(param)
}

/// Strip the `#/definitions/` locator from a reference.
pub fn ref_name(reference: &str) -> &str {
    reference
        .strip_prefix(DEFINITIONS_PREFIX)
        .unwrap_or(reference)
}
