//! Extracts operations from the `paths` section, grouped by tag.

use tracing::debug;

use crate::definitions::ref_name;
use crate::error::ParseError;
use crate::model::{Group, Groups, Operation, Param, Schema, DEFAULT_GROUP};
use crate::node::{child_path, Node};

/// HTTP methods recognized as path item keys.
const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Response codes whose schema describes the operation result.
const RESPONSE_CODES: &[&str] = &["200", "201", "default"];

/// Prefix of vendor extension keys.
const EXTENSION_PREFIX: &str = "x-";

/// Walk `paths` in document order and build the operation groups.
///
/// Request and response schemas are left as bare references; the linker
/// resolves them against the definitions registry.
pub fn extract_operations(root: &Node) -> Result<Groups, ParseError> {
    let mut groups = Groups::new();

    let Some(paths) = root.get("paths") else {
        return Ok(groups);
    };

    for (path, path_item) in paths.as_mapping("paths")? {
        let at = child_path("paths", path);
        debug!(path = %path, "parsing path");

        for (method, op_node) in path_item.as_mapping(&at)? {
            let method = method.to_ascii_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }

            let (tag, operation) = parse_operation(path, &method, op_node, &child_path(&at, &method))?;
            // A missing or empty first tag falls back to the default group.
            let name = tag
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_GROUP.to_string());
            groups
                .entry(name.clone())
                .or_insert_with(|| Group::new(name))
                .operations
                .push(operation);
        }
    }

    Ok(groups)
}

/// Parse one operation object. Returns the first declared tag, if any.
fn parse_operation(
    path: &str,
    method: &str,
    node: &Node,
    at: &str,
) -> Result<(Option<String>, Operation), ParseError> {
    let mut tag = None;
    let mut operation = Operation {
        method: format!("{} {}", method.to_uppercase(), path),
        ..Operation::default()
    };

    for (key, value) in node.as_mapping(at)? {
        let at = child_path(at, key);
        match key.as_str() {
            "tags" => {
                tag = match value.as_sequence(&at)?.first() {
                    Some(first) => Some(first.as_str(&format!("{at}[0]"))?.to_string()),
                    None => None,
                };
            }
            "summary" => operation.summary = value.as_str(&at)?.to_string(),
            "description" => operation.description = value.as_str(&at)?.to_string(),
            "parameters" => {
                for (i, param_node) in value.as_sequence(&at)?.iter().enumerate() {
                    parse_parameter(param_node, &mut operation, &format!("{at}[{i}]"))?;
                }
            }
            "responses" => {
                for (code, response) in value.as_mapping(&at)? {
                    if !RESPONSE_CODES.contains(&code.as_str()) {
                        continue;
                    }
                    let at = child_path(&at, code);
                    // Later watched codes overwrite earlier ones.
                    if let Some(name) = response_schema_ref(response, &at)? {
                        operation.response_schema = Schema::reference(name);
                    }
                }
            }
            extension if extension.starts_with(EXTENSION_PREFIX) => {
                let text = value.as_str(&at)?;
                operation
                    .custom_tags
                    .insert(display_tag(extension), text.to_string());
            }
            _ => {}
        }
    }

    Ok((tag, operation))
}

/// Parse a parameter and attach it to the operation according to its `in`.
fn parse_parameter(node: &Node, operation: &mut Operation, at: &str) -> Result<(), ParseError> {
    let mut param = Param::default();
    let mut location = String::new();

    for (key, value) in node.as_mapping(at)? {
        let at = child_path(at, key);
        match key.as_str() {
            "name" => param.name = value.as_str(&at)?.to_string(),
            "type" => param.param_type = value.as_str(&at)?.to_string(),
            "description" => param.description = value.as_str(&at)?.to_string(),
            "schema" => {
                if let Some(name) = schema_ref(value, &at)? {
                    param.schema = Schema::reference(name);
                }
            }
            "enum" => param.enum_values = value.as_string_list(&at)?,
            "in" => location = value.as_str(&at)?.to_string(),
            _ => {}
        }
    }

    match location.as_str() {
        "query" => operation.query_params.push(param),
        "body" => operation.request_schema.name = param.schema.name,
        // Form fields stay inline and are never looked up in the registry.
        "formData" => operation.request_schema.attributes.push(param),
        _ => {}
    }

    Ok(())
}

fn response_schema_ref(response: &Node, at: &str) -> Result<Option<String>, ParseError> {
    let mut found = None;
    for (key, value) in response.as_mapping(at)? {
        if key == "schema" {
            if let Some(name) = schema_ref(value, &child_path(at, key))? {
                found = Some(name);
            }
        }
    }
    Ok(found)
}

/// Reference named by a `schema` block, either directly (`$ref`) or through
/// an array (`items.$ref`). The last one in document order wins.
fn schema_ref(schema: &Node, at: &str) -> Result<Option<String>, ParseError> {
    let mut found = None;
    for (key, value) in schema.as_mapping(at)? {
        let at = child_path(at, key);
        match key.as_str() {
            "$ref" => found = Some(ref_name(value.as_str(&at)?).to_string()),
            "items" => {
                if let Some(reference) = value.get("$ref") {
                    let at = child_path(&at, "$ref");
                    found = Some(ref_name(reference.as_str(&at)?).to_string());
                }
            }
            _ => {}
        }
    }
    Ok(found)
}

/// Display name for a vendor extension key:
/// `x-rate-limit-per-minute` becomes `Rate Limit Per Minute`.
pub fn display_tag(key: &str) -> String {
    let words = key
        .strip_prefix(EXTENSION_PREFIX)
        .unwrap_or(key)
        .replace(['-', '_'], " ");

    let mut tag = String::with_capacity(words.len());
    let mut word_start = true;
    for c in words.chars() {
        if word_start {
            tag.extend(c.to_uppercase());
        } else {
            tag.push(c);
        }
        word_start = c.is_whitespace();
    }
    tag
}
