use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the group collecting operations that declare no tag.
pub const DEFAULT_GROUP: &str = "API Specifics";

/// Operation groups keyed by tag name, in order of first use.
pub type Groups = IndexMap<String, Group>;

/// Named schemas from the `definitions` section, in document order.
pub type Definitions = IndexMap<String, Schema>;

/// A fully built and linked API model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiModel {
    /// Operations grouped by their first tag.
    pub groups: Groups,
    /// The linked definitions registry.
    pub definitions: Definitions,
}

impl ApiModel {
    /// Total number of operations across all groups.
    pub fn operation_count(&self) -> usize {
        self.groups.values().map(|g| g.operations.len()).sum()
    }
}

/// A named bucket of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub operations: Vec<Operation>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }
}

/// A single API operation (path + verb).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Operation {
    pub summary: String,
    pub description: String,
    /// `"<VERB> <path>"`, e.g. `"GET /pets/{id}"`.
    pub method: String,
    pub query_params: Vec<Param>,
    /// Body schema by reference, or form-data parameters inline.
    pub request_schema: Schema,
    pub response_schema: Schema,
    /// Display name -> value, derived from `x-*` keys.
    pub custom_tags: BTreeMap<String, String>,
}

/// A query/form parameter or a schema property.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    pub description: String,
    pub mandatory: bool,
    /// Nested schema; empty for scalar parameters.
    pub schema: Schema,
    #[serde(rename = "enum")]
    pub enum_values: Vec<String>,
}

/// A named or inline collection of attributes.
///
/// A schema with only a name is an unresolved reference; a schema with an
/// empty name and attributes is inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub name: String,
    pub attributes: Vec<Param>,
    pub has_mandatory_params: bool,
}

impl Schema {
    /// A bare reference to a named schema, pending linking.
    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// True when the schema names another schema but carries no attributes.
    pub fn is_unresolved(&self) -> bool {
        !self.name.is_empty() && self.attributes.is_empty()
    }
}
