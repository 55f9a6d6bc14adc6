//! Replaces named schema references with the schemas they name.
//!
//! Linking runs in two passes: definitions are linked against each other
//! first, then operation request/response schemas are replaced with the
//! linked definitions. References to unknown names stay as bare stubs.

use tracing::debug;

use crate::model::{Definitions, Groups, Schema};

/// Type given to attributes that reference a non-array schema.
pub const STRUCT_TYPE: &str = "struct";

/// Deepest reference chain expanded below a definition.
pub const MAX_LINK_DEPTH: usize = 16;

/// Most attributes a single linked definition may hold, nested rows included.
pub const MAX_LINKED_ATTRIBUTES: usize = 2048;

const ARRAY_TYPE: &str = "array";

/// Link every definition against the registry.
///
/// References are followed transitively, in any direction within the
/// document. A reference is left as a stub when it points back into its own
/// resolution chain, when it would nest more than [`MAX_LINK_DEPTH`] levels
/// below the definition, or when expanding it would push the definition past
/// [`MAX_LINKED_ATTRIBUTES`]. Expansion is depth-first, so the budget is
/// spent on earlier attributes first.
pub fn link_definitions(definitions: &Definitions) -> Definitions {
    definitions
        .iter()
        .map(|(name, schema)| {
            let budget = MAX_LINKED_ATTRIBUTES.saturating_sub(schema.attributes.len());
            let mut linker = Linker {
                registry: definitions,
                chain: vec![name.clone()],
                budget,
            };
            let linked = linker.link_schema(schema);
            debug!(
                definition = %name,
                nested_attributes = budget - linker.budget,
                "linked definition"
            );
            (name.clone(), linked)
        })
        .collect()
}

struct Linker<'a> {
    registry: &'a Definitions,
    /// Definitions currently being expanded, outermost first.
    chain: Vec<String>,
    /// Attributes this definition may still take on.
    budget: usize,
}

impl Linker<'_> {
    fn link_schema(&mut self, schema: &Schema) -> Schema {
        let mut linked = schema.clone();
        for attribute in &mut linked.attributes {
            if attribute.schema.name.is_empty() {
                continue;
            }
            if attribute.param_type != ARRAY_TYPE {
                attribute.param_type = STRUCT_TYPE.to_string();
            }
            attribute.schema = self.resolve(&attribute.schema.name);
        }
        linked
    }

    fn resolve(&mut self, name: &str) -> Schema {
        if self.chain.len() > MAX_LINK_DEPTH || self.chain.iter().any(|seen| seen == name) {
            return Schema::reference(name);
        }
        let Some(target) = self.registry.get(name) else {
            return Schema::reference(name);
        };
        if target.attributes.len() > self.budget {
            return Schema::reference(name);
        }

        self.budget -= target.attributes.len();
        self.chain.push(name.to_string());
        let linked = self.link_schema(target);
        self.chain.pop();
        linked
    }
}

/// Replace operation request/response references with linked definitions.
///
/// Inline form-data attributes on a request are kept after the referenced
/// body attributes. Body attributes copied in by an earlier pass are not
/// repeated.
pub fn link_operations(groups: &mut Groups, definitions: &Definitions) {
    for group in groups.values_mut() {
        for operation in &mut group.operations {
            if let Some(resolved) = lookup(definitions, &operation.request_schema.name) {
                let mut inline = std::mem::take(&mut operation.request_schema.attributes);
                if inline.starts_with(&resolved.attributes) {
                    inline.drain(..resolved.attributes.len());
                }

                let mut schema = resolved.clone();
                for param in inline {
                    schema.has_mandatory_params |= param.mandatory;
                    schema.attributes.push(param);
                }
                operation.request_schema = schema;
            }

            if let Some(resolved) = lookup(definitions, &operation.response_schema.name) {
                operation.response_schema = resolved.clone();
            }
        }
    }
}

fn lookup<'a>(definitions: &'a Definitions, name: &str) -> Option<&'a Schema> {
    if name.is_empty() {
        return None;
    }
    definitions.get(name)
}
