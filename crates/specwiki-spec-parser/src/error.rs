use thiserror::Error;

/// Errors produced while loading a spec and building its model.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The document is not well-formed YAML/JSON.
    #[error("document error: {0}")]
    Document(String),

    /// A recognized key holds a node of the wrong kind.
    #[error("shape error at '{at}': expected {expected}, found {found}")]
    Shape {
        /// Key path of the offending node (e.g. `definitions.Pet.required`).
        at: String,
        expected: &'static str,
        found: &'static str,
    },

    /// I/O error reading the spec file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
