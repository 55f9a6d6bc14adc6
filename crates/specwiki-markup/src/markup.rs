//! Jira wiki markup primitives.

/// Header cell delimiter.
pub const HEADER_CELL: &str = "||";

/// Body cell delimiter.
pub const CELL: &str = "|";

/// Separator between enum values inside a table cell (an escaped pipe).
pub const ENUM_SEPARATOR: &str = " \\| ";

/// Check mark shown for mandatory attributes.
pub const CHECK: &str = "(/)";

/// Heading style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// `h3.` — one per group.
    Group,
    /// `h4.` — one per operation.
    Operation,
    /// Bold caption, e.g. `*Query Parameters*:`.
    Caption,
}

impl Heading {
    /// Format a heading line (without trailing newline).
    pub fn format(self, text: &str) -> String {
        match self {
            Heading::Group => format!("h3. {text}"),
            Heading::Operation => format!("h4. {text}"),
            Heading::Caption => format!("{}:", bold(text)),
        }
    }
}

pub fn bold(text: &str) -> String {
    format!("*{text}*")
}

pub fn monospaced(text: &str) -> String {
    format!("{{{{{text}}}}}")
}

pub fn noformat(text: &str) -> String {
    format!("{{noformat}}{text}{{noformat}}")
}

/// Mandatory column cell: a check mark or a blank.
pub fn check(mandatory: bool) -> &'static str {
    if mandatory {
        CHECK
    } else {
        " "
    }
}
