use specwiki_spec_parser::{ApiModel, Group, Groups, Operation, Param};

use crate::markup::{self, Heading, CELL, ENUM_SEPARATOR, HEADER_CELL};

/// Render every group of the model, in model order.
pub fn render_model(model: &ApiModel) -> String {
    render(&model.groups)
}

/// Render groups as Jira wiki markup.
pub fn render(groups: &Groups) -> String {
    let mut renderer = Renderer::default();
    for group in groups.values() {
        renderer.group(group);
    }
    renderer.out
}

#[derive(Default)]
struct Renderer {
    out: String,
}

impl Renderer {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn group(&mut self, group: &Group) {
        self.line(&Heading::Group.format(&group.name));
        for operation in &group.operations {
            self.operation(operation);
        }
        self.line("");
    }

    fn operation(&mut self, op: &Operation) {
        self.line(&Heading::Operation.format(&op.summary));
        if !op.description.is_empty() {
            self.line(&op.description);
        }
        self.pair("Method", &markup::noformat(&op.method));
        for (tag, value) in &op.custom_tags {
            self.pair(tag, value);
        }

        self.table("Query Parameters", &op.query_params, false);
        self.table(
            "Request Parameters",
            &op.request_schema.attributes,
            op.request_schema.has_mandatory_params,
        );
        // The response table never carries a mandatory column.
        self.table("Response Attributes", &op.response_schema.attributes, false);
        self.line("");
    }

    fn pair(&mut self, key: &str, value: &str) {
        self.line(&format!("{}: {}", markup::bold(key), value));
    }

    fn table(&mut self, caption: &str, params: &[Param], mandatory: bool) {
        if params.is_empty() {
            return;
        }

        self.line(&Heading::Caption.format(caption));

        let mut columns = vec!["Name", "Type"];
        if mandatory {
            columns.push("Mandatory");
        }
        columns.push("Description");

        let mut header = String::from(HEADER_CELL);
        for column in columns {
            header.push_str(column);
            header.push_str(HEADER_CELL);
        }
        self.line(&header);

        for param in params {
            self.row(param, "", mandatory);
        }
    }

    /// One row per attribute, followed by rows for its nested attributes
    /// with a dotted name prefix.
    fn row(&mut self, param: &Param, prefix: &str, mandatory: bool) {
        let mut row = String::from(CELL);
        row.push_str(&markup::monospaced(&format!("{prefix}{}", param.name)));
        row.push_str(CELL);
        row.push_str(&type_cell(param));
        row.push_str(CELL);
        if mandatory {
            row.push_str(markup::check(param.mandatory));
            row.push_str(CELL);
        }
        row.push_str(&param.description);
        row.push_str(CELL);
        self.line(&row);

        let prefix = format!("{prefix}{}.", param.name);
        for nested in &param.schema.attributes {
            self.row(nested, &prefix, mandatory);
        }
    }
}

/// Type column: the enum values when present, the declared type otherwise.
fn type_cell(param: &Param) -> String {
    if param.enum_values.is_empty() {
        return param.param_type.clone();
    }
    param
        .enum_values
        .iter()
        .map(|v| markup::monospaced(v))
        .collect::<Vec<_>>()
        .join(ENUM_SEPARATOR)
}
