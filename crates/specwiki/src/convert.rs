//! File and string conversion: spec in, markup (or model JSON) out.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use specwiki_markup::render_model;
use specwiki_spec_parser::{parse_spec, parse_spec_file, ApiModel, ParseError};

/// Output produced by a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Jira wiki markup.
    #[default]
    Jira,
    /// The linked model as pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jira" => Some(Self::Jira),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Errors produced by a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The spec could not be read or parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The model could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counts reported after a successful file conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    pub groups: usize,
    pub operations: usize,
    pub bytes: usize,
}

/// Render a parsed model in the requested format.
pub fn render(model: &ApiModel, format: OutputFormat) -> Result<String, ConvertError> {
    match format {
        OutputFormat::Jira => Ok(render_model(model)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(model)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Convert a spec held in memory.
pub fn convert_str(input: &str, format: OutputFormat) -> Result<String, ConvertError> {
    let model = parse_spec(input)?;
    render(&model, format)
}

/// Convert the spec at `input` and write the result to `output`.
///
/// Nothing is written when the spec cannot be read or parsed.
pub fn convert_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<ConversionSummary, ConvertError> {
    let model = parse_spec_file(input)?;
    let text = render(&model, format)?;

    debug!(output = %output.display(), bytes = text.len(), "writing output");
    std::fs::write(output, &text).map_err(|source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(ConversionSummary {
        groups: model.groups.len(),
        operations: model.operation_count(),
        bytes: text.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SPEC: &str = r##"
swagger: "2.0"
paths:
  /pets:
    get:
      tags: [pets]
      summary: List pets
      responses:
        200:
          schema:
            type: array
            items:
              $ref: "#/definitions/Pet"
definitions:
  Pet:
    properties:
      id:
        type: integer
"##;

    #[test]
    fn parse_output_format() {
        assert_eq!(OutputFormat::parse("jira"), Some(OutputFormat::Jira));
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("html"), None);
    }

    #[test]
    fn convert_str_renders_markup() {
        let text = convert_str(SPEC, OutputFormat::Jira).unwrap();
        assert!(text.starts_with("h3. pets\nh4. List pets\n"));
        assert!(text.contains("|{{id}}|integer||"));
    }

    #[test]
    fn convert_str_renders_json_model() {
        let text = convert_str(SPEC, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let op = &value["groups"]["pets"]["operations"][0];
        assert_eq!(op["method"], "GET /pets");
        assert_eq!(op["response_schema"]["attributes"][0]["type"], "integer");
    }

    #[test]
    fn convert_file_writes_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("api.yaml");
        let output = dir.path().join("api.txt");
        std::fs::write(&input, SPEC).unwrap();

        let summary = convert_file(&input, &output, OutputFormat::Jira).unwrap();
        assert_eq!(summary.groups, 1);
        assert_eq!(summary.operations, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written.len(), summary.bytes);
        assert!(written.contains("{noformat}GET /pets{noformat}"));
    }

    #[test]
    fn parse_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.yaml");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "paths: [unclosed\n").unwrap();

        let err = convert_file(&input, &output, OutputFormat::Jira).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(ParseError::Document(_))));
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = convert_file(
            &dir.path().join("missing.yaml"),
            &dir.path().join("out.txt"),
            OutputFormat::Jira,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Parse(ParseError::Io(_))));
    }

    #[test]
    fn write_failure_names_the_path() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("api.yaml");
        std::fs::write(&input, SPEC).unwrap();
        let output = dir.path().join("no-such-dir").join("api.txt");

        let err = convert_file(&input, &output, OutputFormat::Jira).unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
        assert!(err.to_string().contains("no-such-dir"));
    }
}
