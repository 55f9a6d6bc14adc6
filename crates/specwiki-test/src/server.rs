//! TestServer: end-to-end harness for `specwiki serve`.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use thiserror::Error;

use specwiki_spec_parser::{parse_spec_file, ApiModel, ParseError};

/// Errors from TestServer operations.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("fixture failed to parse: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server failed to start: {0}")]
    StartupFailed(String),

    #[error("specwiki binary not found at {0}")]
    BinaryNotFound(String),
}

/// Runs the `specwiki` binary in serving mode on a random local port and
/// provides HTTP request helpers.
pub struct TestServer {
    /// The child process running the server.
    child: Child,
    /// The port the server is listening on.
    port: u16,
    /// HTTP client for making requests.
    client: reqwest::Client,
}

impl TestServer {
    /// Start a server with the default body limit.
    pub async fn start() -> Result<Self, TestError> {
        Self::start_with_args(&[]).await
    }

    /// Start a server with a custom maximum body size.
    pub async fn with_max_body_size(limit: usize) -> Result<Self, TestError> {
        Self::start_with_args(&["--max-body-size".to_string(), limit.to_string()]).await
    }

    async fn start_with_args(extra: &[String]) -> Result<Self, TestError> {
        let binary_path = find_specwiki_binary()?;
        let port = find_available_port()?;

        let child = Command::new(&binary_path)
            .arg("serve")
            .arg("--listen")
            .arg(format!("127.0.0.1:{}", port))
            .args(extra)
            .env("SPECWIKI_LOG_LEVEL", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let mut server = TestServer {
            child,
            port,
            client: reqwest::Client::new(),
        };

        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Poll the health endpoint until the server answers.
    async fn wait_for_ready(&mut self) -> Result<(), TestError> {
        let health_url = format!("{}/health", self.base_url());
        let max_attempts = 50;
        let delay = Duration::from_millis(100);

        for _ in 0..max_attempts {
            if let Ok(resp) = self.client.get(&health_url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }

            if let Ok(Some(status)) = self.child.try_wait() {
                return Err(TestError::StartupFailed(format!(
                    "server exited with status: {}",
                    status
                )));
            }

            tokio::time::sleep(delay).await;
        }

        Err(TestError::StartupFailed(
            "server did not become ready in time".to_string(),
        ))
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the base URL of the server.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Make a GET request to the given path.
    pub async fn get(&self, path: &str) -> Result<reqwest::Response, TestError> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// POST a spec to `/convert` (or `/convert?<query>`).
    pub async fn convert(&self, spec: &str, query: Option<&str>) -> Result<reqwest::Response, TestError> {
        let url = match query {
            Some(q) => format!("{}/convert?{}", self.base_url(), q),
            None => format!("{}/convert", self.base_url()),
        };
        Ok(self
            .client
            .post(&url)
            .header("content-type", "application/yaml")
            .body(spec.to_string())
            .send()
            .await?)
    }

    /// POST the contents of a fixture file to `/convert`.
    pub async fn convert_fixture(&self, name: &str) -> Result<reqwest::Response, TestError> {
        let spec = std::fs::read_to_string(fixture_path(name))?;
        self.convert(&spec, None).await
    }

    /// Make a request with any method.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest::Response, TestError> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.request(method, &url).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Absolute path of a file under the shared `tests/fixtures` directory.
pub fn fixture_path(name: &str) -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/specwiki-test
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

/// Parse a fixture in-process, for comparing against server output.
pub fn fixture_model(name: &str) -> Result<ApiModel, TestError> {
    Ok(parse_spec_file(&fixture_path(name))?)
}

/// Find the specwiki binary in the target directory.
fn find_specwiki_binary() -> Result<String, TestError> {
    let candidates = [
        "target/debug/specwiki",
        "target/release/specwiki",
        "../target/debug/specwiki",
        "../target/release/specwiki",
        "../../target/debug/specwiki",
        "../../target/release/specwiki",
    ];

    for path in candidates {
        if Path::new(path).exists() {
            return Ok(path.to_string());
        }
    }

    // Fall back to asking cargo where the target directory is
    if let Ok(output) = Command::new("cargo")
        .args(["metadata", "--format-version=1", "--no-deps"])
        .output()
    {
        if output.status.success() {
            if let Ok(meta) = serde_json::from_slice::<serde_json::Value>(&output.stdout) {
                if let Some(dir) = meta["target_directory"].as_str() {
                    for profile in ["debug", "release"] {
                        let path = format!("{}/{}/specwiki", dir, profile);
                        if Path::new(&path).exists() {
                            return Ok(path);
                        }
                    }
                }
            }
        }
    }

    Err(TestError::BinaryNotFound(
        "target/debug/specwiki or target/release/specwiki".to_string(),
    ))
}

/// Find an available TCP port.
fn find_available_port() -> Result<u16, TestError> {
    // Bind to port 0 to get an OS-assigned port
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_health() {
        let server = TestServer::start().await.expect("failed to start server");

        let resp = server.get("/health").await.unwrap();
        assert_eq!(resp.status(), 200);

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_server_converts_petstore() {
        let server = TestServer::start().await.expect("failed to start server");

        let resp = server.convert_fixture("petstore.yaml").await.unwrap();
        assert_eq!(resp.status(), 200);
        assert!(resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let text = resp.text().await.unwrap();
        assert!(text.starts_with("h3. Pets\n"));
        assert!(text.contains("h4. Add a pet\n"));
        assert!(text.contains("*Method*: {noformat}POST /pets{noformat}\n"));
        assert!(text.contains("|{{name}}|string|(/)|Pet name|\n"));
        assert!(text.contains("|{{owner.email}}|string|Contact address|\n"));
        assert!(text.contains("h3. API Specifics\n"));
    }

    #[tokio::test]
    async fn test_server_json_matches_in_process_model() {
        let server = TestServer::start().await.expect("failed to start server");
        let spec = std::fs::read_to_string(fixture_path("petstore.yaml")).unwrap();

        let resp = server.convert(&spec, Some("format=json")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();

        let model = fixture_model("petstore.yaml").unwrap();
        let expected = serde_json::to_value(&model).unwrap();
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_server_rejects_malformed_spec() {
        let server = TestServer::start().await.expect("failed to start server");

        let resp = server
            .convert_fixture("invalid-parse-error.yaml")
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(
            resp.headers()["content-type"].to_str().unwrap(),
            "application/problem+json"
        );

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_server_rejects_oversized_body() {
        let server = TestServer::with_max_body_size(64)
            .await
            .expect("failed to start server");

        let resp = server.convert_fixture("petstore.yaml").await.unwrap();
        assert_eq!(resp.status(), 413);
    }

    #[tokio::test]
    async fn test_server_404() {
        let server = TestServer::start().await.expect("failed to start server");

        let resp = server.get("/nonexistent").await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_server_405() {
        let server = TestServer::start().await.expect("failed to start server");

        let resp = server.get("/convert").await.unwrap();
        assert_eq!(resp.status(), 405);

        let allow = resp.headers().get("allow").unwrap().to_str().unwrap();
        assert_eq!(allow, "POST");
    }

    #[test]
    fn fixture_model_reports_parse_errors() {
        let err = fixture_model("invalid-parse-error.yaml").unwrap_err();
        assert!(matches!(err, TestError::Parse(ParseError::Document(_))));
    }
}
