//! Serving mode: convert specs posted over HTTP.
//!
//! `POST /convert` takes the raw spec as the request body and answers with
//! the rendered markup. Every request builds its own model; nothing is
//! shared between requests beyond the immutable configuration.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::convert::{convert_str, ConvertError, OutputFormat};

/// Default listen address.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:9999";

/// Default maximum request body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";
const PROBLEM_JSON: &str = "application/problem+json";

/// Serving mode configuration.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Address to bind.
    pub listen: SocketAddr,
    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,
}

/// Request handler for the serving mode.
pub struct ConvertService {
    max_body_size: usize,
}

impl ConvertService {
    pub fn new(max_body_size: usize) -> Self {
        Self { max_body_size }
    }

    /// Handle an incoming HTTP request.
    pub async fn handle_request<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let response = match (req.method(), path.as_str()) {
            (&Method::POST, "/convert") => self.convert(req).await,
            (&Method::GET, "/health") => health_response(),
            (_, "/convert") => method_not_allowed_response("POST"),
            (_, "/health") => method_not_allowed_response("GET"),
            _ => not_found_response(),
        };

        specwiki_telemetry::log_request_completed!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            duration_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        Ok(response)
    }

    async fn convert<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let format = match requested_format(req.uri().query()) {
            Some(format) => format,
            None => return bad_request_response("unsupported format, expected 'jira' or 'json'"),
        };

        let body = match Limited::new(req.into_body(), self.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                return payload_too_large_response(self.max_body_size);
            }
            Err(e) => {
                warn!(error = %e, "failed to read request body");
                return bad_request_response("failed to read request body");
            }
        };

        let source = match std::str::from_utf8(&body) {
            Ok(s) => s,
            Err(_) => return bad_request_response("request body is not valid UTF-8"),
        };

        match convert_str(source, format) {
            Ok(text) => {
                let content_type = match format {
                    OutputFormat::Jira => TEXT_PLAIN,
                    OutputFormat::Json => APPLICATION_JSON,
                };
                response(StatusCode::OK, content_type, text)
            }
            Err(ConvertError::Parse(e)) => {
                debug!(error = %e, "rejected spec");
                bad_request_response(&e.to_string())
            }
            Err(e) => internal_error_response(&e.to_string()),
        }
    }
}

/// Output format from the `format` query parameter (default: jira).
fn requested_format(query: Option<&str>) -> Option<OutputFormat> {
    let Some(query) = query else {
        return Some(OutputFormat::Jira);
    };
    for pair in query.split('&') {
        if let Some(value) = pair.strip_prefix("format=") {
            return OutputFormat::parse(value);
        }
    }
    Some(OutputFormat::Jira)
}

fn response(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn health_response() -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    });
    response(StatusCode::OK, APPLICATION_JSON, body.to_string())
}

fn not_found_response() -> Response<Full<Bytes>> {
    response(StatusCode::NOT_FOUND, APPLICATION_JSON, r#"{"error":"not found"}"#)
}

fn method_not_allowed_response(allowed: &'static str) -> Response<Full<Bytes>> {
    let mut response = response(
        StatusCode::METHOD_NOT_ALLOWED,
        APPLICATION_JSON,
        r#"{"error":"method not allowed"}"#,
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allowed));
    response
}

/// Problem details body (RFC 9457).
fn problem(status: StatusCode, title: &str, detail: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "type": format!("urn:specwiki:error:{}", title.to_lowercase().replace(' ', "-")),
        "title": title,
        "status": status.as_u16(),
        "detail": detail,
    });
    response(status, PROBLEM_JSON, body.to_string())
}

fn bad_request_response(detail: &str) -> Response<Full<Bytes>> {
    problem(StatusCode::BAD_REQUEST, "Bad Request", detail)
}

fn payload_too_large_response(limit: usize) -> Response<Full<Bytes>> {
    problem(
        StatusCode::PAYLOAD_TOO_LARGE,
        "Payload Too Large",
        &format!("request body exceeds {} bytes", limit),
    )
}

fn internal_error_response(detail: &str) -> Response<Full<Bytes>> {
    problem(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail)
}

/// Bind the listener and serve until Ctrl-C.
pub async fn serve(config: ServeConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.listen).await?;
    let service = Arc::new(ConvertService::new(config.max_body_size));

    specwiki_telemetry::log_listening!(
        addr = %listener.local_addr()?,
        max_body_size = config.max_body_size,
        "listening"
    );

    loop {
        let (stream, _) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => return Ok(()),
        };

        let service = Arc::clone(&service);
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            let handler = service_fn(move |req| {
                let service = Arc::clone(&service);
                async move { service.handle_request(req).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, handler).await {
                warn!(error = %e, "connection error");
            }
        });
    }
}
