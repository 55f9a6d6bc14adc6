//! specwiki: Swagger 2.0 to Jira wiki markup converter.
//!
//! Converts a spec file once, or serves conversions over HTTP.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use specwiki_lib::server::{DEFAULT_LISTEN, DEFAULT_MAX_BODY_SIZE};
use specwiki_lib::{convert_file, serve, OutputFormat, ServeConfig};
use specwiki_telemetry::{LogFormat, Telemetry, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "specwiki", about = "Swagger 2.0 to Jira wiki markup converter", version)]
struct Cli {
    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, env = "SPECWIKI_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json or pretty).
    #[arg(long, global = true, env = "SPECWIKI_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a spec file.
    Convert {
        /// Source spec file (YAML or JSON).
        #[arg(short, long = "in", default_value = "api.yaml")]
        input: PathBuf,

        /// Target file.
        #[arg(short, long = "out", default_value = "api.txt")]
        output: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Jira)]
        format: OutputFormat,
    },

    /// Serve conversions over HTTP (`POST /convert`).
    Serve {
        /// Listen address.
        #[arg(long, env = "SPECWIKI_LISTEN", default_value = DEFAULT_LISTEN)]
        listen: String,

        /// Maximum request body size in bytes (default: 1048576 = 1MB).
        #[arg(long, default_value_t = DEFAULT_MAX_BODY_SIZE)]
        max_body_size: usize,
    },
}

/// Run the convert command.
fn run_convert(input: &Path, output: &Path, format: OutputFormat) -> ExitCode {
    tracing::info!(input = %input.display(), "converting file");

    match convert_file(input, output, format) {
        Ok(summary) => {
            specwiki_telemetry::log_conversion_completed!(
                input = %input.display(),
                output = %output.display(),
                groups = summary.groups,
                operations = summary.operations,
                bytes = summary.bytes,
                "completed"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            specwiki_telemetry::log_conversion_failed!(
                input = %input.display(),
                error = %e,
                "conversion failed"
            );
            eprintln!("error: {}: {}", input.display(), e);
            ExitCode::from(1)
        }
    }
}

/// Run the serve command.
async fn run_serve(listen: &str, max_body_size: usize) -> ExitCode {
    let addr: SocketAddr = match listen.parse() {
        Ok(a) => a,
        Err(_) => {
            eprintln!("error: invalid listen address: {}", listen);
            return ExitCode::from(1);
        }
    };

    let config = ServeConfig {
        listen: addr,
        max_body_size,
    };

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: failed to serve on {}: {}", addr, e);
            ExitCode::from(1)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(log_format) = LogFormat::parse(&cli.log_format) else {
        eprintln!("error: invalid log format: {} (expected json or pretty)", cli.log_format);
        return ExitCode::from(2);
    };

    let config = TelemetryConfig::new()
        .with_log_level(cli.log_level.as_str())
        .with_log_format(log_format);

    match Telemetry::init(config) {
        Ok(telemetry) => specwiki_telemetry::log_startup!(
            service = %telemetry.config().service_name,
            version = env!("CARGO_PKG_VERSION"),
            "starting"
        ),
        Err(e) => eprintln!("warning: {}", e),
    }

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
        } => run_convert(&input, &output, format),
        Commands::Serve {
            listen,
            max_body_size,
        } => run_serve(&listen, max_body_size).await,
    }
}
