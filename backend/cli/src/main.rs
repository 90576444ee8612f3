mod config;

use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use incident_core::{CompletionProvider, Field};
use incident_gateway::{start_server, GatewayState};
use incident_logging::init_logger;
use incident_providers::{OpenAiProvider, ScriptedProvider};
use incident_viewer::{ReportClient, ReportSession};

use config::Config;

const MOCK_REPORT: &str = "Incident Report\n\n\
    Summary: A chemical spill was reported and contained without injuries.\n\
    Actions Taken: The area was cordoned off and the spill was neutralised.\n\
    Follow-up: Review storage procedures and refresh spill response training.";

#[derive(Parser)]
#[command(name = "incident-report")]
#[command(about = "Incident report generator: relay server and terminal client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the report relay server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Stream a canned report instead of calling the upstream API
        #[arg(long)]
        mock: bool,
    },
    /// Submit an incident to a running relay and stream the report
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    date_time: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    persons: String,
    #[arg(long)]
    description: String,
    /// Relay base URL
    #[arg(long)]
    server: Option<String>,
    /// Also export the finished report as a PDF
    #[arg(long)]
    pdf: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    init_logger(&config.log_level, config.log_dir.as_deref());

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, mock } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config, mock).await?;
        }
        Commands::Generate(args) => {
            let server = args
                .server
                .clone()
                .unwrap_or_else(|| format!("http://localhost:{}", config.port));
            run_generate(args, server).await?;
        }
    }

    Ok(())
}

fn build_provider(config: &Config, mock: bool) -> Arc<dyn CompletionProvider> {
    if mock {
        info!("Using scripted provider");
        return Arc::new(
            ScriptedProvider::from_text(MOCK_REPORT)
                .with_name("mock")
                .with_delay(Duration::from_millis(40)),
        );
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; report requests will fail until it is provided");
    }
    Arc::new(OpenAiProvider::new(config.provider_settings()))
}

async fn run_server(config: Config, mock: bool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address))?;
    let provider = build_provider(&config, mock);

    info!(
        port = config.port,
        bind = %config.bind_address,
        provider = provider.name(),
        model = %config.openai_model,
        "Starting incident report relay"
    );

    start_server(addr, GatewayState::new(provider)).await
}

async fn run_generate(args: GenerateArgs, server: String) -> Result<()> {
    let mut session = ReportSession::new(ReportClient::new(server));
    session.form.set_field(Field::Title, args.title);
    session.form.set_field(Field::DateTime, args.date_time);
    session.form.set_field(Field::Location, args.location);
    session.form.set_field(Field::Persons, args.persons);
    session.form.set_field(Field::Description, args.description);

    let mut stdout = std::io::stdout();
    let mut printed = 0;
    let submitted = session
        .submit(|text| {
            if let Some(fresh) = text.get(printed..) {
                let _ = write!(stdout, "{fresh}");
                let _ = stdout.flush();
            }
            printed = text.len();
        })
        .await;

    if !submitted {
        for field in session.form.fields_with_errors() {
            let message = session.form.error(field).unwrap_or_default();
            eprintln!("{}: {message}", field.label());
        }
        bail!("incident form is incomplete");
    }
    if printed > 0 {
        println!();
    }

    if let Some(error) = session.viewer.error() {
        if printed > 0 {
            eprintln!("{}", discarded_notice(printed));
        }
        bail!("{error}");
    }

    if let Some(path) = args.pdf {
        session
            .viewer
            .save_pdf(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Report exported");
    }

    Ok(())
}

/// Stderr note for report text already streamed to stdout before a failure.
fn discarded_notice(bytes: usize) -> String {
    format!("note: the {bytes} bytes of report text printed above are incomplete and were discarded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discarded_notice_names_partial_output() {
        let notice = discarded_notice(42);
        assert!(notice.contains("42 bytes"));
        assert!(notice.contains("discarded"));
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "incident-report",
            "generate",
            "--title",
            "Spill",
            "--date-time",
            "2024-01-01T10:00",
            "--location",
            "Lab A",
            "--persons",
            "J. Doe",
            "--description",
            "Chemical spill reported",
            "--pdf",
            "out.pdf",
        ])
        .unwrap();
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.date_time, "2024-01-01T10:00");
        assert_eq!(args.pdf, Some(PathBuf::from("out.pdf")));
        assert!(args.server.is_none());
    }
}
