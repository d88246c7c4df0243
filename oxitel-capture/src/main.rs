use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use oxitel_capture::sink::RecordSink;
use oxitel_capture::transport::ByteSource;
use oxitel_capture::{
    Config, CycleError, FrameReader, HttpSink, MockSource, SerialSource, SinkConfig, SqliteSink,
    TransportConfig, run_cycle,
};
use oxitel_core::{AggregateRecord, SubjectId};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "oxitel-capture")]
#[command(about = "Pulse oximeter acquisition daemon")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "oxitel.toml")]
    config: PathBuf,

    /// Subject id recorded with stored measurements
    #[arg(default_value_t = 1)]
    subject: i64,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "oxitel_capture=info,oxitel_core=info".to_owned());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    let subject = SubjectId(cli.subject);
    info!(subject = subject.0, "Starting oxitel-capture");

    // Opening the transport is the one fatal failure: without a byte stream
    // there is no cycle to run.
    let mut source: Box<dyn ByteSource> = match &config.transport {
        TransportConfig::Serial {
            device,
            baud,
            read_timeout_ms,
        } => Box::new(SerialSource::open(
            device,
            *baud,
            Duration::from_millis(*read_timeout_ms),
        )?),
        TransportConfig::Mock => {
            info!("Using mock transport");
            Box::new(MockSource::synthetic(config.cycle.sample_count))
        }
    };

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
            cancel_for_signal.cancel();
        }
    });

    let reader = FrameReader::new(config.cycle.strict_bcd, config.cycle.scan_timeout());

    match run_cycle(source.as_mut(), &reader, &config.cycle, &cancel).await {
        Ok(record) => {
            deliver(&config.sink, subject, &record).await;
        }
        Err(CycleError::Cancelled) => {
            info!("Cycle cancelled, no record emitted");
        }
    }

    source.close();
    info!("oxitel-capture shut down complete");
    Ok(())
}

/// Hand the aggregate to the configured sink. Sink failures are logged and
/// swallowed; a lost record does not fail the process.
async fn deliver(sink: &SinkConfig, subject: SubjectId, record: &AggregateRecord) {
    match sink {
        SinkConfig::Sqlite { path } => match SqliteSink::new(path, subject).await {
            Ok(sink) => match sink.deliver(record).await {
                Ok(()) => info!(path = ?path, "Aggregate stored"),
                Err(e) => error!(error = %e, "Failed to store aggregate"),
            },
            Err(e) => error!(error = %e, path = ?path, "Failed to open sqlite sink"),
        },
        SinkConfig::Http { endpoint } => {
            let sink = HttpSink::new(endpoint.clone());
            match sink.deliver(record).await {
                Ok(()) => info!(endpoint = %endpoint, "Aggregate posted"),
                Err(e) => error!(error = %e, endpoint = %endpoint, "Failed to post aggregate"),
            }
        }
    }
}
