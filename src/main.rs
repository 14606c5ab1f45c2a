use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use datebooker::command::{self, CommandError};
use datebooker::config::Config;
use datebooker::engine::Engine;

/// Reads one JSON request per stdin line and writes one JSON result per stdout line.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    datebooker::observability::init(config.metrics_port)?;

    info!("datebooker ready");
    info!("  notify_capacity: {}", config.notify_capacity);
    info!("  max_resources: {}", config.max_resources);
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let engine = Engine::with_config(&config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0u64;

    while let Some(line) = lines.next_line().await? {
        let result = match command::parse_command(&line) {
            Ok(cmd) => {
                let label = cmd.label();
                command::execute(&engine, cmd)
                    .await
                    .inspect_err(|e| warn!("{label} failed: {e}"))
            }
            Err(CommandError::Empty) => continue,
            Err(e) => {
                warn!("rejected request: {e}");
                Err(e)
            }
        };
        let reply = result.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }));
        let mut out = serde_json::to_vec(&reply)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
        handled += 1;
    }

    info!("stdin closed after {handled} requests");
    Ok(())
}
