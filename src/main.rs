//! Replays a JSON-lines event log through a session driver and prints the
//! resulting snapshot.
//!
//! Usage: `quiz-session [--live] [PATH|-]`. With `--live` the timers are
//! driven by wall-clock ticks while the log is replayed.

use std::{env, path::PathBuf};

use anyhow::Context;
use quiz_session::{
    config::SessionConfig,
    dto::inbound::InboundEvent,
    error::ServiceError,
    services::{session_service::spawn_session, ticker::spawn_ticker},
    state::SessionSnapshot,
};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SessionConfig::load();
    let mut live = false;
    let mut source = None;
    for arg in env::args_os().skip(1) {
        if arg == "--live" {
            live = true;
        } else {
            source = Some(PathBuf::from(arg));
        }
    }

    let snapshot = match source {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(&path)
                .await
                .with_context(|| format!("opening event log {}", path.display()))?;
            replay(BufReader::new(file), &config, live).await?
        }
        _ => replay(BufReader::new(tokio::io::stdin()), &config, live).await?,
    };

    let rendered = serde_json::to_string_pretty(&snapshot).context("rendering snapshot")?;
    println!("{rendered}");
    Ok(())
}

/// Feed every non-blank line of `reader` to a fresh session, one event per line.
async fn replay<R>(reader: R, config: &SessionConfig, live: bool) -> anyhow::Result<SessionSnapshot>
where
    R: AsyncBufRead + Unpin,
{
    let (handle, driver) = spawn_session(
        SessionSnapshot::joined(config.role, config.reading_speed),
        config,
    );
    let ticker = live.then(|| {
        info!(period_ms = config.tick_interval.as_millis() as u64, "live ticks enabled");
        spawn_ticker(handle.clone(), config.tick_interval)
    });

    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let (mut applied, mut rejected) = (0usize, 0usize);

    while let Some(line) = lines.next_line().await.context("reading event log")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match InboundEvent::decode(line) {
            Ok(event) => event,
            Err(err) => {
                warn!(line = line_no, error = %err, "skipping undecodable event");
                rejected += 1;
                continue;
            }
        };

        match handle.submit(event).await {
            Ok(_) => applied += 1,
            // Already logged by the driver.
            Err(ServiceError::Rejected(_)) => rejected += 1,
            Err(err) => return Err(err).context("session driver failed"),
        }
    }

    let snapshot = SessionSnapshot::clone(&handle.snapshot());
    info!(
        applied,
        rejected,
        version = snapshot.version,
        ended = snapshot.is_ended,
        "replay finished"
    );

    // The ticker holds a handle; the driver only stops once it is gone.
    if let Some(ticker) = ticker {
        ticker.abort();
        let _ = ticker.await;
    }
    drop(handle);
    driver.await.context("joining session driver")?;
    Ok(snapshot)
}

/// Configure tracing on stderr so stdout carries only the snapshot.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
