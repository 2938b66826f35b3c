use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use shared::{domain::VideoRole, protocol::StreamEvent};
use similarity_core::{probe_video, ComparisonWorkbench};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod render;

use cli::Args;
use config::load_settings;
use render::{
    format_input, format_notification, format_summary, render_event, OutputMode,
};

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply_overrides(&mut settings);
    init_tracing(&settings.log_filter);

    let config = settings.stream_config()?;
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    let mut workbench =
        ComparisonWorkbench::new(config).with_pass_threshold(settings.pass_threshold);

    let mut stdout = io::stdout().lock();
    for (role, path) in [
        (VideoRole::Reference, args.reference.as_ref()),
        (VideoRole::Target, args.target.as_ref()),
    ] {
        let Some(path) = path else {
            continue;
        };
        let input = probe_video(role, path)
            .await
            .with_context(|| format!("failed to select {role} video"))?;
        if mode == OutputMode::Text {
            writeln!(stdout, "{}", format_input(&input))?;
        }
        workbench.select(input);
    }

    let mut events = workbench.subscribe_events();
    let handle = match workbench.start(settings.source()) {
        Ok(handle) => handle,
        Err(err) => {
            for notification in workbench.drain_notifications() {
                eprintln!("{}", format_notification(&notification));
            }
            return Err(err).context("comparison did not start");
        }
    };
    for notification in workbench.drain_notifications() {
        info!("{}", format_notification(&notification));
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    render_event(&mut stdout, mode, settings.pass_threshold, &event)?;
                    stdout.flush()?;
                    if matches!(
                        &event,
                        StreamEvent::Stopped { session_id, .. } if *session_id == handle.session_id()
                    ) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "terminal fell behind the similarity stream");
                }
                Err(RecvError::Closed) => break,
            },
            signal = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                if let Err(err) = signal {
                    warn!(%err, "failed to listen for ctrl-c");
                    continue;
                }
                workbench.stop();
                for notification in workbench.drain_notifications() {
                    info!("{}", format_notification(&notification));
                }
            }
        }
    }

    workbench.join().await;
    if mode == OutputMode::Text {
        writeln!(
            stdout,
            "{}",
            format_summary(
                workbench.current_similarity(),
                workbench.verdict(),
                workbench.entries().len()
            )
        )?;
    }

    Ok(())
}
