//! Terminal rendering of stream events: a log line per tick with a text gauge.

use std::io::Write;

use shared::{
    domain::{SimilarityEntry, VideoInput},
    protocol::{Notification, NotificationLevel, StopReason, StreamEvent},
};
use similarity_core::{SimilarityBand, Verdict};

const GAUGE_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn gauge_bar(similarity: f64, width: usize) -> String {
    let percentage = similarity.clamp(0.0, 100.0);
    let filled = ((percentage / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        ".".repeat(width - filled),
        percentage.round() as u32
    )
}

pub fn format_entry(entry: &SimilarityEntry, pass_threshold: f64) -> String {
    format!(
        "{}  {:>6.2}%  {}  {}",
        entry.clock(),
        entry.similarity,
        gauge_bar(entry.similarity, GAUGE_WIDTH),
        SimilarityBand::of(entry.similarity, pass_threshold).label()
    )
}

pub fn format_stop_reason(reason: &StopReason) -> String {
    match reason {
        StopReason::Stopped => "stopped".to_string(),
        StopReason::Completed => "completed".to_string(),
        StopReason::Failed { message } => format!("failed: {message}"),
        StopReason::TornDown => "torn down".to_string(),
    }
}

pub fn format_notification(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Info => "info",
        NotificationLevel::Destructive => "error",
    };
    format!(
        "[{marker}] {}: {}",
        notification.title, notification.description
    )
}

pub fn format_input(input: &VideoInput) -> String {
    format!("{:<9} {}", format!("{}:", input.role), input.display_label())
}

pub fn format_summary(current: f64, verdict: Option<Verdict>, entries: usize) -> String {
    let verdict = verdict.map(Verdict::label).unwrap_or("-");
    format!("final similarity {current:.2}%  verdict {verdict}  ({entries} measurements)")
}

pub fn render_event<W: Write>(
    out: &mut W,
    mode: OutputMode,
    pass_threshold: f64,
    event: &StreamEvent,
) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)?;
        return Ok(());
    }

    match event {
        StreamEvent::Started {
            session_id,
            tick_interval_secs,
            max_duration_secs,
            ..
        } => writeln!(
            out,
            "session {session_id} started (tick {tick_interval_secs:.2}s, max {max_duration_secs:.1}s)"
        )?,
        StreamEvent::Tick { entry, .. } => writeln!(out, "{}", format_entry(entry, pass_threshold))?,
        StreamEvent::Stopped {
            reason, entries, ..
        } => writeln!(
            out,
            "session {} after {entries} measurements",
            format_stop_reason(reason)
        )?,
        StreamEvent::Reset => writeln!(out, "session reset")?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
