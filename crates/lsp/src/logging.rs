// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Log File Setup
//!
//! This module wires tracing to a per-session log file.
//!
//! ## Overview
//!
//! Log lines go to `$HOME/.jasmin-lsp/jasmin-lsp-YYYYMMDD-HHMMSS.log`,
//! falling back to `/tmp/jasmin-lsp/` and finally to stderr only. Each
//! line is prefixed `[LOG HH:MM:SS]`, and session start/end markers
//! bracket the file. stdout is never written to: it carries the LSP
//! protocol.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{Event, Subscriber, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Keeps the logging session open; logs the end marker when dropped
pub struct LogGuard {
    _private: (),
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        info!("=== jasmin-lsp session end ===");
    }
}

/// `[LOG HH:MM:SS] message` line format
struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "[LOG {}] ", chrono::Local::now().format("%H:%M:%S"))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initialize session logging
///
/// File logging failures degrade silently to stderr-only. Safe to call
/// more than once (later calls keep the first subscriber).
pub fn init() -> LogGuard {
    let writer = match open_log_file() {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jasmin_lsp=debug,tower_lsp=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(LogLineFormat)
        .with_writer(writer)
        .try_init();

    info!("=== jasmin-lsp session start ===");

    LogGuard { _private: () }
}

/// Open the session log file, trying the home directory then /tmp
fn open_log_file() -> Option<File> {
    let name = format!(
        "jasmin-lsp-{}.log",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );

    let candidates = [
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".jasmin-lsp")),
        Some(PathBuf::from("/tmp/jasmin-lsp")),
    ];

    for dir in candidates.into_iter().flatten() {
        if fs::create_dir_all(&dir).is_err() {
            continue;
        }
        if let Ok(file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(&name))
        {
            return Some(file);
        }
    }

    None
}
