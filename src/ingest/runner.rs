// src/ingest/runner.rs
//! Line-oriented driver behind the runner binary: one JSON event per input line,
//! one JSON row (receipt or error) per output line.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::{BufRead, Write};

use crate::ingest::{IngestReceipt, Ingestor};

/// Output row for one non-blank input line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LineOutcome {
    Ingested(IngestReceipt),
    Failed {
        line: usize,
        /// `IngestError::kind()`, or `"parse"` for malformed JSON.
        error: &'static str,
        message: String,
    },
}

impl LineOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, LineOutcome::Ingested(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ok: usize,
    pub failed: usize,
}

/// Ingest a single input line. Blank lines yield `None`; `lineno` is 1-based.
pub fn process_line(ingestor: &Ingestor, lineno: usize, line: &str) -> Option<LineOutcome> {
    if line.trim().is_empty() {
        return None;
    }
    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(target: "ingest", line = lineno, error = %e, "invalid JSON line");
            return Some(LineOutcome::Failed {
                line: lineno,
                error: "parse",
                message: e.to_string(),
            });
        }
    };
    Some(match ingestor.ingest(&raw) {
        Ok(receipt) => LineOutcome::Ingested(receipt),
        Err(e) => LineOutcome::Failed {
            line: lineno,
            error: e.kind(),
            message: e.to_string(),
        },
    })
}

/// Drive `input` through `ingestor`, writing one row per non-blank line to `out`.
/// Per-line failures are reported in-band; only I/O errors abort the run.
pub fn run_lines<R: BufRead, W: Write>(
    ingestor: &Ingestor,
    input: R,
    mut out: W,
) -> Result<RunStats> {
    let mut stats = RunStats::default();
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("reading input")?;
        let Some(outcome) = process_line(ingestor, idx + 1, &line) else {
            continue;
        };
        if outcome.is_ok() {
            stats.ok += 1;
        } else {
            stats.failed += 1;
        }
        serde_json::to_writer(&mut out, &outcome).context("writing output row")?;
        out.write_all(b"\n").context("writing output row")?;
    }
    out.flush().context("flushing output")?;
    Ok(stats)
}
