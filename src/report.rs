//! Run reporting: progress lines, console summary, JSON result file.

use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::bench::{RunResult, Summary, TrialResult};
use crate::types::Result;

/// Result-file document: the full run plus its summary.
#[derive(Debug, Serialize)]
pub struct BenchReport<'a> {
    #[serde(flatten)]
    pub run: &'a RunResult,
    pub summary: &'a Summary,
}

impl<'a> BenchReport<'a> {
    pub fn new(run: &'a RunResult, summary: &'a Summary) -> Self {
        Self { run, summary }
    }

    /// Write as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "null".to_string(), |v| v.to_string())
}

/// One line per completed trial, e.g. `[3/50] OK status=200 ttft=412ms total=1830ms`.
///
/// `index` is zero-based; the line shows it one-based.
pub fn progress_line(label: Option<&str>, index: usize, of: usize, result: &TrialResult) -> String {
    let position = match label {
        Some(label) => format!("{} {}/{}", label, index + 1, of),
        None => format!("{}/{}", index + 1, of),
    };
    let mut line = format!(
        "[{}] {} status={} ttft={}ms total={}ms",
        position,
        if result.is_ok() { "OK" } else { "FAIL" },
        result.http_status,
        fmt_opt(result.timings.ttft_ms),
        fmt_opt(result.timings.total_ms),
    );
    if let Some(error) = &result.error {
        let _ = write!(line, " error={:?}", error);
    }
    line
}

/// Console summary block printed at the end of a run.
pub fn render_summary(run: &RunResult, summary: &Summary) -> String {
    let config = &run.config;
    let rows: [(&str, String); 13] = [
        ("run id", run.run_id.to_string()),
        ("base url", config.base_url.clone()),
        ("scenario", config.scenario.to_string()),
        ("model", config.model.clone()),
        ("temperature", config.temperature.to_string()),
        ("max_tokens", config.max_tokens.to_string()),
        ("warmup", config.warmup.to_string()),
        ("trials", format!("{} (measured)", config.trials)),
        ("concurrency", config.concurrency.to_string()),
        ("ok/fail", format!("{}/{}", summary.ok, summary.fail)),
        (
            "ttft_ms p50/p95",
            format!("{}/{}", fmt_opt(summary.ttft_ms.p50), fmt_opt(summary.ttft_ms.p95)),
        ),
        (
            "total_ms p50/p95",
            format!("{}/{}", fmt_opt(summary.total_ms.p50), fmt_opt(summary.total_ms.p95)),
        ),
        ("tokens/sec (approx)", fmt_opt(summary.tokens_per_sec)),
    ];

    let mut out = String::from("Summary\n");
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<21}{}", format!("{}:", label), value);
    }
    out
}
