//! JSON output formatting
//!
//! One JSON document per run, written to stdout. Nothing is persisted.

use crate::config::Config;
use crate::dispatch::generator::DispatchSummary;
use crate::dispatch::RunOutcome;
use crate::stats::histogram::LatencySummary;
use crate::util::time::{calculate_iops, calculate_throughput, format_duration};
use crate::Result;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;

/// Duration with both microseconds and human-readable format
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuration {
    pub micros: u64,
    pub human: String,
}

impl JsonDuration {
    pub fn from_duration(d: Duration) -> Self {
        Self {
            micros: d.as_micros() as u64,
            human: format_duration(d),
        }
    }
}

/// Terminal state of one reader
#[derive(Debug, Clone, Serialize)]
pub struct JsonWorker {
    pub id: usize,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tokens: u64,
    pub reads: u64,
}

/// Complete run report
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub timestamp: String,
    pub config: &'a Config,
    pub elapsed: JsonDuration,
    pub clean: bool,
    pub requested: u64,
    pub successful_reads: u64,
    pub failed_reads: u64,
    pub undelivered: u64,
    pub bytes: u64,
    pub iops: f64,
    pub bytes_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchSummary>,
    pub workers: Vec<JsonWorker>,
}

/// Build the report for `outcome`
pub fn build_report<'a>(config: &'a Config, outcome: &RunOutcome) -> Result<JsonReport<'a>> {
    let stats = outcome.total_stats()?;

    let workers = outcome
        .reports
        .values()
        .map(|r| JsonWorker {
            id: r.worker_id,
            outcome: r.signal.kind(),
            error: (!r.signal.is_clean()).then(|| r.signal.to_string()),
            tokens: r.tokens,
            reads: r.stats.reads(),
        })
        .collect();

    Ok(JsonReport {
        timestamp: chrono::Local::now().to_rfc3339(),
        config,
        elapsed: JsonDuration::from_duration(outcome.elapsed),
        clean: outcome.is_clean(),
        requested: outcome.requested,
        successful_reads: outcome.successful_reads(),
        failed_reads: outcome.failed_reads(),
        undelivered: outcome.undelivered(),
        bytes: stats.bytes(),
        iops: calculate_iops(stats.reads(), outcome.elapsed),
        bytes_per_sec: calculate_throughput(stats.bytes(), outcome.elapsed),
        latency: stats.latency().summary(),
        dispatch: outcome.dispatch,
        workers,
    })
}

/// Print the report as pretty JSON on stdout
pub fn print_results(config: &Config, outcome: &RunOutcome) -> Result<()> {
    let report = build_report(config, outcome)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::worker::WorkerReport;
    use crate::dispatch::TerminalSignal;
    use std::collections::BTreeMap;

    #[test]
    fn test_build_report() {
        let mut worker = WorkerReport::without_signal(0, TerminalSignal::Clean);
        worker.tokens = 3;
        for _ in 0..3 {
            worker.stats.record_read(4096, Duration::from_micros(100));
        }
        let timed_out = WorkerReport::without_signal(1, TerminalSignal::TimedOut);

        let mut reports = BTreeMap::new();
        reports.insert(0, worker);
        reports.insert(1, timed_out);

        let outcome = RunOutcome {
            elapsed: Duration::from_secs(1),
            requested: 10,
            reports,
            dispatch: None,
        };
        let config = Config::default();

        let report = build_report(&config, &outcome).unwrap();
        assert!(!report.clean);
        assert_eq!(report.successful_reads, 3);
        assert_eq!(report.undelivered, 7);
        assert_eq!(report.bytes, 3 * 4096);
        assert_eq!(report.iops, 3.0);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["elapsed"]["micros"], 1_000_000);
        assert_eq!(value["config"]["chunk_size"], 4096);
        assert_eq!(value["workers"][0]["outcome"], "clean");
        assert!(value["workers"][0].get("error").is_none());
        assert_eq!(value["workers"][1]["outcome"], "timed_out");
        assert!(value.get("dispatch").is_none());
        assert!(value["latency"]["p50_us"].as_f64().unwrap() > 0.0);
    }
}
