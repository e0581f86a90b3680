//! Human-readable text output

use crate::config::Config;
use crate::dispatch::RunOutcome;
use crate::stats::histogram::LatencyHistogram;
use crate::util::time::{
    calculate_iops, calculate_throughput, format_duration, format_number, format_rate,
    format_throughput,
};
use crate::Result;
use std::io::{self, Write};

/// Print run results to stdout
///
/// Worker errors are listed first, the way the collector surfaces them,
/// followed by the elapsed time and the derived rates.
pub fn print_results(config: &Config, outcome: &RunOutcome) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, config, outcome)?;
    out.flush()?;
    Ok(())
}

/// Render the report into any writer
pub fn write_results<W: Write>(out: &mut W, config: &Config, outcome: &RunOutcome) -> Result<()> {
    for (worker_id, signal) in outcome.failures() {
        writeln!(out, "Error reported from reader {}: {}", worker_id, signal)?;
    }

    writeln!(out, "Time taken: {}", format_duration(outcome.elapsed))?;
    writeln!(out)?;

    let stats = outcome.total_stats()?;
    let iops = calculate_iops(stats.reads(), outcome.elapsed);
    let throughput = calculate_throughput(stats.bytes(), outcome.elapsed);

    writeln!(out, "Reads:")?;
    writeln!(
        out,
        "  Completed:   {} x {} bytes",
        format_number(stats.reads()),
        config.chunk_size
    )?;
    if outcome.failed_reads() > 0 {
        writeln!(out, "  Failed:      {}", format_number(outcome.failed_reads()))?;
    }
    if outcome.undelivered() > 0 {
        writeln!(
            out,
            "  Undelivered: {}",
            format_number(outcome.undelivered())
        )?;
    }
    writeln!(out, "  IOPS:        {}", format_rate(iops))?;
    writeln!(out, "  Throughput:  {}", format_throughput(throughput))?;
    writeln!(out)?;

    write_latency(out, stats.latency())?;

    let clean = outcome.reports.values().filter(|r| r.signal.is_clean()).count();
    writeln!(
        out,
        "Readers: {} of {} completed cleanly",
        clean,
        outcome.reports.len()
    )?;

    Ok(())
}

fn write_latency<W: Write>(out: &mut W, hist: &LatencyHistogram) -> Result<()> {
    writeln!(out, "Latency:")?;

    if hist.is_empty() {
        writeln!(out, "  No latency data collected")?;
        writeln!(out)?;
        return Ok(());
    }

    if let (Some(min), Some(mean), Some(max)) = (hist.min(), hist.mean(), hist.max()) {
        writeln!(out, "  Min:    {}", format_duration(min))?;
        writeln!(out, "  Mean:   {}", format_duration(mean))?;
        writeln!(out, "  Max:    {}", format_duration(max))?;
    }

    writeln!(out)?;
    writeln!(out, "  Percentiles:")?;
    for &p in &[50.0, 90.0, 99.0, 99.9] {
        if let Some(value) = hist.percentile(p) {
            writeln!(out, "    p{:<5}: {}", p, format_duration(value))?;
        }
    }
    writeln!(out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::worker::WorkerReport;
    use crate::dispatch::TerminalSignal;
    use crate::engine::ReadError;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn outcome() -> RunOutcome {
        let mut clean = WorkerReport::without_signal(0, TerminalSignal::Clean);
        clean.tokens = 2;
        clean.stats.record_read(4096, Duration::from_micros(80));
        clean.stats.record_read(4096, Duration::from_micros(120));

        let failed = WorkerReport::without_signal(
            1,
            TerminalSignal::Failed(ReadError::Open {
                path: "benchmark.dat".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        );

        let mut reports = BTreeMap::new();
        reports.insert(0, clean);
        reports.insert(1, failed);

        RunOutcome {
            elapsed: Duration::from_millis(1500),
            requested: 2,
            reports,
            dispatch: None,
        }
    }

    fn render(outcome: &RunOutcome) -> String {
        let mut buf = Vec::new();
        write_results(&mut buf, &Config::default(), outcome).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_report_lists_errors_and_time() {
        let text = render(&outcome());

        assert!(text.contains("Error reported from reader 1: failed to open benchmark.dat"));
        assert!(text.contains("Time taken: 1.50s"));
        assert!(text.contains("Completed:   2 x 4096 bytes"));
        assert!(text.contains("Readers: 1 of 2 completed cleanly"));
        assert!(text.contains("p50"));
    }

    #[test]
    fn test_report_without_reads() {
        let mut outcome = outcome();
        outcome.reports.remove(&0);
        let text = render(&outcome);

        assert!(text.contains("No latency data collected"));
        assert!(text.contains("Undelivered: 2"));
    }
}
