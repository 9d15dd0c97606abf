//! Run summaries printed at the end of a command.

use log::info;
use strum::IntoEnumIterator;

use crate::app::bench::{fastest, ScenarioResult};
use crate::error_handling::{LoadStats, SkipReason};
use crate::pipeline::LoadReport;

/// Prints the one-line outcome of a load.
pub fn print_load_summary(report: &LoadReport) {
    info!(
        "✅ Loaded {} record{} in {:.2}s (~{:.0} records/sec), {} skipped of {} rows read",
        report.records_written,
        if report.records_written == 1 { "" } else { "s" },
        report.elapsed.as_secs_f64(),
        report.records_per_second(),
        report.records_skipped,
        report.rows_read
    );
}

/// Prints non-zero skip counters by reason.
pub fn print_skip_statistics(stats: &LoadStats) {
    let total = stats.total_skipped();
    if total == 0 {
        return;
    }
    info!("Skipped rows ({} total):", total);
    for reason in SkipReason::iter() {
        let count = stats.skipped(reason);
        if count > 0 {
            info!("   {}: {}", reason.as_str(), count);
        }
    }
}

/// Renders the benchmark result table, fastest scenario last.
pub fn format_bench_table(results: &[ScenarioResult]) -> String {
    let mut lines = vec![
        format!(
            "{:<50} {:>10} {:>12} {:>14} {:<8}",
            "Scenario", "Time (s)", "Rows", "Records/sec", "Status"
        ),
        "-".repeat(98),
    ];
    for result in results {
        lines.push(format!(
            "{:<50} {:>10.2} {:>12} {:>14.0} {:<8}",
            result.scenario.label(),
            result.elapsed_seconds,
            result.rows_in_table,
            result.records_per_second,
            if result.succeeded() { "OK" } else { "FAILED" }
        ));
    }

    if let Some(best) = fastest(results) {
        lines.push(String::new());
        lines.push(format!(
            "🏆 Fastest: {} in {:.2}s, {} rows (~{:.0} records/sec)",
            best.scenario.label(),
            best.elapsed_seconds,
            best.rows_in_table,
            best.records_per_second
        ));
    }
    lines.join("\n")
}

pub fn print_bench_results(results: &[ScenarioResult]) {
    for line in format_bench_table(results).lines() {
        info!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bench::{LoadMode, Scenario};
    use crate::storage::WriteStrategy;
    use std::time::Duration;

    fn result(strategy: WriteStrategy, secs: f64, ok: bool) -> ScenarioResult {
        ScenarioResult {
            scenario: Scenario {
                strategy,
                batch_size: 1000,
                workers: 8,
                mode: LoadMode::Streaming,
            },
            elapsed_seconds: secs,
            rows_in_table: 2000,
            records_per_second: 2000.0 / secs,
            error: (!ok).then(|| "boom".to_string()),
        }
    }

    #[test]
    fn test_bench_table_lists_each_scenario_and_fastest() {
        let table = format_bench_table(&[
            result(WriteStrategy::MultiStatement, 8.0, true),
            result(WriteStrategy::BulkCopy, 1.0, true),
            result(WriteStrategy::MultiRow, 0.1, false),
        ]);
        assert!(table.contains("multi-statement streaming"));
        assert!(table.contains("FAILED"));
        let last = table.lines().last().expect("has lines");
        assert!(last.contains("Fastest: bulk-copy"), "{last}");
        assert!(last.contains("2000 rows"));
    }

    #[test]
    fn test_bench_table_without_success_has_no_winner() {
        let table = format_bench_table(&[result(WriteStrategy::MultiRow, 1.0, false)]);
        assert!(!table.contains("Fastest"));
    }

    #[test]
    fn test_print_helpers_do_not_panic() {
        let stats = LoadStats::new();
        print_skip_statistics(&stats);
        stats.record_skip(SkipReason::InvalidDate);
        print_skip_statistics(&stats);
        print_load_summary(&LoadReport {
            rows_read: 2,
            records_parsed: 1,
            records_skipped: 1,
            batches_written: 1,
            records_written: 1,
            elapsed: Duration::from_millis(10),
        });
    }
}
