//! Human-readable rendering of process tables and RR results.
//!
//! Rendering is pure (`render_*` return strings); `TextDisplay` writes them
//! to any `io::Write`.

use std::fmt::Write as _;
use std::io;

use crate::process::ProcessRecord;
use crate::round_robin::RrReport;
use crate::table::format::{encode_row, TABLE_HEADER};

const RULE_WIDTH: usize = 40;

/// Sink for table snapshots and RR results.
pub trait TableDisplay {
    fn snapshot(&mut self, title: &str, records: &[ProcessRecord]);
    fn rr_results(&mut self, report: &RrReport);
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDisplay;

impl TableDisplay for NullDisplay {
    fn snapshot(&mut self, _title: &str, _records: &[ProcessRecord]) {}
    fn rr_results(&mut self, _report: &RrReport) {}
}

/// Writes rendered text to `out`. Write failures are logged, not returned.
pub struct TextDisplay<W: io::Write> {
    out: W,
}

impl<W: io::Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(err) = self.out.write_all(text.as_bytes()) {
            log::warn!("failed to write display output: {err}");
        }
    }
}

impl TextDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: io::Write> TableDisplay for TextDisplay<W> {
    fn snapshot(&mut self, title: &str, records: &[ProcessRecord]) {
        let text = render_snapshot(title, records);
        self.emit(&text);
    }

    fn rr_results(&mut self, report: &RrReport) {
        let text = render_rr_results(report);
        self.emit(&text);
    }
}

/// Titled table with one row per process, sorted by pid.
pub fn render_snapshot(title: &str, records: &[ProcessRecord]) -> String {
    let mut sorted: Vec<&ProcessRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.pid);

    let mut out = String::new();
    let bar = "=".repeat(10);
    let _ = writeln!(out, "\n{bar} {title} {bar}");
    let _ = writeln!(out, "{TABLE_HEADER}");
    for r in sorted {
        let _ = writeln!(out, "{}", encode_row(r));
    }
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
    out
}

/// Burst/wait/turnaround per process plus both averages to 2 decimals.
pub fn render_rr_results(report: &RrReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} | {:>10} | {:>12} | {:>15}",
        "Process", "Burst Time", "Waiting Time", "Turnaround Time"
    );
    for (pid, o) in report.rows() {
        let name = format!("P{pid}");
        let _ = writeln!(
            out,
            "{:<8} | {:>10} | {:>12} | {:>15}",
            name, o.burst, o.wait, o.turnaround
        );
    }
    let _ = writeln!(out, "\nAverage waiting time: {:.2}", report.avg_wait);
    let _ = writeln!(out, "Average turnaround time: {:.2}", report.avg_turnaround);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Pid;
    use crate::round_robin::{RoundRobinScheduler, RrJob};

    #[test]
    fn snapshot_lists_rows_in_pid_order() {
        let text = render_snapshot(
            "Initial state",
            &[
                ProcessRecord::new(Pid::new(1), 5),
                ProcessRecord::new(Pid::new(0), 3),
            ],
        );
        assert!(text.contains("========== Initial state =========="));
        let zero = text.find("0\t3\t0\tREADY").unwrap();
        let one = text.find("1\t5\t0\tREADY").unwrap();
        assert!(zero < one);
    }

    #[test]
    fn rr_results_format_averages() {
        let jobs = [
            RrJob {
                pid: Pid::new(1),
                burst: 4,
            },
            RrJob {
                pid: Pid::new(2),
                burst: 1,
            },
        ];
        let report = RoundRobinScheduler::schedule_jobs(&jobs, 2).unwrap();
        let text = render_rr_results(&report);
        assert!(text.contains("P1 "));
        assert!(text.contains("Average waiting time: 1.50"));
        assert!(text.contains("Average turnaround time: 4.00"));
    }

    #[test]
    fn text_display_writes_to_buffer() {
        let mut display = TextDisplay::new(Vec::new());
        display.snapshot("t", &[ProcessRecord::new(Pid::new(0), 1)]);
        let bytes = display.into_inner();
        assert!(String::from_utf8(bytes).unwrap().contains("READY"));
    }
}
