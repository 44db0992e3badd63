//! Text layout of the persisted process table.
//!
//! ```text
//! PID	TP(remaining)	CP	EP(state)	NES	N_CPU
//! 0	9000	1000	READY	0	1
//! 1	5000	0	RUNNING	0	1
//! ```
//!
//! Fields are tab-separated, rows are sorted by ascending pid, and the file
//! always starts with the header row. On read the header only has to name
//! `PID` first and carry at least six columns; column titles vary between
//! writers. Columns past the sixth are ignored.

use crate::error::PersistError;
use crate::process::{Pid, ProcState, ProcessRecord};

pub const TABLE_HEADER: &str = "PID\tTP(remaining)\tCP\tEP(state)\tNES\tN_CPU";

const DELIM: char = '\t';
const FIELDS: usize = 6;

/// Render `records` as table text, sorted by pid.
pub fn encode_table(records: &[ProcessRecord]) -> String {
    let mut sorted: Vec<&ProcessRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.pid);

    let mut out = String::with_capacity(TABLE_HEADER.len() + 1 + sorted.len() * 32);
    out.push_str(TABLE_HEADER);
    out.push('\n');
    for r in sorted {
        out.push_str(&encode_row(r));
        out.push('\n');
    }
    out
}

/// Render a single row without a trailing newline.
pub fn encode_row(r: &ProcessRecord) -> String {
    format!(
        "{}{DELIM}{}{DELIM}{}{DELIM}{}{DELIM}{}{DELIM}{}",
        r.pid, r.total_remaining, r.cp, r.state, r.nes, r.n_cpu
    )
}

/// Parse table text. Line numbers in errors are 1-based.
///
/// An empty input or a missing header is a format error: a reader racing a
/// non-atomic writer would see exactly that.
pub fn decode_table(text: &str) -> Result<Vec<ProcessRecord>, PersistError> {
    let mut lines = text.lines().enumerate();
    match lines.next() {
        Some((_, header)) if is_header(header) => {}
        Some((_, header)) => {
            return Err(PersistError::format(1, format!("unexpected header {header:?}")))
        }
        None => return Err(PersistError::format(1, "empty table")),
    }

    let mut rows = Vec::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        rows.push(decode_row(line).map_err(|detail| PersistError::format(idx + 1, detail))?);
    }
    rows.sort_by_key(|r| r.pid);
    Ok(rows)
}

fn is_header(line: &str) -> bool {
    let mut cols = line.trim_end().split(DELIM);
    cols.next().map(str::trim) == Some("PID") && cols.count() + 1 >= FIELDS
}

fn decode_row(line: &str) -> Result<ProcessRecord, String> {
    let parts: Vec<&str> = line.trim_end().split(DELIM).collect();
    if parts.len() < FIELDS {
        return Err(format!("expected at least {FIELDS} fields, found {}", parts.len()));
    }
    let int = |idx: usize, name: &str| -> Result<u64, String> {
        parts[idx]
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("{name}: {e}"))
    };
    let pid = u32::try_from(int(0, "PID")?).map_err(|e| format!("PID: {e}"))?;
    let state: ProcState = parts[3].trim().parse().map_err(|e| format!("EP: {e}"))?;
    Ok(ProcessRecord {
        pid: Pid::new(pid),
        total_remaining: int(1, "TP")?,
        cp: int(2, "CP")?,
        state,
        nes: int(4, "NES")?,
        n_cpu: int(5, "N_CPU")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pid: u32, tp: u64, cp: u64, state: ProcState) -> ProcessRecord {
        ProcessRecord {
            pid: Pid::new(pid),
            total_remaining: tp,
            cp,
            state,
            nes: 1,
            n_cpu: 2,
        }
    }

    #[test]
    fn encode_sorts_rows_by_pid() {
        let text = encode_table(&[
            rec(2, 10, 0, ProcState::Ready),
            rec(0, 0, 5, ProcState::Terminated),
        ]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], TABLE_HEADER);
        assert_eq!(lines[1], "0\t0\t5\tTERMINATED\t1\t2");
        assert_eq!(lines[2], "2\t10\t0\tREADY\t1\t2");
    }

    #[test]
    fn decode_reads_encoded_table() {
        let rows = vec![
            rec(0, 3, 7, ProcState::Blocked),
            rec(1, 9, 1, ProcState::Running),
        ];
        assert_eq!(decode_table(&encode_table(&rows)).unwrap(), rows);
    }

    #[test]
    fn empty_and_headerless_inputs_are_errors() {
        assert!(decode_table("").is_err());
        assert!(decode_table("0\t1\t2\tREADY\t0\t0\n").is_err());
    }

    #[test]
    fn truncated_row_reports_line() {
        let text = format!("{TABLE_HEADER}\n0\t1\t2\tREADY\t0\t0\n1\t4\t");
        match decode_table(&text) {
            Err(PersistError::Format { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_state_is_rejected() {
        let text = format!("{TABLE_HEADER}\n0\t1\t2\tPRONTO\t0\t0\n");
        assert!(decode_table(&text).is_err());
    }

    #[test]
    fn other_writers_header_spellings_are_accepted() {
        for header in [
            "PID\tTP(remaining)\tCP\tEP(state)\tNES\tN_CPU",
            "PID\tTP(restante)\tCP\tEP\tNES\tN_CPU",
            "PID\tTP\tCP\tEP\tNES\tN_CPU",
        ] {
            let rows = decode_table(&format!("{header}\n0\t10\t0\tREADY\t0\t0\n")).unwrap();
            assert_eq!(rows, vec![ProcessRecord::new(Pid::new(0), 10)], "{header}");
        }
    }

    #[test]
    fn short_or_misnamed_header_is_rejected() {
        assert!(decode_table("PID\tTP\tCP\n0\t10\t0\tREADY\t0\t0\n").is_err());
        assert!(decode_table("ID\tTP\tCP\tEP\tNES\tN_CPU\n").is_err());
    }

    #[test]
    fn trailing_columns_are_ignored() {
        let text = format!("{TABLE_HEADER}\tNOTE\n3\t4\t5\tBLOCKED\t1\t2\tslow disk\n");
        let rows = decode_table(&text).unwrap();
        assert_eq!(rows, vec![rec(3, 4, 5, ProcState::Blocked)]);
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let text = format!("{TABLE_HEADER}\r\n4\t0\t8\tTERMINATED\t0\t3\r\n");
        let rows = decode_table(&text).unwrap();
        assert_eq!(rows[0].pid, Pid::new(4));
    }
}
