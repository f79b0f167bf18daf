//! Report Text Parsing
//!
//! Two independent passes over the raw text:
//!
//! 1. An order-independent line scan for system-info labels, per-thread CPU
//!    frequency lines, and the four timing phases. Repeated labels overwrite
//!    earlier values (last occurrence wins).
//! 2. A line-classification state machine {seeking-header, in-table, done}
//!    for the benchmark table. The first line carrying all three column
//!    markers (`Dict`, `Speed`, `Usage`) starts the table; the table ends at
//!    the first unrecognized line that does not start with whitespace.
//!
//! Numeric tokens that fail to parse mean "field absent", never an error.

use crate::report::{
    AverageMetrics, BenchmarkTableRow, CompressionMetrics, ParsedReport, PhaseTiming, SystemValue,
    TotalMetrics,
};

/// Fixed system-info labels and the keys they are extracted under.
/// One line may carry several labels (`RAM size: ... # CPU hardware threads: ...`).
const SYSTEM_LABELS: &[(&str, &str)] = &[
    ("RAM size:", "ram_size_mb"),
    ("RAM usage:", "ram_usage_mb"),
    ("# CPU hardware threads:", "cpu_hardware_threads"),
    ("# Benchmark threads:", "benchmark_threads"),
];

/// Timing phase labels, normalized to lowercase keys.
const TIMING_PHASES: &[&str] = &["Kernel", "User", "Process", "Global"];

/// Table state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableState {
    SeekingHeader,
    InTable,
    Done,
}

/// Parse one raw console report into its structured form.
///
/// Total over arbitrary input: anything that cannot be located or parsed is
/// absent from the result, and one bad line never aborts the rest.
pub fn parse_report(text: &str) -> ParsedReport {
    let mut report = ParsedReport::default();

    for line in text.lines() {
        scan_system_info(line, &mut report);
        scan_timing(line, &mut report);
    }

    let mut state = TableState::SeekingHeader;
    for line in text.lines() {
        match state {
            TableState::SeekingHeader => {
                if line.contains("Dict") && line.contains("Speed") && line.contains("Usage") {
                    state = TableState::InTable;
                }
            }
            TableState::InTable => state = classify_table_line(line, &mut report),
            TableState::Done => break,
        }
    }

    report
}

/// Extract labeled scalars and per-thread frequency series from one line.
fn scan_system_info(line: &str, report: &mut ParsedReport) {
    for &(label, key) in SYSTEM_LABELS {
        if let Some(pos) = line.find(label) {
            let rest = &line[pos + label.len()..];
            if let Some(value) = first_integer(rest) {
                report
                    .system_info
                    .insert(key.to_string(), SystemValue::Scalar(value));
            }
        }
    }

    // Per-thread frequency lines look like "2T CPU Freq (MHz): 195% 3538 ...";
    // the series keeps report order, percentage suffixes stripped.
    if let Some(key) = thread_prefix(line) {
        if line.contains("CPU Freq") {
            if let Some((_, rest)) = line.split_once(':') {
                let series: Vec<u64> = rest
                    .split_whitespace()
                    .filter_map(parse_count_token)
                    .collect();
                if !series.is_empty() {
                    report.system_info.insert(key, SystemValue::Series(series));
                }
            }
        }
    }
}

/// Extract one timing phase (`Kernel Time = 0.900 = 1%`) from a line.
fn scan_timing(line: &str, report: &mut ParsedReport) {
    let trimmed = line.trim_start();
    for &phase in TIMING_PHASES {
        if !trimmed.starts_with(phase) {
            continue;
        }
        let after = trimmed[phase.len()..].trim_start();
        if !after.starts_with("Time") {
            continue;
        }
        // "Time =  0.900 =  1%  [Virtual Memory = ...]" - only the first two
        // right-hand sides belong to the phase.
        let mut parts = after.splitn(3, '=');
        let _label = parts.next();
        let seconds = parts
            .next()
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.parse::<f64>().ok());
        let percent = parts
            .next()
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.trim_end_matches('%').parse::<i64>().ok());
        if let (Some(seconds), Some(percent)) = (seconds, percent) {
            report
                .timing
                .insert(phase.to_lowercase(), PhaseTiming { seconds, percent });
        }
    }
}

/// Classify one line inside the table body and dispatch it.
fn classify_table_line(line: &str, report: &mut ParsedReport) -> TableState {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return TableState::InTable;
    }
    // A repeated direction banner does not end the table.
    if line.contains("Compressing") {
        return TableState::InTable;
    }
    if is_separator(trimmed) {
        return TableState::InTable;
    }
    if let Some(rest) = trimmed.strip_prefix("Avr:") {
        let (compress, decompress) = parse_metric_pair(rest);
        report.averages = AverageMetrics {
            compress,
            decompress,
        };
        return TableState::InTable;
    }
    if let Some(rest) = trimmed.strip_prefix("Tot:") {
        report.totals = parse_totals(rest);
        return TableState::InTable;
    }
    if let Some(row) = parse_data_row(trimmed) {
        report.benchmark_table.push(row);
        return TableState::InTable;
    }
    // Indented leftovers (unit legends, partial rows) are skipped; anything
    // else is a new section and the table is over.
    if line.starts_with(char::is_whitespace) {
        return TableState::InTable;
    }
    TableState::Done
}

/// A separator row consists only of dashes, pipes and spaces.
fn is_separator(trimmed: &str) -> bool {
    trimmed.chars().all(|c| c == '-' || c == '|' || c == ' ')
}

/// Parse a `<digits>:` data row into a table row.
fn parse_data_row(trimmed: &str) -> Option<BenchmarkTableRow> {
    let (prefix, rest) = trimmed.split_once(':')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let dict_size = prefix.parse::<u32>().ok()?;
    let (compress, decompress) = parse_metric_pair(rest);
    Some(BenchmarkTableRow {
        dict_size,
        compress,
        decompress,
    })
}

/// Split a row remainder on the pipe into compress/decompress halves and
/// parse each half's first four numeric tokens as a metric group. A half
/// with fewer than four numeric tokens yields no group at all, never a
/// zero-filled one.
fn parse_metric_pair(rest: &str) -> (Option<CompressionMetrics>, Option<CompressionMetrics>) {
    let mut halves = rest.split('|');
    let compress = halves.next().and_then(parse_metric_group);
    let decompress = halves.next().and_then(parse_metric_group);
    (compress, decompress)
}

/// Parse the first four numeric tokens of one half as speed/usage/R-U/rating.
fn parse_metric_group(half: &str) -> Option<CompressionMetrics> {
    let mut numbers = half.split_whitespace().filter_map(parse_count_token);
    Some(CompressionMetrics {
        speed: numbers.next()?,
        usage_percent: numbers.next()?,
        rating_per_usage: numbers.next()?,
        rating: numbers.next()?,
    })
}

/// Parse the `Tot:` remainder: the first three numeric tokens are
/// usage/R-U/rating.
fn parse_totals(rest: &str) -> Option<TotalMetrics> {
    let mut numbers = rest.split_whitespace().filter_map(parse_count_token);
    Some(TotalMetrics {
        usage_percent: numbers.next()?,
        rating_per_usage: numbers.next()?,
        rating: numbers.next()?,
    })
}

/// Parse a count-like token, tolerating a percentage suffix.
/// Returns `None` for anything that is not an integer - absent, not zero.
fn parse_count_token(token: &str) -> Option<u64> {
    token.trim_end_matches('%').parse::<u64>().ok()
}

/// First integer token after a label, e.g. `"   31908 MB, ..."` -> 31908.
fn first_integer(rest: &str) -> Option<u64> {
    rest.split_whitespace()
        .next()
        .map(|t| t.trim_end_matches(','))
        .and_then(|t| t.parse::<u64>().ok())
}

/// `"2T CPU Freq ..."` -> `Some("2T")`.
fn thread_prefix(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let rest = &trimmed[digits.len()..];
    if rest.starts_with('T') {
        Some(format!("{}T", digits))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Condensed but structurally faithful `7z b -bt` console report.
    const FULL_REPORT: &str = "\
7-Zip (z) 21.07 (x64) : Copyright (c) 1999-2021 Igor Pavlov : 2021-12-26
 64-bit locale=C.UTF-8 Threads:16

1T CPU Freq (MHz):  3637  3628  3629
2T CPU Freq (MHz): 195% 3538  3540

RAM size:   31908 MB,  # CPU hardware threads:  16
RAM usage:   1701 MB,  # Benchmark threads:      8

                       Compressing  |                  Decompressing
Dict     Speed Usage    R/U Rating  |      Speed Usage    R/U Rating
         KiB/s     %   MIPS   MIPS  |      KiB/s     %   MIPS   MIPS

22:      41939   628   6490  40759  |     438880   738   5069  37393
23:      39882   622   6525  40600  |     430740   741   5017  37180
24:      37226   611   6545  39990  |     421911   743   4961  36878
----------------------------------  | ------------------------------
Avr:     39682   620   6520  40449  |     430510   741   5016  37150
Tot:             680   5768  38800

Kernel  Time =     0.900 =    1%
User    Time =   127.266 =  179%
Process Time =   128.166 =  180%    Virtual  Memory = 1804 MB
Global  Time =    71.125 =  100%    Physical Memory = 1811 MB
";

    #[test]
    fn test_full_report_sections() {
        let report = parse_report(FULL_REPORT);

        assert_eq!(
            report.system_info.get("ram_size_mb"),
            Some(&SystemValue::Scalar(31908))
        );
        assert_eq!(
            report.system_info.get("ram_usage_mb"),
            Some(&SystemValue::Scalar(1701))
        );
        assert_eq!(
            report.system_info.get("cpu_hardware_threads"),
            Some(&SystemValue::Scalar(16))
        );
        assert_eq!(
            report.system_info.get("benchmark_threads"),
            Some(&SystemValue::Scalar(8))
        );

        assert_eq!(report.benchmark_table.len(), 3);
        assert_eq!(report.benchmark_table[0].dict_size, 22);
        assert_eq!(report.benchmark_table[2].dict_size, 24);

        let avr = report.averages.compress.unwrap();
        assert_eq!(avr.speed, 39682);
        assert_eq!(avr.rating, 40449);

        let tot = report.totals.unwrap();
        assert_eq!(tot.usage_percent, 680);
        assert_eq!(tot.rating_per_usage, 5768);
        assert_eq!(tot.rating, 38800);

        assert_eq!(report.timing.len(), 4);
    }

    #[test]
    fn test_data_row_round_trip() {
        let text = "\
Dict     Speed Usage    R/U Rating  |      Speed Usage    R/U Rating
22:       6185   100   6040   6018  |      34848   100   3001   3000
";
        let report = parse_report(text);
        assert_eq!(report.benchmark_table.len(), 1);
        let row = &report.benchmark_table[0];
        assert_eq!(row.dict_size, 22);
        assert_eq!(
            row.compress,
            Some(CompressionMetrics {
                speed: 6185,
                usage_percent: 100,
                rating_per_usage: 6040,
                rating: 6018,
            })
        );
        assert_eq!(
            row.decompress,
            Some(CompressionMetrics {
                speed: 34848,
                usage_percent: 100,
                rating_per_usage: 3001,
                rating: 3000,
            })
        );
    }

    #[test]
    fn test_averages_row_matches_data_row_rule() {
        let text = "\
Dict     Speed Usage    R/U Rating
Avr:        6185   100   6040   6018  |      34848   100   3001   3000
";
        let report = parse_report(text);
        let compress = report.averages.compress.unwrap();
        assert_eq!(compress.speed, 6185);
        assert_eq!(compress.usage_percent, 100);
        assert_eq!(compress.rating_per_usage, 6040);
        assert_eq!(compress.rating, 6018);
        let decompress = report.averages.decompress.unwrap();
        assert_eq!(decompress.speed, 34848);
        assert_eq!(decompress.rating, 3000);
    }

    #[test]
    fn test_short_half_is_absent_not_zero_filled() {
        let text = "\
Dict     Speed Usage    R/U Rating
22:      41939   628   6490  40759  |     438880   738
Avr:     1 2 3
";
        let report = parse_report(text);
        let row = &report.benchmark_table[0];
        assert!(row.compress.is_some());
        assert!(row.decompress.is_none());
        assert!(report.averages.compress.is_none());
        assert!(report.averages.decompress.is_none());
    }

    #[test]
    fn test_malformed_token_skipped_within_row() {
        // "x628" fails to parse; remaining tokens still form a full group
        let text = "\
Dict     Speed Usage    R/U Rating
22:      41939   x628   6490  40759  17
";
        let report = parse_report(text);
        let compress = report.benchmark_table[0].compress.unwrap();
        assert_eq!(compress.speed, 41939);
        assert_eq!(compress.usage_percent, 6490);
        assert_eq!(compress.rating_per_usage, 40759);
        assert_eq!(compress.rating, 17);
    }

    #[test]
    fn test_timing_line() {
        let report = parse_report("Kernel  Time =     0.900 =    1%\n");
        let kernel = &report.timing["kernel"];
        assert!((kernel.seconds - 0.900).abs() < 1e-9);
        assert_eq!(kernel.percent, 1);
    }

    #[test]
    fn test_timing_line_with_trailing_memory_column() {
        let report = parse_report("Process Time =   128.166 =  180%    Virtual  Memory = 1804 MB\n");
        let process = &report.timing["process"];
        assert!((process.seconds - 128.166).abs() < 1e-9);
        assert_eq!(process.percent, 180);
    }

    #[test]
    fn test_frequency_series_strips_percent_suffix() {
        let report = parse_report("2T CPU Freq (MHz): 195% 3538  3540\n");
        assert_eq!(
            report.system_info.get("2T"),
            Some(&SystemValue::Series(vec![195, 3538, 3540]))
        );
    }

    #[test]
    fn test_global_freq_line_without_thread_prefix_ignored() {
        let report = parse_report("CPU Freq: 64000000 64000000 64000000\n");
        assert!(report.system_info.is_empty());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let text = "RAM size:   1024 MB\nRAM size:   2048 MB\n";
        let report = parse_report(text);
        assert_eq!(
            report.system_info.get("ram_size_mb"),
            Some(&SystemValue::Scalar(2048))
        );
    }

    #[test]
    fn test_table_stops_at_new_section() {
        let text = "\
Dict     Speed Usage    R/U Rating
22:      41939   628   6490  40759
Some new section header
23:      39882   622   6525  40600
";
        let report = parse_report(text);
        // The 23: row comes after the table ended and must not be collected
        assert_eq!(report.benchmark_table.len(), 1);
    }

    #[test]
    fn test_indented_garbage_inside_table_skipped() {
        let text = "\
Dict     Speed Usage    R/U Rating
         KiB/s     %   MIPS   MIPS
   stray indented note
22:      41939   628   6490  40759
";
        let report = parse_report(text);
        assert_eq!(report.benchmark_table.len(), 1);
    }

    #[test]
    fn test_parser_is_total_on_degenerate_input() {
        for text in ["", "\n", "complete garbage\nmore garbage", "Avr: |"] {
            let report = parse_report(text);
            assert!(report.benchmark_table.is_empty());
            assert!(report.averages.is_empty());
            assert!(report.totals.is_none());
        }
    }

    #[test]
    fn test_no_table_yields_empty_sections_not_error() {
        let report = parse_report("RAM size: 31908 MB\nKernel Time = 1.0 = 2%\n");
        assert!(report.benchmark_table.is_empty());
        assert!(report.averages.is_empty());
        assert!(report.totals.is_none());
        assert!(!report.system_info.is_empty());
        assert!(!report.timing.is_empty());
    }

    #[test]
    fn test_empty_sections_omitted_from_json() {
        let json = serde_json::to_value(parse_report("")).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn test_full_report_serialization_keys() {
        let json = serde_json::to_value(parse_report(FULL_REPORT)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("system_info"));
        assert!(obj.contains_key("timing"));
        assert!(obj.contains_key("benchmark_table"));
        assert!(obj.contains_key("averages"));
        assert!(obj.contains_key("totals"));
    }
}
