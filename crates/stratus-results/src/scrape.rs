//! Metric recovery from unstructured solver trace logs.
//!
//! The trace stream has no record delimiters. The one reliable anchor is
//! the terminal solution-time line of a solve: metrics logged before it are
//! recovered by scanning backward within a bounded window (so a previous,
//! unrelated solve in the same log cannot contaminate the result), and
//! bound/gap metrics logged after it are recovered by scanning forward to
//! the end of the stream.

use stratus_core::{ErrorInfo, HarnessError};

/// Sentinel marking the terminal line of one Benders solve.
pub const ANCHOR_SENTINEL: &str = "Benders solution time:";

/// How many lines before the anchor the backward scan may inspect.
pub const SCAN_WINDOW: usize = 50;

/// Extracts the value portion of a `prefix | label: value` log line.
fn value_word(line: &str) -> Result<&str, HarnessError> {
    let after_pipe = line.split('|').nth(1).ok_or_else(|| malformed(line))?;
    let after_colon = after_pipe.split(':').nth(1).ok_or_else(|| malformed(line))?;
    Ok(after_colon.trim())
}

/// Truncates a value token at its first space, dropping unit suffixes
/// (`12.3 seconds` -> `12.3`).
fn numeric_token(word: &str) -> &str {
    word.split_whitespace().next().unwrap_or("")
}

fn malformed(line: &str) -> HarnessError {
    HarnessError::Parse(
        ErrorInfo::new("log-line-malformed", "log line has no `| label: value` shape")
            .with_context("line", line.trim()),
    )
}

fn checked<T: std::str::FromStr>(token: &str, line: &str) -> Result<String, HarnessError> {
    token.parse::<T>().map_err(|_| {
        HarnessError::Parse(
            ErrorInfo::new("metric-malformed", "metric token is not numeric")
                .with_context("token", token)
                .with_context("line", line.trim()),
        )
    })?;
    Ok(token.to_string())
}

/// Scrapes Benders metrics out of a trace log.
///
/// Field values keep the exact numeric tokens from the log, validated as
/// parseable integers or floats. A log with no anchor line is a parse
/// failure: the caller asked for Benders metrics from a log that never
/// finished a Benders solve.
pub fn scrape_benders_metrics(lines: &[String]) -> Result<Vec<(String, String)>, HarnessError> {
    let mut anchor = None;
    let mut solve_time = None;
    for (idx, line) in lines.iter().enumerate() {
        if line.contains(ANCHOR_SENTINEL) {
            anchor = Some(idx);
            let token = numeric_token(value_word(line)?).to_string();
            solve_time = Some(checked::<f64>(&token, line)?);
        }
    }
    let (anchor, solve_time) = match (anchor, solve_time) {
        (Some(anchor), Some(time)) => (anchor, time),
        _ => {
            return Err(HarnessError::Parse(
                ErrorInfo::new("anchor-missing", "no terminal solution-time line in log")
                    .with_context("sentinel", ANCHOR_SENTINEL),
            ))
        }
    };

    let mut iterations = None;
    let mut cuts = None;
    let mut gap_percent = None;
    // Scanning backward, the first match wins: it is the one nearest the
    // anchor, so an earlier solve block inside the window cannot shadow it.
    let window_start = anchor.saturating_sub(SCAN_WINDOW);
    for idx in (window_start..anchor).rev() {
        let line = &lines[idx];
        if cuts.is_none() && line.contains("number of cuts added") {
            cuts = Some(checked::<i64>(value_word(line)?, line)?);
        } else if iterations.is_none() && line.contains("----- iteration") {
            iterations = Some(checked::<i64>(value_word(line)?, line)?);
        } else if gap_percent.is_none() && line.contains("Benders gap (%)") {
            gap_percent = Some(checked::<f64>(value_word(line)?, line)?);
        }
    }

    let mut upper_bound = None;
    let mut global_gap = None;
    for line in &lines[anchor..] {
        if line.contains("Benders global upper bound") {
            upper_bound = Some(checked::<f64>(value_word(line)?, line)?);
        } else if line.contains("Benders global optimality gap") {
            let token = numeric_token(value_word(line)?).to_string();
            global_gap = Some(checked::<f64>(&token, line)?);
        }
    }

    let mut fields = vec![("bendersTimeInSec".to_string(), solve_time)];
    if let Some(value) = iterations {
        fields.push(("bendersIterations".to_string(), value));
    }
    if let Some(value) = cuts {
        fields.push(("bendersCuts".to_string(), value));
    }
    if let Some(value) = gap_percent {
        fields.push(("bendersGapPercent".to_string(), value));
    }
    if let Some(value) = upper_bound {
        fields.push(("bendersGlobalUpperBound".to_string(), value));
    }
    if let Some(value) = global_gap {
        fields.push(("bendersGlobalOptimalityGap".to_string(), value));
    }
    Ok(fields)
}

/// Recovers run metadata from the invocation line the executor logs ahead
/// of every solver call (`command: java … -name s1 … -x budget_3 …`).
pub fn parse_invocation_line(lines: &[String]) -> Result<Vec<(String, String)>, HarnessError> {
    let line = lines
        .iter()
        .find(|line| line.contains("command: "))
        .ok_or_else(|| {
            HarnessError::Parse(ErrorInfo::new(
                "invocation-missing",
                "no invocation line in log",
            ))
        })?;
    let words: Vec<&str> = line
        .split("command: ")
        .nth(1)
        .unwrap_or("")
        .split_whitespace()
        .collect();
    let mut flag_values = Vec::new();
    for (idx, word) in words.iter().enumerate() {
        if word.starts_with('-') {
            if let Some(value) = words.get(idx + 1).filter(|w| !w.starts_with('-')) {
                flag_values.push((*word, *value));
            }
        }
    }
    let lookup = |flag: &str| {
        flag_values
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, v)| v.to_string())
    };

    let mut fields = Vec::new();
    if let Some(name) = lookup("-name") {
        fields.push(("runName".to_string(), name));
    }
    if let Some(output_name) = lookup("-x") {
        // Output names are `<class>_<id>`.
        if let Some((class, id)) = output_name.rsplit_once('_') {
            fields.push(("runType".to_string(), class.to_string()));
            fields.push(("runId".to_string(), id.to_string()));
        }
    }
    if fields.is_empty() {
        return Err(HarnessError::Parse(
            ErrorInfo::new("invocation-malformed", "invocation line carries no run metadata")
                .with_context("line", line.trim()),
        ));
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    const SECOND_SOLVE: &str = "\
10:00:00 INFO | ----- iteration: 4
10:00:01 INFO | number of cuts added: 12
10:00:02 INFO | Benders gap (%): 1.25
10:00:03 INFO | Benders solution time: 42.5 seconds
10:00:04 INFO | Benders global upper bound: 9100.0
10:00:05 INFO | Benders global optimality gap: 0.75 %
unrelated trailing noise
11:00:00 INFO | ----- iteration: 9
11:00:01 INFO | number of cuts added: 31
11:00:02 INFO | Benders gap (%): 0.4
11:00:03 INFO | Benders solution time: 17.25 seconds
11:00:04 INFO | Benders global upper bound: 8000.5
11:00:05 INFO | Benders global optimality gap: 0.1 %
";

    #[test]
    fn metrics_come_from_the_last_solve_block() {
        let fields = scrape_benders_metrics(&lines(SECOND_SOLVE)).unwrap();
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("bendersTimeInSec"), Some("17.25"));
        assert_eq!(get("bendersIterations"), Some("9"));
        assert_eq!(get("bendersCuts"), Some("31"));
        assert_eq!(get("bendersGapPercent"), Some("0.4"));
        assert_eq!(get("bendersGlobalUpperBound"), Some("8000.5"));
        assert_eq!(get("bendersGlobalOptimalityGap"), Some("0.1"));
    }

    #[test]
    fn backward_scan_is_window_bounded() {
        let mut text = String::from("09:00:00 INFO | number of cuts added: 999\n");
        for _ in 0..60 {
            text.push_str("filler line\n");
        }
        text.push_str("10:00:00 INFO | Benders solution time: 5.0 seconds\n");
        let fields = scrape_benders_metrics(&lines(&text)).unwrap();
        assert!(fields.iter().all(|(k, _)| k != "bendersCuts"));
    }

    #[test]
    fn missing_anchor_is_a_parse_failure() {
        let err = scrape_benders_metrics(&lines("no solves here\n")).unwrap_err();
        assert_eq!(err.info().code, "anchor-missing");
    }

    #[test]
    fn malformed_metric_token_is_a_parse_failure() {
        let text = "10:00:00 INFO | Benders solution time: n/a seconds\n";
        let err = scrape_benders_metrics(&lines(text)).unwrap_err();
        assert_eq!(err.info().code, "metric-malformed");
    }

    #[test]
    fn unit_suffix_is_truncated() {
        let text = "10:00:00 INFO | Benders solution time: 99.125 seconds\n";
        let fields = scrape_benders_metrics(&lines(text)).unwrap();
        assert_eq!(fields[0], ("bendersTimeInSec".to_string(), "99.125".to_string()));
    }

    #[test]
    fn invocation_line_recovers_run_metadata() {
        let text =
            "command: java -Xms32m -Xmx32g -jar solver.jar -batch -name s4 -r 0.75 -x budget_12\n";
        let fields = parse_invocation_line(&lines(text)).unwrap();
        assert!(fields.contains(&("runName".to_string(), "s4".to_string())));
        assert!(fields.contains(&("runType".to_string(), "budget".to_string())));
        assert!(fields.contains(&("runId".to_string(), "12".to_string())));
    }
}
