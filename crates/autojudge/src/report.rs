//! Plain-text reports
//!
//! Two formats are produced. Summary lines (`[TEST POINT n] ... [SCORE] s`)
//! are stable and can be parsed back with [`parse_summary`]. Detail blocks
//! describe a single test point for a person to read.

use crate::runner::TestPointRun;
use crate::types::{TaskResult, Verdict};

const RULE_WIDTH: usize = 60;
const ACTUAL_HEADER: &str = "Your Output";
const EXPECTED_HEADER: &str = "Standard Output";

/// One summary line per test point, in order
pub fn summary_lines(result: &TaskResult) -> Vec<String> {
    result
        .verdicts
        .iter()
        .zip(1u32..)
        .map(|(verdict, number)| summary_line(number, verdict))
        .collect()
}

/// Summary line for a single test point
pub fn summary_line(number: u32, verdict: &Verdict) -> String {
    format!(
        "[TEST POINT {number}] {} [SCORE] {}",
        verdict.kind(),
        verdict.score()
    )
}

/// Extract `(test point, score)` pairs from summary output
///
/// Lines that are not summary lines are skipped.
pub fn parse_summary(text: &str) -> Vec<(u32, u32)> {
    text.lines().filter_map(parse_summary_line).collect()
}

fn parse_summary_line(line: &str) -> Option<(u32, u32)> {
    let rest = line.trim_start().strip_prefix("[TEST POINT ")?;
    let (number, rest) = rest.split_once(']')?;
    let (_, score) = rest.split_once("[SCORE]")?;

    let score = score.trim_start();
    let digits = score
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(score.len());

    Some((number.trim().parse().ok()?, score[..digits].parse().ok()?))
}

/// Human-readable explanation of one test point
pub fn render_detail(run: &TestPointRun) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut lines = Vec::new();

    if run.verdict.is_pass() {
        lines.push(format!("Test point {} passed", run.number));
    } else {
        lines.push(format!("Error: {}", run.verdict.kind()));
        if let Some(details) = details(&run.verdict) {
            lines.push(format!("Details: {details}"));
        }
    }

    let Some(transcript) = &run.transcript else {
        return lines.join("\n");
    };

    if !transcript.input.is_empty() {
        lines.push(String::new());
        lines.push("Standard Input".to_string());
        lines.push(rule.clone());
        lines.push(transcript.input.trim_end().to_string());
        lines.push(rule.clone());
    }

    match (&transcript.actual, &transcript.expected) {
        (Some(actual), _) if run.verdict.is_pass() => {
            lines.push(String::new());
            lines.push("Output".to_string());
            lines.push(rule.clone());
            lines.push(actual.clone());
            lines.push(rule);
        }
        (Some(actual), Some(expected)) => {
            lines.push(side_by_side(ACTUAL_HEADER, EXPECTED_HEADER));
            lines.push(rule.clone());

            let actual: Vec<&str> = actual.split('\n').collect();
            let expected: Vec<&str> = expected.split('\n').collect();
            for row in 0..actual.len().max(expected.len()) {
                lines.push(side_by_side(
                    actual.get(row).copied().unwrap_or_default(),
                    expected.get(row).copied().unwrap_or_default(),
                ));
            }
            lines.push(rule);
        }
        _ => {}
    }

    lines.join("\n")
}

fn side_by_side(left: &str, right: &str) -> String {
    format!("{left:<29} | {right:<30}")
}

fn details(verdict: &Verdict) -> Option<String> {
    match verdict {
        Verdict::Pass => None,
        Verdict::CompileError(failure) => Some(failure.to_string()),
        Verdict::Timeout => Some("time limit exceeded".to_string()),
        Verdict::RuntimeError(fault) => Some(fault.to_string()),
        Verdict::OutputMismatch(reason) => Some(reason.to_string()),
    }
}
