//! Output comparison
//!
//! CRLF line endings are normalised to LF and surrounding whitespace is
//! trimmed before the outputs are compared byte for byte. When they differ
//! the mismatch is explained line by line.

use crate::types::{ComparisonResult, MismatchReason};

/// Compare a program's output with the expected output
pub fn compare(actual: &str, expected: &str) -> ComparisonResult {
    let actual = actual.replace("\r\n", "\n");
    let expected = expected.replace("\r\n", "\n");
    let actual = actual.trim();
    let expected = expected.trim();

    if actual == expected {
        return ComparisonResult::Match;
    }

    let actual_lines: Vec<&str> = actual.split('\n').collect();
    let expected_lines: Vec<&str> = expected.split('\n').collect();

    if actual_lines.len() != expected_lines.len() {
        return ComparisonResult::Mismatch(MismatchReason::LineCountDiffers {
            actual: actual_lines.len(),
            expected: expected_lines.len(),
        });
    }

    let lines = actual_lines
        .iter()
        .zip(&expected_lines)
        .zip(1..)
        .filter(|((a, e), _)| a.trim_end() != e.trim_end())
        .map(|(_, number)| number)
        .collect();

    ComparisonResult::Mismatch(MismatchReason::ContentDiffers { lines })
}

/// Compare raw output bytes, decoding invalid UTF-8 lossily
pub fn compare_bytes(actual: &[u8], expected: &[u8]) -> ComparisonResult {
    compare(
        &String::from_utf8_lossy(actual),
        &String::from_utf8_lossy(expected),
    )
}
