//! Field parsers and small shared helpers.
//!
//! Source data arrives as loosely-typed cells, so numeric lists, phase ranges
//! and integers are all recovered from text here. Every parser either returns
//! a value or a [`MalformedListError`]; callers turn failures into diagnostics.

use crate::error::MalformedListError;
use crate::types::Cell;
use std::collections::BTreeSet;

/// Widest `start-end` range [`parse_phase_spec`] will expand.
pub const MAX_RANGE_WIDTH: i64 = 10_000;

// ─── Numeric lists ──────────────────────────────────────────────────────────

/// Parses `"[1,2,3]"` or `"1,2,3"` into integers.
///
/// One surrounding bracket pair is optional. Tokens are trimmed before
/// parsing; any non-integer token fails the whole list. Blank input (or
/// `[]`) yields an empty list.
pub fn parse_numeric_list(raw: &str) -> Result<Vec<i64>, MalformedListError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();

    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<i64>()
                .map_err(|_| MalformedListError::InvalidToken {
                    token: token.to_string(),
                })
        })
        .collect()
}

// ─── Phase specs ────────────────────────────────────────────────────────────

/// Parses a phase specification: either an inclusive `"start-end"` range or a
/// numeric list.
///
/// Dispatch rule: a trimmed input that contains `-` and does not start with
/// `[` is a range; everything else goes through [`parse_numeric_list`]. So
/// `"[1,-2]"` is a list (and yields `-2`), while `"-2"` is a malformed range.
pub fn parse_phase_spec(raw: &str) -> Result<Vec<i64>, MalformedListError> {
    let trimmed = raw.trim();
    if trimmed.contains('-') && !trimmed.starts_with('[') {
        parse_phase_range(trimmed)
    } else {
        parse_numeric_list(trimmed)
    }
}

fn parse_phase_range(raw: &str) -> Result<Vec<i64>, MalformedListError> {
    let invalid = || MalformedListError::InvalidRange {
        raw: raw.to_string(),
    };

    let (start, end) = raw.split_once('-').ok_or_else(invalid)?;
    let start: i64 = start.trim().parse().map_err(|_| invalid())?;
    let end: i64 = end.trim().parse().map_err(|_| invalid())?;

    if start < 1 {
        return Err(MalformedListError::RangeStart {
            raw: raw.to_string(),
        });
    }
    if start > end {
        return Err(MalformedListError::ReversedRange {
            raw: raw.to_string(),
        });
    }
    if end - start >= MAX_RANGE_WIDTH {
        return Err(MalformedListError::RangeTooWide {
            raw: raw.to_string(),
            limit: MAX_RANGE_WIDTH,
        });
    }

    Ok((start..=end).collect())
}

/// Phase spec of a cell; `None` when the cell is absent or blank.
pub fn cell_phases(cell: &Cell) -> Option<Result<Vec<i64>, MalformedListError>> {
    cell.present().map(|text| parse_phase_spec(&text))
}

// ─── Scalars ────────────────────────────────────────────────────────────────

/// Reads a cell as an integer. Integral floats (`3.0`, `"3.0"`) are accepted.
pub fn cell_integer(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Absent => None,
        Cell::Number(n) => float_to_integer(*n),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_to_integer))
        }
    }
}

fn float_to_integer(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15).then_some(n as i64)
}

// ─── Tokens ─────────────────────────────────────────────────────────────────

/// Comma-separated tokens, trimmed, blanks dropped.
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Token set of a cell, optionally case-folded.
pub fn token_set(cell: &Cell, fold_case: bool) -> BTreeSet<String> {
    match cell.present() {
        Some(text) => split_tokens(&text)
            .map(|t| if fold_case { t.to_lowercase() } else { t.to_string() })
            .collect(),
        None => BTreeSet::new(),
    }
}

/// Renders phases as `[1,2,3]`.
pub fn format_phases<'a>(phases: impl IntoIterator<Item = &'a i64>) -> String {
    let joined: Vec<String> = phases.into_iter().map(i64::to_string).collect();
    format!("[{}]", joined.join(","))
}
