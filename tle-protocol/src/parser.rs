//! A simplistic parser for the CelesTrak style element set text format
//!
//! A record is a label line followed by two fixed-width element lines:
//!
//! ```text
//! ISS (ZARYA)
//! 1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
//! 2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
//! ```

use crate::{LINE1_NUMBER, LINE2_NUMBER};
use nom::{
    branch::alt,
    character::complete::{char, line_ending, not_line_ending, one_of},
    combinator::{opt, verify},
    error::ErrorKind,
    multi::many_m_n,
    sequence::{preceded, terminated},
    Err::Error,
};
use tracing::debug;
use tle_types::prelude::*;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("No record labelled '{label}' in the element set payload")]
    NotFound { label: String },
    #[error("Record '{label}' is followed by {found} element line(s), expected 2")]
    Truncated { label: String, found: usize },
    #[error("Malformed element line {line}: {fault}")]
    Malformed { line: char, fault: LineFault },
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum LineFault {
    #[error("expected to start with '{expected} '")]
    LineNumber { expected: char },
    #[error("expected 69 characters, found {0}")]
    Length(usize),
    #[error("contains non-ASCII characters")]
    NonAscii,
    #[error("checksum mismatch, computed {expected}, found '{found}'")]
    Checksum { expected: u32, found: char },
    #[error("catalog number differs from line 1")]
    CatalogMismatch,
}

impl ParseError<&str> {
    pub fn into_owned(self) -> ParseError<String> {
        match self {
            ParseError::NotFound { label } => ParseError::NotFound { label },
            ParseError::Truncated { label, found } => ParseError::Truncated { label, found },
            ParseError::Malformed { line, fault } => ParseError::Malformed { line, fault },
            ParseError::Nom(i, kind) => ParseError::Nom(i.to_string(), kind),
        }
    }
}

/// Find the record labelled `label` in a multi-record payload.
///
/// An exact (trimmed) label line wins over a line that merely contains the label.
pub fn find_element_set(
    payload: &str,
    label: &str,
) -> std::result::Result<UnstructuredTle, ParseError<String>> {
    let at = seek_line(payload, |l| l.trim() == label)
        .or_else(|| seek_line(payload, |l| l.contains(label)))
        .ok_or_else(|| ParseError::NotFound {
            label: label.to_string(),
        })?;

    let found = element_line_count(at);
    if found < 2 {
        return Err(ParseError::Truncated {
            label: label.to_string(),
            found,
        });
    }

    let (_, tle) = record(at).map_err(|e| flatten(e, at).into_owned())?;
    debug!(
        label,
        offset = payload.len() - at.len(),
        "Found element set record"
    );
    Ok(tle)
}

/// One payload line without its line ending, fails at the end of the input
fn payload_line(s: &str) -> Result<&str, &str> {
    alt((
        terminated(not_line_ending, line_ending),
        verify(not_line_ending, |l: &str| !l.is_empty()),
    ))(s)
}

/// The remaining input starting at the first line accepted by `pred`
fn seek_line<F: Fn(&str) -> bool>(s: &str, pred: F) -> Option<&str> {
    let mut rest = s;
    while let Ok((next, line)) = payload_line(rest) {
        if pred(line) {
            return Some(rest);
        }
        rest = next;
    }
    None
}

/// Non-blank lines following the label line, up to two
fn element_line_count(s: &str) -> usize {
    let lines: Result<&str, Vec<&str>> = preceded(
        payload_line,
        many_m_n(0, 2, verify(payload_line, |l: &str| !l.trim().is_empty())),
    )(s);
    lines.map(|(_, lines)| lines.len()).unwrap_or(0)
}

/// Label line followed by both element lines of the same object
fn record(s: &str) -> Result<&str, UnstructuredTle> {
    let (s, name) = payload_line(s)?;
    let (s, line1) = terminated(|s| element_line(s, LINE1_NUMBER), opt(line_ending))(s)?;
    let (s, line2) = terminated(|s| element_line(s, LINE2_NUMBER), opt(line_ending))(s)?;
    if line1[2..7] != line2[2..7] {
        return Err(Error(ParseError::Malformed {
            line: LINE2_NUMBER,
            fault: LineFault::CatalogMismatch,
        }));
    }
    Ok((s, UnstructuredTle::new(name, line1, line2)))
}

/// One fixed-width element line: line number, width and checksum
fn element_line(s: &str, number: char) -> Result<&str, &str> {
    let (s, line) = not_line_ending(s)?;
    let line = line.trim_end();
    let malformed = |fault| Error(ParseError::Malformed { line: number, fault });

    let line_number: Result<&str, char> = terminated(one_of("12"), char(' '))(line);
    match line_number {
        Ok((_, n)) if n == number => (),
        _ => return Err(malformed(LineFault::LineNumber { expected: number })),
    }
    if !line.is_ascii() {
        return Err(malformed(LineFault::NonAscii));
    }
    if line.len() != TLE_LINE_LEN {
        return Err(malformed(LineFault::Length(line.len())));
    }

    let (body, check) = line.split_at(TLE_LINE_LEN - 1);
    let expected = checksum(body);
    let found = check.chars().next().unwrap_or(' ');
    if found.to_digit(10) != Some(expected) {
        return Err(malformed(LineFault::Checksum { expected, found }));
    }

    Ok((s, line))
}

/// Modulo-10 sum of the digits, with '-' counting as one
fn checksum(body: &str) -> u32 {
    body.chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

/// Complete parsers never ask for more input, report it against `input` if one does
fn flatten<I>(e: nom::Err<ParseError<I>>, input: I) -> ParseError<I> {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => e,
        nom::Err::Incomplete(_) => ParseError::Nom(input, ErrorKind::Complete),
    }
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}
