//! OCR transcript parser.
//!
//! Turns free-form OCR text into numbered answers and collapses repeated
//! question numbers.

use std::collections::HashSet;

use crate::model::{ParsedAnswer, QuestionNumber};

/// Parse a raw OCR transcript into numbered answers, in line order.
///
/// Each non-empty line is trimmed and scanned as
/// `DIGITS [spaces] ["."] [spaces] REST`. Lines without leading digits, or
/// whose number does not fit in a [`QuestionNumber`], are skipped. `REST` is
/// trimmed but otherwise kept verbatim; a bare number yields an empty answer.
pub fn parse_lines(raw_text: &str) -> Vec<ParsedAnswer> {
    raw_text
        .lines()
        .filter_map(|line| {
            let parsed = parse_line(line);
            if parsed.is_none() && !line.trim().is_empty() {
                tracing::debug!("skipping unnumbered line: {:?}", line.trim());
            }
            parsed
        })
        .collect()
}

/// Parse a single line. Returns `None` for lines that carry no answer.
pub fn parse_line(line: &str) -> Option<ParsedAnswer> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    if digits_end == 0 {
        return None;
    }

    // Overflowing numbers are noise, not answers.
    let question_number: QuestionNumber = line[..digits_end].parse().ok()?;

    let rest = line[digits_end..].trim_start();
    let rest = rest.strip_prefix('.').unwrap_or(rest);

    Some(ParsedAnswer {
        question_number,
        text: rest.trim().to_string(),
    })
}

/// Answers left after dropping repeated question numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduplicated {
    /// First occurrence of every question number, in input order.
    pub answers: Vec<ParsedAnswer>,
    /// Later occurrences that were dropped, in input order.
    pub discarded: Vec<ParsedAnswer>,
}

impl Deduplicated {
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Keep only the first answer for each question number.
pub fn dedup(answers: Vec<ParsedAnswer>) -> Deduplicated {
    let mut seen: HashSet<QuestionNumber> = HashSet::new();
    let mut result = Deduplicated::default();

    for answer in answers {
        if seen.insert(answer.question_number) {
            result.answers.push(answer);
        } else {
            tracing::warn!(
                "ignoring duplicate question number {} in one transcript",
                answer.question_number
            );
            result.discarded.push(answer);
        }
    }

    result
}

/// Parse and deduplicate in one step.
pub fn parse_unique(raw_text: &str) -> Deduplicated {
    dedup(parse_lines(raw_text))
}

/// Render answers back into the numbered-line form the parser accepts.
pub fn render_lines(answers: &[ParsedAnswer]) -> String {
    answers
        .iter()
        .map(|a| format!("{}. {}", a.question_number, a.text))
        .collect::<Vec<_>>()
        .join("\n")
}
