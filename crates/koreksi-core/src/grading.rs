//! Fuzzy answer grading.
//!
//! Student answers are compared to the verified key with a case-insensitive
//! Jaro-Winkler similarity. Both the metric and the pass threshold are fixed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{CorrectionResult, CorrectionStatus, ParsedAnswer, QuestionNumber, VerifiedKey};

/// Scores strictly above this are graded correct.
pub const PASS_THRESHOLD: f64 = 0.85;

/// Winkler prefix weight.
const PREFIX_SCALE: f64 = 0.1;

/// Longest common prefix the Winkler boost rewards.
const MAX_PREFIX: usize = 4;

/// Similarity between a key answer and a student answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub is_correct: bool,
    /// Similarity in `[0.0, 1.0]`.
    pub score: f64,
}

/// Grade a student answer against the key.
///
/// Only case is folded. Whitespace and punctuation differences count against
/// the score.
pub fn compare_answers(key_answer: &str, student_answer: &str) -> Grade {
    let score = jaro_winkler_ci(key_answer, student_answer);
    Grade {
        is_correct: is_passing(score),
        score,
    }
}

/// Index verified keys by question number. The first key seen for a number wins.
pub fn key_map(keys: Vec<VerifiedKey>) -> HashMap<QuestionNumber, String> {
    let mut map = HashMap::with_capacity(keys.len());
    for key in keys {
        map.entry(key.question_number).or_insert(key.corrected_text);
    }
    map
}

/// Grade one student answer against the key map.
pub fn grade_answer(
    answer: &ParsedAnswer,
    keys: &HashMap<QuestionNumber, String>,
) -> CorrectionResult {
    let Some(key_answer) = keys.get(&answer.question_number) else {
        tracing::debug!("no verified key for question {}", answer.question_number);
        return CorrectionResult::key_missing(answer);
    };

    let grade = compare_answers(key_answer, &answer.text);
    CorrectionResult {
        question_number: answer.question_number,
        student_answer: answer.text.clone(),
        is_correct: grade.is_correct,
        score: grade.score,
        status: if grade.is_correct {
            CorrectionStatus::Correct
        } else {
            CorrectionStatus::Incorrect
        },
    }
}

/// Whether a similarity score passes the fixed threshold.
pub fn is_passing(score: f64) -> bool {
    score > PASS_THRESHOLD
}

/// Case-insensitive Jaro-Winkler similarity.
pub fn jaro_winkler_ci(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    jaro_winkler(&a, &b)
}

/// Jaro-Winkler similarity over pre-folded characters.
pub fn jaro_winkler(a: &[char], b: &[char]) -> f64 {
    let jaro = jaro(a, b);
    let prefix = a
        .iter()
        .zip(b.iter())
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();

    (jaro + prefix as f64 * PREFIX_SCALE * (1.0 - jaro)).clamp(0.0, 1.0)
}

/// Jaro similarity.
///
/// Two empty inputs are identical (1.0); one empty input shares nothing (0.0).
pub fn jaro(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if !b_matched[j] && b[j] == *ca {
                a_matched[i] = true;
                b_matched[j] = true;
                matches += 1;
                break;
            }
        }
    }

    if matches == 0 {
        return 0.0;
    }

    // Count matched characters that appear in a different order.
    let mut half_transpositions = 0usize;
    let mut k = 0usize;
    for (i, ca) in a.iter().enumerate() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if *ca != b[k] {
            half_transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = half_transpositions as f64 / 2.0;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn case_insensitive_exact_match() {
        let grade = compare_answers("Paris", "paris");
        assert!(grade.is_correct);
        assert_eq!(grade.score, 1.0);
    }

    #[test]
    fn minor_edit_passes_below_one() {
        let grade = compare_answers("Paris", "Pariss");
        assert!(grade.score > PASS_THRESHOLD && grade.score < 1.0, "{}", grade.score);
        assert!(grade.is_correct);
    }

    #[test]
    fn different_word_fails() {
        let grade = compare_answers("Paris", "Berlin");
        assert!(grade.score < 0.7, "{}", grade.score);
        assert!(!grade.is_correct);
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!is_passing(0.85));
        assert!(is_passing(0.850_000_1));
        assert!(!is_passing(0.0));
        assert!(is_passing(1.0));
    }

    #[test]
    fn whitespace_and_punctuation_are_not_normalized() {
        assert!(compare_answers("New York", "NewYork").score < 1.0);
        assert!(compare_answers("Jakarta", "Jakarta.").score < 1.0);
        assert!(compare_answers("a b", "a  b").score < 1.0);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(compare_answers("", "").score, 1.0);
        assert_eq!(compare_answers("Paris", "").score, 0.0);
        assert!(!compare_answers("", "Paris").is_correct);
    }

    #[test]
    fn known_jaro_values() {
        // Classic reference pairs.
        let j = jaro(&chars("martha"), &chars("marhta"));
        assert!((j - 0.944_444).abs() < 1e-5, "{j}");

        let jw = jaro_winkler(&chars("martha"), &chars("marhta"));
        assert!((jw - 0.961_111).abs() < 1e-5, "{jw}");

        let jw = jaro_winkler(&chars("dixon"), &chars("dicksonx"));
        assert!((jw - 0.813_333).abs() < 1e-5, "{jw}");
    }

    #[test]
    fn odd_transposition_count_is_halved_exactly() {
        // Three out-of-order matches count as 1.5 transpositions, not 1.
        let j = jaro(&chars("abcdefgh"), &chars("bcadefgh"));
        assert!((j - 0.9375).abs() < 1e-9, "{j}");

        let grade = compare_answers("abcdefgh", "BCADEFGH");
        assert!((grade.score - 0.9375).abs() < 1e-9, "{}", grade.score);
        assert!(grade.is_correct);
    }

    #[test]
    fn no_common_characters() {
        assert_eq!(jaro(&chars("abc"), &chars("xyz")), 0.0);
        assert_eq!(compare_answers("abc", "xyz").score, 0.0);
    }

    #[test]
    fn scores_stay_in_unit_range() {
        let pairs = [
            ("photosynthesis", "fotosintesis"),
            ("Soekarno", "Sukarno"),
            ("H2O", "h20"),
            ("x", "a much longer answer"),
        ];
        for (a, b) in pairs {
            let score = jaro_winkler_ci(a, b);
            assert!((0.0..=1.0).contains(&score), "{a} / {b}: {score}");
        }
    }

    #[test]
    fn key_map_first_write_wins() {
        let keys = key_map(vec![
            VerifiedKey {
                question_number: 1,
                corrected_text: "first".into(),
            },
            VerifiedKey {
                question_number: 1,
                corrected_text: "second".into(),
            },
            VerifiedKey {
                question_number: 2,
                corrected_text: "two".into(),
            },
        ]);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[&1], "first");
    }

    #[test]
    fn grade_answer_statuses() {
        let keys = key_map(vec![VerifiedKey {
            question_number: 1,
            corrected_text: "Paris".into(),
        }]);

        let correct = grade_answer(&ParsedAnswer::new(1, "paris"), &keys);
        assert_eq!(correct.status, CorrectionStatus::Correct);
        assert_eq!(correct.score, 1.0);

        let wrong = grade_answer(&ParsedAnswer::new(1, "Berlin"), &keys);
        assert_eq!(wrong.status, CorrectionStatus::Incorrect);
        assert!(!wrong.is_correct);

        let missing = grade_answer(&ParsedAnswer::new(9, "Paris"), &keys);
        assert_eq!(missing.status, CorrectionStatus::KeyMissing);
        assert_eq!(missing.score, 0.0);
        assert_eq!(missing.student_answer, "Paris");
    }

    #[test]
    fn unicode_case_folding() {
        assert_eq!(compare_answers("ÉCOLE", "école").score, 1.0);
    }
}
