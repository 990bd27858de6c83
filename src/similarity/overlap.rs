//! Word-overlap scoring between a candidate text and stored records.

use std::collections::HashSet;

use crate::record::{Record, TextField};

/// Overlap ratio at or above which a record counts as a duplicate.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// A stored record that scored at or above the threshold.
#[derive(Clone, Copy, Debug)]
pub struct SimilarMatch<'a> {
    /// The matching record, untouched.
    pub record: &'a Record,

    /// Its overlap ratio with the candidate, in `[0.0, 1.0]`.
    pub ratio: f64,
}

/// Splits text into lower-cased words on whitespace runs.
///
/// Leading or trailing whitespace produces one empty word at that end, and
/// empty input produces a single empty word. Those empty words take part in
/// scoring like any other.
///
/// ```
/// use reportdb::similarity::tokenize;
///
/// assert_eq!(tokenize("Crash  on\tSave"), vec!["crash", "on", "save"]);
/// assert_eq!(tokenize(""), vec![""]);
/// assert_eq!(tokenize(" save"), vec!["", "save"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_gap = false;

    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_gap {
                words.push(std::mem::take(&mut current));
                in_gap = true;
            }
        } else {
            in_gap = false;
            current.push(ch);
        }
    }
    words.push(current);

    words
}

/// Scores how much of `candidate` appears in `entry`.
///
/// Every candidate word (repeats included) present anywhere in `entry`
/// counts once; the count is divided by the longer of the two word lists.
pub fn overlap_ratio(candidate: &[String], entry: &[String]) -> f64 {
    let longest = candidate.len().max(entry.len());
    if longest == 0 {
        return 0.0;
    }

    let entry_words: HashSet<&str> = entry.iter().map(String::as_str).collect();
    let common = candidate
        .iter()
        .filter(|word| entry_words.contains(word.as_str()))
        .count();

    common as f64 / longest as f64
}

/// Returns every record whose `field` scores at least `threshold` against
/// `candidate_text`, paired with its ratio, in the order of `existing`.
pub fn score_similar<'a>(
    existing: &'a [Record],
    candidate_text: &str,
    field: TextField,
    threshold: f64,
) -> Vec<SimilarMatch<'a>> {
    let candidate = tokenize(candidate_text);

    existing
        .iter()
        .filter_map(|record| {
            let ratio = overlap_ratio(&candidate, &tokenize(record.text(field)));
            (ratio >= threshold).then_some(SimilarMatch { record, ratio })
        })
        .collect()
}

/// Returns every record whose `field` scores at least `threshold` against
/// `candidate_text`, in the order of `existing`.
pub fn find_similar<'a>(
    existing: &'a [Record],
    candidate_text: &str,
    field: TextField,
    threshold: f64,
) -> Vec<&'a Record> {
    score_similar(existing, candidate_text, field, threshold)
        .into_iter()
        .map(|m| m.record)
        .collect()
}
