//! Turning partitions into concrete candidate phrases.

use crate::combine::{CartesianProduct, Choice};
use crate::dictionary::Dictionary;
use crate::mask::{build_mask, pronunciation_variants};
use crate::partition::{DEFAULT_MIN_SEGMENT_TOKENS, Partition, Partitions, Segment};

/// Words that can stand in for `segment`.
///
/// A run resolves to every dictionary word whose transcription fully matches
/// its pattern (possibly none, if the dictionary changed since the run was
/// validated). A passthrough resolves to the original word.
pub fn words_for_segment(segment: &Segment, dictionary: &Dictionary) -> Vec<String> {
    match segment {
        Segment::Run { pattern, .. } => dictionary
            .lookup_by_pattern(pattern)
            .into_iter()
            .map(str::to_string)
            .collect(),
        Segment::Passthrough { word, .. } => vec![word.clone()],
    }
}

/// Lazy stream of the candidate phrases of one partition.
#[derive(Debug, Clone)]
pub struct Candidates {
    product: CartesianProduct<String>,
}

impl Iterator for Candidates {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.product.next().map(|words| words.join(" "))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.product.size_hint()
    }
}

/// Candidates of `partition`, in positional product order.
pub fn candidates(partition: &Partition, dictionary: &Dictionary) -> Candidates {
    let choices: Vec<Choice<String>> = partition
        .iter()
        .map(|segment| Choice::Flat(words_for_segment(segment, dictionary)))
        .collect();
    Candidates {
        product: CartesianProduct::from_choices(&choices),
    }
}

/// Every candidate of `partition`, materialized.
pub fn assemble(partition: &Partition, dictionary: &Dictionary) -> Vec<String> {
    candidates(partition, dictionary).collect()
}

/// Candidates for `phrase` across every partition of its first mask.
///
/// Unbounded: the output is the sum over partitions of the product of
/// per-segment word counts. Hosts that need limits should use
/// [`crate::search::HomophoneSearch`]. A blank phrase yields nothing.
pub fn generate_candidates(phrase: &str, dictionary: &Dictionary) -> Vec<String> {
    generate_candidates_with(phrase, dictionary, DEFAULT_MIN_SEGMENT_TOKENS)
}

/// [`generate_candidates`] with an explicit minimum run length.
#[tracing::instrument(skip(dictionary))]
pub fn generate_candidates_with(
    phrase: &str,
    dictionary: &Dictionary,
    min_tokens: usize,
) -> Vec<String> {
    if phrase.split_whitespace().next().is_none() {
        return Vec::new();
    }
    let Some(variant) = pronunciation_variants(phrase, dictionary).next() else {
        return Vec::new();
    };
    let mask = build_mask(&variant, dictionary.inventory());
    let mut out = Vec::new();
    for partition in Partitions::new(dictionary, &mask, min_tokens) {
        out.extend(candidates(&partition, dictionary));
    }
    tracing::debug!(candidates = out.len(), "candidates generated");
    out
}
