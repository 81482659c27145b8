//! End-to-end homophone search with injected filters and host limits.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::assemble::candidates;
use crate::config::Config;
use crate::dictionary::Dictionary;
use crate::filter::{CandidateFilter, GrammarChecker, StressPredictor};
use crate::mask::{build_mask, pronunciation_variants};
use crate::partition::{DEFAULT_MIN_SEGMENT_TOKENS, Partitions, SearchLimits, StopReason};

/// Tuning and limits for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Dictionary runs must be longer than this many mask tokens.
    pub min_segment_tokens: usize,
    /// Stop after this many accepted phrases.
    pub max_candidates: Option<usize>,
    /// Stop after this many segment evaluations, summed over variants.
    pub max_search_nodes: Option<u64>,
    /// Wall-clock budget for the whole search.
    pub time_budget_ms: Option<u64>,
    /// Search every pronunciation variant instead of the first one.
    pub all_variants: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_segment_tokens: DEFAULT_MIN_SEGMENT_TOKENS,
            max_candidates: None,
            max_search_nodes: None,
            time_budget_ms: None,
            all_variants: false,
        }
    }
}

impl From<&Config> for SearchOptions {
    fn from(config: &Config) -> Self {
        Self {
            min_segment_tokens: config.min_segment_tokens,
            max_candidates: config.max_candidates,
            max_search_nodes: config.max_search_nodes,
            time_budget_ms: config.time_budget_ms,
            all_variants: config.all_variants,
        }
    }
}

/// Outcome of a search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// The input phrase.
    pub phrase: String,
    /// Stress pattern every accepted phrase reproduces.
    pub reference_stress: String,
    /// Accepted phrases, first occurrence order, without duplicates.
    pub accepted: Vec<String>,
    /// Partitions enumerated.
    pub partitions: usize,
    /// Candidate phrases passed to the filter.
    pub examined: usize,
    /// Pronunciation variants searched.
    pub variants: usize,
    /// Segment evaluations against the dictionary.
    pub nodes: u64,
    /// Set when a limit cut the search short.
    pub stopped: Option<StopReason>,
}

impl SearchReport {
    /// True if the search ran to the end.
    pub const fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

/// A dictionary paired with a stress predictor and a grammar checker.
#[derive(Debug)]
pub struct HomophoneSearch<'d, S, G> {
    dictionary: &'d Dictionary,
    stress: S,
    grammar: G,
    options: SearchOptions,
}

impl<'d, S, G> HomophoneSearch<'d, S, G>
where
    S: StressPredictor,
    G: GrammarChecker,
{
    /// Search `dictionary` with default options.
    pub fn new(dictionary: &'d Dictionary, stress: S, grammar: G) -> Self {
        Self {
            dictionary,
            stress,
            grammar,
            options: SearchOptions::default(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in effect.
    pub const fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Run the search and collect the report.
    pub fn search(&self, phrase: &str) -> SearchReport {
        self.search_with(phrase, |_, _| {})
    }

    /// Run the search, calling `observe(candidate, accepted)` for every
    /// candidate examined.
    #[tracing::instrument(skip(self, observe))]
    pub fn search_with<F>(&self, phrase: &str, mut observe: F) -> SearchReport
    where
        F: FnMut(&str, bool),
    {
        let deadline = self
            .options
            .time_budget_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let filter = CandidateFilter::new(phrase, &self.stress, &self.grammar);
        let mut report = SearchReport {
            phrase: phrase.to_string(),
            reference_stress: filter.reference().to_string(),
            ..SearchReport::default()
        };

        if phrase.split_whitespace().next().is_none() {
            return report;
        }
        if self.options.max_candidates == Some(0) {
            report.stopped = Some(StopReason::CandidateCap);
            return report;
        }

        let variant_limit = if self.options.all_variants { usize::MAX } else { 1 };
        let mut seen = HashSet::new();

        for variant in pronunciation_variants(phrase, self.dictionary).take(variant_limit) {
            report.variants += 1;
            let mask = build_mask(&variant, self.dictionary.inventory());
            let limits = SearchLimits {
                max_nodes: self
                    .options
                    .max_search_nodes
                    .map(|max| max.saturating_sub(report.nodes)),
                deadline,
            };
            let mut partitions =
                Partitions::new(self.dictionary, &mask, self.options.min_segment_tokens)
                    .with_limits(limits);
            let mut halted = None;

            'partitions: for partition in partitions.by_ref() {
                report.partitions += 1;
                for candidate in candidates(&partition, self.dictionary) {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        halted = Some(StopReason::Deadline);
                        break 'partitions;
                    }
                    report.examined += 1;
                    let accepted = filter.accepts(&candidate);
                    observe(&candidate, accepted);
                    if accepted && seen.insert(candidate.clone()) {
                        report.accepted.push(candidate);
                        if self
                            .options
                            .max_candidates
                            .is_some_and(|cap| report.accepted.len() >= cap)
                        {
                            halted = Some(StopReason::CandidateCap);
                            break 'partitions;
                        }
                    }
                }
            }

            report.nodes += partitions.nodes();
            if let Some(reason) = halted.or_else(|| partitions.stop_reason()) {
                report.stopped = Some(reason);
                break;
            }
        }

        tracing::info!(
            accepted = report.accepted.len(),
            examined = report.examined,
            partitions = report.partitions,
            nodes = report.nodes,
            stopped = ?report.stopped,
            "search finished"
        );
        report
    }
}
