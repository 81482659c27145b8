//! Backtracking re-segmentation of a mask into dictionary-attested runs.
//!
//! [`Partitions`] walks the search tree depth-first with an explicit stack and
//! yields complete partitions one at a time, shortest segment first. At each
//! position it tries every end point in increasing order and accepts a run when
//! it is longer than the minimum and fully matches at least one transcription.
//!
//! Unknown words never join a run. Each wildcard token forms its own
//! [`Segment::Passthrough`], which is reproduced verbatim in candidates.

use std::collections::HashMap;
use std::ops::Range;
use std::time::Instant;

use serde::Serialize;

use crate::dictionary::Dictionary;
use crate::mask::{Mask, SegmentPattern, SkeletonToken};

/// Runs must span strictly more tokens than this by default.
pub const DEFAULT_MIN_SEGMENT_TOKENS: usize = 4;

/// A contiguous region of a mask.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Tokens `start..end` matching at least one dictionary transcription.
    Run {
        /// First token index.
        start: usize,
        /// One past the last token index.
        end: usize,
        /// The compiled pattern of the run.
        pattern: SegmentPattern,
    },
    /// A single wildcard token for a word the dictionary does not know.
    Passthrough {
        /// Token index.
        index: usize,
        /// The original word.
        word: String,
    },
}

impl Segment {
    /// Token indices covered by this segment.
    pub const fn token_range(&self) -> Range<usize> {
        match self {
            Self::Run { start, end, .. } => *start..*end,
            Self::Passthrough { index, .. } => *index..*index + 1,
        }
    }

    /// Number of tokens covered.
    pub const fn len(&self) -> usize {
        let range = self.token_range();
        range.end - range.start
    }

    /// Always false; segments cover at least one token.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Segments covering a mask in order, without gaps or overlaps.
pub type Partition = Vec<Segment>;

/// Why a search stopped before exhausting the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// The segment evaluation budget ran out.
    NodeBudget,
    /// The wall-clock deadline passed.
    Deadline,
    /// Enough candidates were accepted.
    CandidateCap,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NodeBudget => "search node budget exhausted",
            Self::Deadline => "time budget exhausted",
            Self::CandidateCap => "candidate limit reached",
        })
    }
}

/// Host-imposed bounds on a partition search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Maximum number of run evaluations against the dictionary.
    pub max_nodes: Option<u64>,
    /// Stop once this instant has passed.
    pub deadline: Option<Instant>,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    start: usize,
    next_end: usize,
    /// For a wildcard position: its passthrough has already been tried.
    expanded: bool,
}

impl Frame {
    const fn at(start: usize) -> Self {
        Self {
            start,
            next_end: start + 1,
            expanded: false,
        }
    }
}

/// Lazy iterator over every partition of a mask.
///
/// Dropping it at any point is safe; it holds no shared mutable state.
#[derive(Debug)]
pub struct Partitions<'d> {
    dictionary: &'d Dictionary,
    tokens: Vec<SkeletonToken>,
    min_tokens: usize,
    limits: SearchLimits,
    stack: Vec<Frame>,
    path: Vec<Segment>,
    memo: HashMap<(usize, usize), Option<SegmentPattern>>,
    nodes: u64,
    stop: Option<StopReason>,
}

impl<'d> Partitions<'d> {
    /// Search `mask` with the given minimum run length and no limits.
    pub fn new(dictionary: &'d Dictionary, mask: &Mask, min_tokens: usize) -> Self {
        Self {
            dictionary,
            tokens: mask.tokens().to_vec(),
            min_tokens,
            limits: SearchLimits::default(),
            stack: vec![Frame::at(0)],
            path: Vec::new(),
            memo: HashMap::new(),
            nodes: 0,
            stop: None,
        }
    }

    /// Apply search limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Run evaluations performed so far (memoized repeats not counted).
    pub const fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Set once the search was cut short by a limit.
    pub const fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    fn halt(&mut self, reason: StopReason) {
        tracing::debug!(%reason, nodes = self.nodes, "partition search halted");
        self.stop = Some(reason);
        self.stack.clear();
        self.path.clear();
    }

    /// Smallest acceptable end in `from..=len` for a run starting at `start`.
    fn next_run(&mut self, start: usize, from: usize) -> Option<(usize, SegmentPattern)> {
        for end in from..=self.tokens.len() {
            // A run may not cover a wildcard, and neither may any longer one.
            if self.tokens[end - 1].is_wildcard() {
                return None;
            }
            if end - start <= self.min_tokens {
                continue;
            }
            if let Some(pattern) = self.evaluate(start, end) {
                return Some((end, pattern));
            }
            if self.stop.is_some() {
                return None;
            }
        }
        None
    }

    fn evaluate(&mut self, start: usize, end: usize) -> Option<SegmentPattern> {
        if let Some(known) = self.memo.get(&(start, end)) {
            return known.clone();
        }
        if self.limits.max_nodes.is_some_and(|max| self.nodes >= max) {
            self.stop = Some(StopReason::NodeBudget);
            return None;
        }
        if self.limits.deadline.is_some_and(|d| Instant::now() >= d) {
            self.stop = Some(StopReason::Deadline);
            return None;
        }
        self.nodes += 1;

        let accepted = match SegmentPattern::compile(
            &self.tokens[start..end],
            self.dictionary.consonant_placeholder(),
        ) {
            Ok(pattern) => self.dictionary.has_match(&pattern).then_some(pattern),
            Err(err) => {
                tracing::warn!(start, end, error = %err, "segment pattern failed to compile");
                None
            }
        };
        self.memo.insert((start, end), accepted.clone());
        accepted
    }
}

impl Iterator for Partitions<'_> {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        loop {
            let &Frame {
                start,
                next_end,
                expanded,
            } = self.stack.last()?;
            let top = self.stack.len() - 1;

            if start == self.tokens.len() {
                let partition = self.path.clone();
                self.stack.pop();
                self.path.pop();
                return Some(partition);
            }

            if let SkeletonToken::Wildcard(word) = &self.tokens[start] {
                if expanded {
                    self.stack.pop();
                    self.path.pop();
                } else {
                    let segment = Segment::Passthrough {
                        index: start,
                        word: word.clone(),
                    };
                    self.stack[top].expanded = true;
                    self.path.push(segment);
                    self.stack.push(Frame::at(start + 1));
                }
                continue;
            }

            match self.next_run(start, next_end) {
                Some((end, pattern)) => {
                    self.stack[top].next_end = end + 1;
                    self.path.push(Segment::Run {
                        start,
                        end,
                        pattern,
                    });
                    self.stack.push(Frame::at(end));
                }
                None => {
                    if let Some(reason) = self.stop {
                        self.halt(reason);
                        return None;
                    }
                    self.stack.pop();
                    self.path.pop();
                }
            }
        }
    }
}

/// All partitions of `mask` with the default minimum run length.
pub fn partitions<'d>(dictionary: &'d Dictionary, mask: &Mask) -> Partitions<'d> {
    Partitions::new(dictionary, mask, DEFAULT_MIN_SEGMENT_TOKENS)
}
