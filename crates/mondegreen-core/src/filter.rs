//! Candidate filtering by stress pattern and grammatical well-formedness.
//!
//! Both checks are injected: the core never owns an accent model or a grammar
//! engine. [`MarkedStress`] and [`RuleChecker`] are the built-in
//! implementations used when nothing better is plugged in.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Russian vowel letters.
const VOWEL_LETTERS: &str = "аеёиоуыэюя";

/// Stress mark placed before a stressed vowel by accent models.
const STRESS_MARK: char = '+';

/// Predicts the stress pattern of a phrase.
///
/// The result is a string over `V` (a vowel letter) and `+` (a stress mark
/// before the following vowel). Only equality between two patterns matters.
pub trait StressPredictor {
    /// Stress pattern of `text`.
    fn stress_pattern(&self, text: &str) -> String;
}

/// Decides whether a candidate reads as well-formed text.
pub trait GrammarChecker {
    /// True if `text` is acceptable.
    fn is_well_formed(&self, text: &str) -> bool;
}

impl<F> StressPredictor for F
where
    F: Fn(&str) -> String,
{
    fn stress_pattern(&self, text: &str) -> String {
        self(text)
    }
}

impl<F> GrammarChecker for F
where
    F: Fn(&str) -> bool,
{
    fn is_well_formed(&self, text: &str) -> bool {
        self(text)
    }
}

/// Reads stress from the text itself.
///
/// Every vowel letter becomes `V`; explicit `+` marks are kept. Unmarked text
/// therefore compares by vowel count alone, which rejects little. Inject an
/// accent model through [`StressPredictor`] when real stress matching matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkedStress;

impl StressPredictor for MarkedStress {
    fn stress_pattern(&self, text: &str) -> String {
        text.chars()
            .flat_map(char::to_lowercase)
            .filter_map(|c| {
                if VOWEL_LETTERS.contains(c) {
                    Some('V')
                } else if c == STRESS_MARK {
                    Some(STRESS_MARK)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Grammar checker that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl GrammarChecker for AcceptAll {
    fn is_well_formed(&self, _text: &str) -> bool {
        true
    }
}

/// A detected problem in a candidate phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    /// The kind of problem.
    pub issue_type: GrammarIssueType,
    /// Human-readable description.
    pub message: String,
    /// 1-indexed word position where it was found.
    pub word_num: usize,
    /// How bad it is.
    pub severity: Severity,
}

/// Kinds of problems [`RuleChecker`] detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrammarIssueType {
    /// The same word twice in a row.
    RepeatedWord,
    /// A preposition directly followed by another preposition.
    StackedPrepositions,
    /// A preposition at the end of the phrase.
    DanglingPreposition,
    /// A lone consonant letter that is not a word.
    StrayLetter,
}

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Severity {
    /// Odd but possible.
    Low,
    /// Likely ungrammatical.
    Medium,
    /// Clearly ungrammatical.
    High,
}

/// Prepositions that must be followed by a noun phrase.
const PREPOSITIONS: &[&str] = &[
    "без", "в", "во", "для", "до", "за", "из", "к", "ко", "на", "над", "о", "об", "обо", "от",
    "по", "под", "при", "про", "с", "со", "у", "через",
];

/// A single consonant letter. `в`, `к`, `с` are prepositions and handled there.
static STRAY_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[бгджзйлмнпртфхцчшщъь]$").expect("valid regex"));

/// Lightweight rules for rejecting obviously broken Russian candidates.
#[derive(Debug, Clone, Copy)]
pub struct RuleChecker {
    /// Issues at or above this severity make a phrase ill-formed.
    pub reject_at: Severity,
}

impl Default for RuleChecker {
    fn default() -> Self {
        Self {
            reject_at: Severity::Medium,
        }
    }
}

impl RuleChecker {
    /// All issues found in `text`.
    pub fn check(&self, text: &str) -> Vec<GrammarIssue> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        let mut issues = Vec::new();
        for (idx, word) in words.iter().enumerate() {
            let word_num = idx + 1;
            let next = words.get(idx + 1);

            if next == Some(word) {
                issues.push(GrammarIssue {
                    issue_type: GrammarIssueType::RepeatedWord,
                    message: format!("\"{word}\" repeated"),
                    word_num,
                    severity: Severity::Medium,
                });
            }

            if is_preposition(word) {
                match next {
                    Some(following) if is_preposition(following) => {
                        issues.push(GrammarIssue {
                            issue_type: GrammarIssueType::StackedPrepositions,
                            message: format!("preposition \"{word}\" followed by \"{following}\""),
                            word_num,
                            severity: Severity::High,
                        });
                    }
                    None => {
                        issues.push(GrammarIssue {
                            issue_type: GrammarIssueType::DanglingPreposition,
                            message: format!("phrase ends with preposition \"{word}\""),
                            word_num,
                            severity: Severity::High,
                        });
                    }
                    Some(_) => {}
                }
            }

            if STRAY_LETTER.is_match(word) {
                issues.push(GrammarIssue {
                    issue_type: GrammarIssueType::StrayLetter,
                    message: format!("stray letter \"{word}\""),
                    word_num,
                    severity: Severity::High,
                });
            }
        }
        issues
    }
}

impl GrammarChecker for RuleChecker {
    fn is_well_formed(&self, text: &str) -> bool {
        self.check(text)
            .iter()
            .all(|issue| issue.severity < self.reject_at)
    }
}

fn is_preposition(word: &str) -> bool {
    PREPOSITIONS.contains(&word)
}

/// Accepts candidates that are well-formed and stressed like a reference phrase.
pub struct CandidateFilter<'a> {
    reference: String,
    stress: &'a dyn StressPredictor,
    grammar: &'a dyn GrammarChecker,
}

impl std::fmt::Debug for CandidateFilter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateFilter")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl<'a> CandidateFilter<'a> {
    /// Filter against the stress pattern of `phrase`.
    pub fn new(
        phrase: &str,
        stress: &'a dyn StressPredictor,
        grammar: &'a dyn GrammarChecker,
    ) -> Self {
        Self {
            reference: stress.stress_pattern(phrase),
            stress,
            grammar,
        }
    }

    /// The stress pattern candidates must reproduce.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// True if `candidate` passes both checks.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.grammar.is_well_formed(candidate)
            && self.stress.stress_pattern(candidate) == self.reference
    }

    /// Keep the accepted candidates, in order.
    pub fn apply<I>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        candidates.into_iter().filter(|c| self.accepts(c)).collect()
    }
}
