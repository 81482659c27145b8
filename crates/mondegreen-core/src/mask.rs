//! Vowel-skeleton masks.
//!
//! A mask keeps a phrase's vowels verbatim and replaces every consonant with a
//! flexible placeholder, so that two phrases "sound alike" when their masks
//! line up. Words missing from the dictionary become a [`SkeletonToken::Wildcard`].

use std::borrow::Cow;

use regex::Regex;
use serde::Serialize;

use crate::combine::{CartesianProduct, Choice};
use crate::dictionary::{Dictionary, Transcription};
use crate::phoneme::{PhonemeClass, PhonemeInventory};

/// Pattern text rendered for a word with unknown pronunciation.
pub const WILDCARD: &str = ".*";

/// One unit of a mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SkeletonToken {
    /// A vowel phoneme, matched literally.
    Vowel(String),
    /// An optional consonant.
    Consonant,
    /// A word absent from the dictionary; carries the original word.
    Wildcard(String),
}

impl SkeletonToken {
    /// Pattern text for this token.
    pub fn pattern<'a>(&'a self, placeholder: &'a str) -> Cow<'a, str> {
        match self {
            Self::Vowel(v) => Cow::Owned(regex::escape(v)),
            Self::Consonant => Cow::Borrowed(placeholder),
            Self::Wildcard(_) => Cow::Borrowed(WILDCARD),
        }
    }

    /// True for [`SkeletonToken::Wildcard`].
    pub const fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard(_))
    }

    /// True for [`SkeletonToken::Vowel`].
    pub const fn is_vowel(&self) -> bool {
        matches!(self, Self::Vowel(_))
    }
}

/// The skeleton of one pronunciation variant of a phrase.
///
/// Word boundaries are not kept: the mask is a flat token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mask {
    tokens: Vec<SkeletonToken>,
}

impl Mask {
    /// Wrap an existing token sequence.
    pub const fn from_tokens(tokens: Vec<SkeletonToken>) -> Self {
        Self { tokens }
    }

    /// The tokens in order.
    pub fn tokens(&self) -> &[SkeletonToken] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True for an empty mask.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of vowel tokens.
    pub fn vowel_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_vowel()).count()
    }

    /// Render the mask as a pattern string, each token followed by a space.
    ///
    /// Splitting the result on whitespace gives back one piece per token.
    pub fn to_pattern_string(&self, inventory: &PhonemeInventory) -> String {
        let placeholder = inventory.consonant_placeholder();
        let mut out = String::new();
        for token in &self.tokens {
            out.push_str(&token.pattern(&placeholder));
            out.push(' ');
        }
        out
    }
}

/// One word's pronunciation inside a variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordPronunciation<'d> {
    /// A dictionary transcription.
    Known(&'d Transcription),
    /// The word is not in the dictionary.
    Unknown(String),
}

/// Every pronunciation variant of `phrase`, produced lazily.
///
/// Each word contributes its dictionary transcriptions, or a single
/// [`WordPronunciation::Unknown`] when it has none.
pub fn pronunciation_variants<'d>(
    phrase: &str,
    dictionary: &'d Dictionary,
) -> CartesianProduct<WordPronunciation<'d>> {
    let choices: Vec<Choice<WordPronunciation<'d>>> = phrase
        .split_whitespace()
        .map(|word| {
            let found = dictionary.lookup(word);
            if found.is_empty() {
                Choice::Flat(vec![WordPronunciation::Unknown(word.to_string())])
            } else {
                Choice::Flat(found.into_iter().map(WordPronunciation::Known).collect())
            }
        })
        .collect();
    CartesianProduct::from_choices(&choices)
}

/// Build the mask of one pronunciation variant.
pub fn build_mask(variant: &[WordPronunciation<'_>], inventory: &PhonemeInventory) -> Mask {
    let mut tokens = Vec::new();
    for word in variant {
        match word {
            WordPronunciation::Known(transcription) => {
                tokens.extend(transcription.phonemes().iter().map(|phoneme| {
                    match inventory.classify_phoneme(phoneme) {
                        Some(PhonemeClass::Vowel) => SkeletonToken::Vowel(phoneme.clone()),
                        _ => SkeletonToken::Consonant,
                    }
                }));
            }
            WordPronunciation::Unknown(original) => {
                tokens.push(SkeletonToken::Wildcard(original.clone()));
            }
        }
    }
    Mask::from_tokens(tokens)
}

/// Masks for every pronunciation variant of `phrase`, in variant order.
#[tracing::instrument(skip(dictionary))]
pub fn build_masks(phrase: &str, dictionary: &Dictionary) -> Vec<Mask> {
    let masks: Vec<Mask> = pronunciation_variants(phrase, dictionary)
        .map(|variant| build_mask(&variant, dictionary.inventory()))
        .collect();
    tracing::debug!(variants = masks.len(), "masks built");
    masks
}

/// A compiled full-match pattern for a contiguous run of mask tokens.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
    text: String,
    regex: Regex,
    vowel_count: usize,
}

impl SegmentPattern {
    /// Compile `tokens` into an anchored pattern.
    ///
    /// Tokens are separated by optional whitespace, so a consonant placeholder
    /// may match nothing at all. A vowel must end at a phoneme boundary.
    pub fn compile(tokens: &[SkeletonToken], placeholder: &str) -> Result<Self, regex::Error> {
        let text = tokens
            .iter()
            .map(|t| t.pattern(placeholder))
            .collect::<Vec<_>>()
            .join(" ");
        let body = tokens
            .iter()
            .map(|t| match t {
                SkeletonToken::Vowel(_) => format!(r"{}(?:\s|$)", t.pattern(placeholder)),
                _ => t.pattern(placeholder).into_owned(),
            })
            .collect::<Vec<_>>()
            .join(r"\s?");
        let regex = Regex::new(&format!("^(?:{body})$"))?;
        Ok(Self {
            text,
            regex,
            vowel_count: tokens.iter().filter(|t| t.is_vowel()).count(),
        })
    }

    /// The token patterns joined by single spaces.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of vowel tokens in the run.
    pub const fn vowel_count(&self) -> usize {
        self.vowel_count
    }

    /// True if `transcription` (phonemes joined by spaces) matches in full.
    pub fn is_full_match(&self, transcription: &str) -> bool {
        self.regex.is_match(transcription)
    }
}

impl std::fmt::Display for SegmentPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryOptions;

    fn dictionary() -> Dictionary {
        Dictionary::from_tsv_str(
            "кот\tk o t\nкод\tk o d\nзамок\tz a m ə k\nзамок\tz ɐ m o k\n",
            &DictionaryOptions::default(),
        )
        .unwrap()
    }

    fn vowel(v: &str) -> SkeletonToken {
        SkeletonToken::Vowel(v.to_string())
    }

    #[test]
    fn known_word_keeps_vowels_and_hides_consonants() {
        let dict = dictionary();
        let masks = build_masks("кот", &dict);
        assert_eq!(masks.len(), 1);
        assert_eq!(
            masks[0].tokens(),
            &[SkeletonToken::Consonant, vowel("o"), SkeletonToken::Consonant]
        );
        assert_eq!(masks[0].vowel_count(), 1);
    }

    #[test]
    fn pattern_string_splits_back_into_tokens() {
        let dict = dictionary();
        let mask = &build_masks("кот", &dict)[0];
        let rendered = mask.to_pattern_string(dict.inventory());
        let placeholder = dict.consonant_placeholder();
        assert_eq!(rendered, format!("{placeholder} o {placeholder} "));
        assert_eq!(rendered.split_whitespace().count(), mask.len());
    }

    #[test]
    fn unknown_word_becomes_wildcard() {
        let dict = dictionary();
        let masks = build_masks("ыыы", &dict);
        assert_eq!(masks.len(), 1);
        assert_eq!(masks[0].tokens(), &[SkeletonToken::Wildcard("ыыы".to_string())]);
        assert_eq!(masks[0].to_pattern_string(dict.inventory()), ".* ");
    }

    #[test]
    fn homographs_produce_one_mask_per_variant() {
        let dict = dictionary();
        let masks = build_masks("кот замок", &dict);
        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0].vowel_count(), 3);
        assert_eq!(masks[0].tokens()[4], vowel("a"));
        assert_eq!(masks[1].tokens()[4], vowel("ɐ"));
    }

    #[test]
    fn masks_are_deterministic() {
        let dict = dictionary();
        assert_eq!(
            build_masks("Кот замок ыыы", &dict),
            build_masks("Кот замок ыыы", &dict)
        );
    }

    #[test]
    fn empty_phrase_has_one_empty_mask() {
        let dict = dictionary();
        let masks = build_masks("   ", &dict);
        assert_eq!(masks, vec![Mask::default()]);
    }

    #[test]
    fn segment_pattern_allows_missing_consonants() {
        let dict = dictionary();
        let tokens = [SkeletonToken::Consonant, vowel("o"), SkeletonToken::Consonant];
        let pattern = SegmentPattern::compile(&tokens, dict.consonant_placeholder()).unwrap();
        assert!(pattern.is_full_match("k o t"));
        assert!(pattern.is_full_match("o t"));
        assert!(pattern.is_full_match("k o"));
        assert!(pattern.is_full_match("o"));
        assert!(!pattern.is_full_match("k t o t"));
        assert!(!pattern.is_full_match("k a t"));
        assert_eq!(pattern.vowel_count(), 1);
    }

    #[test]
    fn segment_text_joins_token_patterns() {
        let dict = dictionary();
        let tokens = [vowel("o"), SkeletonToken::Consonant];
        let pattern = SegmentPattern::compile(&tokens, dict.consonant_placeholder()).unwrap();
        assert_eq!(
            pattern.as_str(),
            format!("o {}", dict.consonant_placeholder())
        );
    }
}
