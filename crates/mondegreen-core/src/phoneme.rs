//! Vowel/consonant classification of a dictionary's phoneme alphabet.
//!
//! Vowels come from a curated list for Russian (the phone set used by MFA
//! Russian dictionaries). Everything else in the alphabet is a consonant.
//! Consonants are never matched literally: masks replace each one with a
//! placeholder built from [`PhonemeInventory::consonant_placeholder`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::InventoryError;

/// Vowel phonemes of the Russian phone set.
///
/// Unused entries are harmless; classification intersects this list with the
/// observed alphabet.
pub const RUSSIAN_VOWELS: &[&str] = &[
    "a", "e", "i", "o", "u", "æ", "ɐ", "ə", "ɛ", "ɨ", "ɪ", "ɵ", "ʉ", "ʊ",
];

/// Marks that may follow a consonant: palatalization, length, dental.
const CONSONANT_MODIFIERS: &str = "ʲː\u{32a}";

/// Length mark allowed after the modifier.
const LENGTH_MARK: &str = "ː";

/// The class of a single phoneme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeClass {
    /// Syllabic nucleus; kept verbatim in masks.
    Vowel,
    /// Anything else; replaced by a flexible placeholder.
    Consonant,
}

/// Vowel and consonant sets derived from a phoneme alphabet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhonemeInventory {
    vowels: BTreeSet<String>,
    consonants: BTreeSet<String>,
}

impl PhonemeInventory {
    /// Classify `alphabet` against [`RUSSIAN_VOWELS`].
    pub fn classify<I, S>(alphabet: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_vowels(alphabet, RUSSIAN_VOWELS.iter().copied())
    }

    /// Classify `alphabet` against a caller-supplied vowel list.
    pub fn with_vowels<I, S, V, T>(alphabet: I, vowels: V) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        V: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let vowel_list: BTreeSet<String> =
            vowels.into_iter().map(|v| v.as_ref().to_string()).collect();
        let mut inventory = Self::default();
        for phoneme in alphabet {
            let phoneme = phoneme.into();
            if phoneme.is_empty() {
                continue;
            }
            if vowel_list.contains(&phoneme) {
                inventory.vowels.insert(phoneme);
            } else {
                inventory.consonants.insert(phoneme);
            }
        }
        tracing::debug!(
            vowels = inventory.vowels.len(),
            consonants = inventory.consonants.len(),
            "phoneme inventory classified"
        );
        inventory
    }

    /// Build an inventory from explicit vowel and consonant lists.
    ///
    /// A phoneme present in both lists is treated as a vowel.
    pub fn from_parts<V, C, S>(vowels: V, consonants: C) -> Self
    where
        V: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vowels: BTreeSet<String> = vowels.into_iter().map(Into::into).collect();
        let consonants = consonants
            .into_iter()
            .map(Into::into)
            .filter(|c: &String| !vowels.contains(c))
            .collect();
        Self { vowels, consonants }
    }

    /// Class of `phoneme`, or `None` if it is not part of the alphabet.
    pub fn classify_phoneme(&self, phoneme: &str) -> Option<PhonemeClass> {
        if self.vowels.contains(phoneme) {
            Some(PhonemeClass::Vowel)
        } else if self.consonants.contains(phoneme) {
            Some(PhonemeClass::Consonant)
        } else {
            None
        }
    }

    /// True if `phoneme` is a known vowel.
    pub fn is_vowel(&self, phoneme: &str) -> bool {
        self.vowels.contains(phoneme)
    }

    /// Vowel phonemes, sorted.
    pub fn vowels(&self) -> impl Iterator<Item = &str> {
        self.vowels.iter().map(String::as_str)
    }

    /// Consonant phonemes, sorted.
    pub fn consonants(&self) -> impl Iterator<Item = &str> {
        self.consonants.iter().map(String::as_str)
    }

    /// Number of classified phonemes.
    pub fn len(&self) -> usize {
        self.vowels.len() + self.consonants.len()
    }

    /// True if nothing has been classified.
    pub fn is_empty(&self) -> bool {
        self.vowels.is_empty() && self.consonants.is_empty()
    }

    /// Body of a regex character class covering every consonant character.
    ///
    /// Characters are escaped, sorted and deduplicated. Empty if there are no
    /// consonants.
    pub fn consonant_class(&self) -> String {
        let chars: BTreeSet<char> = self.consonants.iter().flat_map(|c| c.chars()).collect();
        chars
            .into_iter()
            .map(|c| {
                let mut buf = [0; 4];
                regex::escape(c.encode_utf8(&mut buf))
            })
            .collect()
    }

    /// Pattern for one optional consonant phoneme plus optional trailing space.
    pub fn consonant_placeholder(&self) -> String {
        let class = self.consonant_class();
        if class.is_empty() {
            return "()?".to_string();
        }
        format!(r"([{class}]+[{CONSONANT_MODIFIERS}]?[{LENGTH_MARK}]?\s?)?")
    }

    /// Check that no consonant character doubles as a vowel phoneme.
    pub fn validate(&self) -> Result<(), InventoryError> {
        for phoneme in &self.consonants {
            for character in phoneme.chars() {
                let mut buf = [0; 4];
                let as_str: &str = character.encode_utf8(&mut buf);
                if self.vowels.contains(as_str) {
                    return Err(InventoryError::AmbiguousCharacter {
                        character,
                        phoneme: phoneme.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
