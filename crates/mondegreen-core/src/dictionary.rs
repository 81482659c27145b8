//! Pronunciation dictionary.
//!
//! Maps orthographic words to one or more [`Transcription`]s and answers the
//! reverse question: which words have a transcription fully matching a
//! [`SegmentPattern`].
//!
//! The on-disk format is the tab-separated table used by MFA pronunciation
//! dictionaries:
//!
//! ```text
//! молоко	m ɐ l ɐ k o
//! замок	z a m ə k
//! замок	z ɐ m o k
//! ```
//!
//! Blank lines, `#` comments and special-token rows such as `<cutoff>` are
//! stripped. Rows with extra columns (pronunciation probabilities) use the last
//! column as the transcription.

use std::collections::HashMap;
use std::io::BufRead;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::{DictionaryError, DictionaryResult};
use crate::mask::SegmentPattern;
use crate::phoneme::{PhonemeClass, PhonemeInventory};

/// One pronunciation of one word: an ordered phoneme sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transcription {
    phonemes: Vec<String>,
}

impl Transcription {
    /// Build a transcription from phoneme symbols.
    pub fn new<I, S>(phonemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phonemes: phonemes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a space-separated phoneme string.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split_whitespace())
    }

    /// The phoneme symbols in order.
    pub fn phonemes(&self) -> &[String] {
        &self.phonemes
    }

    /// Number of phonemes.
    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    /// True for a transcription with no phonemes.
    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }
}

impl std::fmt::Display for Transcription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.phonemes.join(" "))
    }
}

/// Options controlling how a dictionary is loaded.
#[derive(Debug, Clone, Default)]
pub struct DictionaryOptions {
    /// Leading lines to drop before parsing (header rows).
    pub skip_rows: usize,
    /// Vowel list to classify against instead of the built-in Russian set.
    pub vowels: Option<Vec<String>>,
    /// A fixed inventory. Every phoneme in the dictionary must be classified by
    /// it, otherwise loading fails.
    pub inventory: Option<PhonemeInventory>,
}

#[derive(Debug, Clone)]
struct Entry {
    word: String,
    transcription: Transcription,
    /// Phonemes joined by single spaces; what patterns are matched against.
    text: String,
}

/// An immutable pronunciation dictionary plus its derived phoneme inventory.
#[derive(Debug, Clone)]
pub struct Dictionary {
    entries: Vec<Entry>,
    by_word: HashMap<String, Vec<usize>>,
    by_vowel_count: HashMap<usize, Vec<usize>>,
    inventory: PhonemeInventory,
    placeholder: String,
}

impl Dictionary {
    /// Build a dictionary from `(word, transcription)` pairs with default options.
    pub fn from_entries<I, W>(entries: I) -> DictionaryResult<Self>
    where
        I: IntoIterator<Item = (W, Transcription)>,
        W: Into<String>,
    {
        Self::build(
            entries.into_iter().map(|(w, t)| (w.into(), t)).collect(),
            &DictionaryOptions::default(),
        )
    }

    /// Parse a TSV table held in memory.
    pub fn from_tsv_str(text: &str, options: &DictionaryOptions) -> DictionaryResult<Self> {
        Self::from_reader(text.as_bytes(), options)
    }

    /// Parse a TSV table from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R, options: &DictionaryOptions) -> DictionaryResult<Self> {
        let mut rows = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| DictionaryError::Read {
                line: line_no,
                source,
            })?;
            if idx < options.skip_rows {
                continue;
            }
            if let Some(row) = parse_row(&line, line_no)? {
                rows.push(row);
            }
        }
        Self::build(rows, options)
    }

    /// Load a TSV dictionary file.
    #[tracing::instrument(skip(options))]
    pub fn load(path: &Utf8Path, options: &DictionaryOptions) -> DictionaryResult<Self> {
        let file = std::fs::File::open(path.as_std_path()).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dictionary = Self::from_reader(std::io::BufReader::new(file), options)?;
        tracing::info!(
            entries = dictionary.len(),
            words = dictionary.word_count(),
            "dictionary loaded"
        );
        Ok(dictionary)
    }

    fn build(rows: Vec<(String, Transcription)>, options: &DictionaryOptions) -> DictionaryResult<Self> {
        let inventory = match &options.inventory {
            Some(inventory) => {
                for (word, transcription) in &rows {
                    if let Some(phoneme) = transcription
                        .phonemes()
                        .iter()
                        .find(|p| inventory.classify_phoneme(p).is_none())
                    {
                        return Err(DictionaryError::UnclassifiedPhoneme {
                            word: word.clone(),
                            phoneme: phoneme.clone(),
                        });
                    }
                }
                inventory.clone()
            }
            None => {
                let alphabet = rows
                    .iter()
                    .flat_map(|(_, t)| t.phonemes().iter().cloned());
                match &options.vowels {
                    Some(vowels) => PhonemeInventory::with_vowels(alphabet, vowels),
                    None => PhonemeInventory::classify(alphabet),
                }
            }
        };
        inventory.validate()?;

        let mut entries = Vec::with_capacity(rows.len());
        let mut by_word: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_vowel_count: HashMap<usize, Vec<usize>> = HashMap::new();
        for (idx, (word, transcription)) in rows.into_iter().enumerate() {
            let vowels = transcription
                .phonemes()
                .iter()
                .filter(|p| inventory.classify_phoneme(p) == Some(PhonemeClass::Vowel))
                .count();
            by_word.entry(word.to_lowercase()).or_default().push(idx);
            by_vowel_count.entry(vowels).or_default().push(idx);
            entries.push(Entry {
                text: transcription.to_string(),
                word,
                transcription,
            });
        }

        let placeholder = inventory.consonant_placeholder();
        Ok(Self {
            entries,
            by_word,
            by_vowel_count,
            inventory,
            placeholder,
        })
    }

    /// All transcriptions of `word` (case-insensitive). Empty when unknown.
    pub fn lookup(&self, word: &str) -> Vec<&Transcription> {
        self.by_word
            .get(&word.to_lowercase())
            .map(|indices| {
                indices
                    .iter()
                    .map(|&idx| &self.entries[idx].transcription)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Alias of [`Dictionary::lookup`] matching the provider interface.
    pub fn lookup_by_word(&self, word: &str) -> Vec<&Transcription> {
        self.lookup(word)
    }

    /// Words owning a transcription that fully matches `pattern`.
    ///
    /// One word per matching row, in dictionary order: a homograph with two
    /// matching transcriptions is returned twice.
    pub fn lookup_by_pattern(&self, pattern: &SegmentPattern) -> Vec<&str> {
        self.candidates_for(pattern)
            .filter(|entry| pattern.is_full_match(&entry.text))
            .map(|entry| entry.word.as_str())
            .collect()
    }

    /// True if any transcription fully matches `pattern`.
    pub fn has_match(&self, pattern: &SegmentPattern) -> bool {
        self.candidates_for(pattern)
            .any(|entry| pattern.is_full_match(&entry.text))
    }

    /// Entries that can possibly match: same number of vowels as the pattern.
    fn candidates_for<'a>(&'a self, pattern: &SegmentPattern) -> impl Iterator<Item = &'a Entry> {
        self.by_vowel_count
            .get(&pattern.vowel_count())
            .into_iter()
            .flatten()
            .map(|&idx| &self.entries[idx])
    }

    /// The derived vowel/consonant classification.
    pub const fn inventory(&self) -> &PhonemeInventory {
        &self.inventory
    }

    /// Placeholder pattern substituted for every consonant in a mask.
    pub fn consonant_placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Every phoneme symbol used by the dictionary, sorted.
    pub fn alphabet(&self) -> Vec<&str> {
        let mut alphabet: Vec<&str> = self
            .inventory
            .vowels()
            .chain(self.inventory.consonants())
            .collect();
        alphabet.sort_unstable();
        alphabet
    }

    /// Number of `(word, transcription)` rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the dictionary has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct words (case-insensitive).
    pub fn word_count(&self) -> usize {
        self.by_word.len()
    }
}

/// Parse one TSV line. `Ok(None)` for lines that carry no entry.
fn parse_row(line: &str, line_no: usize) -> DictionaryResult<Option<(String, Transcription)>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut columns = line.split('\t');
    let word = columns.next().unwrap_or_default().trim();
    let Some(transcription) = columns.last() else {
        return Err(DictionaryError::MalformedRow {
            line: line_no,
            reason: "missing tab-separated transcription",
        });
    };
    if word.is_empty() {
        return Err(DictionaryError::MalformedRow {
            line: line_no,
            reason: "empty word",
        });
    }
    // Special tokens of aligner dictionaries: <cutoff>, <eps>, <unk>.
    if word.starts_with('<') && word.ends_with('>') {
        return Ok(None);
    }
    let transcription = Transcription::parse(transcription);
    if transcription.is_empty() {
        return Err(DictionaryError::MalformedRow {
            line: line_no,
            reason: "empty transcription",
        });
    }
    Ok(Some((word.to_string(), transcription)))
}
