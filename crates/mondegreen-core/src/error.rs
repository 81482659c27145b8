//! Error types for mondegreen-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Problems with a phoneme inventory that would corrupt every mask built from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A character used by a consonant phoneme is also a vowel phoneme, so a
    /// consonant placeholder could swallow that vowel.
    #[error("consonant character {character:?} (in phoneme {phoneme:?}) is also a vowel")]
    AmbiguousCharacter {
        /// The offending character.
        character: char,
        /// The consonant phoneme it was taken from.
        phoneme: String,
    },
}

/// Errors raised while loading a pronunciation dictionary.
///
/// A missing word is never an error; these cover only data the loader cannot
/// trust.
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// The dictionary file could not be read.
    #[error("failed to read dictionary {path}")]
    Io {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Reading from a stream failed part way.
    #[error("failed to read dictionary line {line}")]
    Read {
        /// 1-indexed line number.
        line: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A row did not have a word and a transcription.
    #[error("malformed dictionary row at line {line}: {reason}")]
    MalformedRow {
        /// 1-indexed line number.
        line: usize,
        /// What was wrong with the row.
        reason: &'static str,
    },

    /// A transcription uses a phoneme the supplied inventory does not classify.
    #[error("word {word:?} uses unclassified phoneme {phoneme:?}")]
    UnclassifiedPhoneme {
        /// Owning word.
        word: String,
        /// The phoneme absent from the inventory.
        phoneme: String,
    },

    /// The derived inventory is inconsistent.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Result type alias using [`DictionaryError`].
pub type DictionaryResult<T> = Result<T, DictionaryError>;
