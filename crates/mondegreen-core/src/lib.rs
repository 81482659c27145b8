//! Core library for mondegreen.
//!
//! Finds phrases that sound like an input phrase by matching vowel skeletons
//! against a pronunciation dictionary.
//!
//! # Pipeline
//!
//! 1. [`dictionary`] loads transcriptions and derives a [`phoneme`] inventory.
//! 2. [`mask`] turns each pronunciation variant into a vowel skeleton.
//! 3. [`partition`] re-segments the skeleton into dictionary-attested runs.
//! 4. [`assemble`] expands each partition into candidate phrases via [`combine`].
//! 5. [`filter`] keeps candidates with matching stress and acceptable grammar.
//!
//! [`search`] drives all of it with host limits; [`config`] and [`error`]
//! provide configuration loading and error types.
//!
//! # Quick Start
//!
//! ```no_run
//! use camino::Utf8Path;
//! use mondegreen_core::{Dictionary, DictionaryOptions, HomophoneSearch, MarkedStress, RuleChecker};
//!
//! let dictionary = Dictionary::load(Utf8Path::new("ru.tsv"), &DictionaryOptions::default())
//!     .expect("dictionary should load");
//! let search = HomophoneSearch::new(&dictionary, MarkedStress, RuleChecker::default());
//! for phrase in search.search("молоко хорошо").accepted {
//!     println!("{phrase}");
//! }
//! ```
#![deny(unsafe_code)]

pub mod assemble;
pub mod combine;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod mask;
pub mod partition;
pub mod phoneme;
pub mod search;

pub use assemble::{assemble, generate_candidates};
pub use combine::{CartesianProduct, Choice, expand};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use dictionary::{Dictionary, DictionaryOptions, Transcription};
pub use error::{
    ConfigError, ConfigResult, DictionaryError, DictionaryResult, InventoryError,
};
pub use filter::{
    AcceptAll, CandidateFilter, GrammarChecker, MarkedStress, RuleChecker, StressPredictor,
};
pub use mask::{Mask, SkeletonToken, build_masks};
pub use partition::{Partition, Partitions, SearchLimits, Segment, StopReason};
pub use phoneme::{PhonemeClass, PhonemeInventory};
pub use search::{HomophoneSearch, SearchOptions, SearchReport};
