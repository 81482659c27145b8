//! Command implementations.

use std::io::{BufRead, Write};

use anyhow::{Context, bail};
use camino::Utf8Path;
use mondegreen_core::{Config, Dictionary};

pub mod info;
pub mod masks;
pub mod search;

/// Prompt shown when no phrase was given on the command line.
pub const PHRASE_PROMPT: &str = "Введите фразу: ";

/// Load the dictionary named on the command line, or the configured one.
pub fn load_dictionary(explicit: Option<&Utf8Path>, config: &Config) -> anyhow::Result<Dictionary> {
    let Some(path) = explicit.or(config.dictionary.as_deref()) else {
        bail!("no dictionary given: pass --dictionary or set `dictionary` in the config file");
    };
    Dictionary::load(path, &config.dictionary_options())
        .with_context(|| format!("failed to load dictionary {path}"))
}

/// Join phrase words from the command line, or prompt for a line on `input`.
pub fn read_phrase<R: BufRead, W: Write>(
    words: &[String],
    mut input: R,
    mut prompt: W,
) -> anyhow::Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    prompt.write_all(PHRASE_PROMPT.as_bytes())?;
    prompt.flush()?;
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read phrase from stdin")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_are_joined_without_prompting() {
        let mut prompt = Vec::new();
        let phrase = read_phrase(
            &["молоко".to_string(), "хорошо".to_string()],
            &b""[..],
            &mut prompt,
        )
        .unwrap();
        assert_eq!(phrase, "молоко хорошо");
        assert!(prompt.is_empty());
    }

    #[test]
    fn missing_phrase_is_prompted_for() {
        let mut prompt = Vec::new();
        let phrase = read_phrase(&[], "кот код\n".as_bytes(), &mut prompt).unwrap();
        assert_eq!(phrase, "кот код");
        assert_eq!(String::from_utf8(prompt).unwrap(), PHRASE_PROMPT);
    }

    #[test]
    fn missing_dictionary_is_an_error() {
        let err = load_dictionary(None, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("--dictionary"));
    }
}
