//! Masks command: print the vowel skeleton of each pronunciation variant.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use mondegreen_core::{Config, Dictionary, Mask, SkeletonToken, build_masks};

use super::load_dictionary;

/// Arguments for the `masks` subcommand.
#[derive(Args, Debug)]
pub struct MasksArgs {
    /// Phrase to analyze
    #[arg(required = true, num_args = 1..)]
    pub phrase: Vec<String>,

    /// Pronunciation dictionary (TSV)
    #[arg(short, long, value_name = "FILE")]
    pub dictionary: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct MaskInfo<'a> {
    variant: usize,
    pattern: String,
    vowels: usize,
    tokens: &'a [SkeletonToken],
}

impl<'a> MaskInfo<'a> {
    fn new(variant: usize, mask: &'a Mask, dictionary: &Dictionary) -> Self {
        Self {
            variant,
            pattern: mask
                .to_pattern_string(dictionary.inventory())
                .trim_end()
                .to_string(),
            vowels: mask.vowel_count(),
            tokens: mask.tokens(),
        }
    }
}

/// Print one mask per pronunciation variant of the phrase.
#[instrument(name = "cmd_masks", skip_all)]
pub fn cmd_masks(args: MasksArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let dictionary = load_dictionary(args.dictionary.as_deref(), config)?;
    let phrase = args.phrase.join(" ");
    let masks = build_masks(&phrase, &dictionary);
    debug!(%phrase, variants = masks.len(), "executing masks command");

    let infos: Vec<MaskInfo<'_>> = masks
        .iter()
        .enumerate()
        .map(|(idx, mask)| MaskInfo::new(idx + 1, mask, &dictionary))
        .collect();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    for info in &infos {
        if infos.len() > 1 {
            println!("{} {}", format!("{}:", info.variant).dimmed(), info.pattern);
        } else {
            println!("{}", info.pattern);
        }
    }
    Ok(())
}
