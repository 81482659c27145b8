//! Search command: homophone phrases for an input phrase.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use mondegreen_core::filter::Severity;
use mondegreen_core::{
    Config, GrammarChecker, HomophoneSearch, MarkedStress, RuleChecker, SearchOptions,
    SearchReport,
};

use super::{load_dictionary, read_phrase};

/// Arguments for the `search` subcommand.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Phrase to search for (prompted for when omitted)
    pub phrase: Vec<String>,

    /// Pronunciation dictionary (TSV)
    #[arg(short, long, value_name = "FILE")]
    pub dictionary: Option<Utf8PathBuf>,

    /// Dictionary runs must be longer than N mask tokens
    #[arg(long, value_name = "N")]
    pub min_segment: Option<usize>,

    /// Stop after N accepted phrases
    #[arg(short = 'n', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Stop after MS milliseconds
    #[arg(long, value_name = "MS")]
    pub time_budget: Option<u64>,

    /// Search every pronunciation variant, not only the first
    #[arg(long)]
    pub all_variants: bool,

    /// Skip the grammar check
    #[arg(long)]
    pub no_grammar: bool,

    /// Reject phrases with grammar issues at or above this severity
    #[arg(long, value_enum, value_name = "SEVERITY")]
    pub reject_at: Option<Severity>,
}

impl SearchArgs {
    fn options(&self, config: &Config) -> SearchOptions {
        let mut options = SearchOptions::from(config);
        if let Some(min) = self.min_segment {
            options.min_segment_tokens = min;
        }
        if self.limit.is_some() {
            options.max_candidates = self.limit;
        }
        if self.time_budget.is_some() {
            options.time_budget_ms = self.time_budget;
        }
        options.all_variants |= self.all_variants;
        options
    }

    fn grammar(&self) -> impl GrammarChecker + use<> {
        let checker = self.reject_at.map_or_else(RuleChecker::default, |reject_at| {
            RuleChecker { reject_at }
        });
        let skip = self.no_grammar;
        move |text: &str| skip || checker.is_well_formed(text)
    }
}

/// Search for phrases that sound like the given one.
#[instrument(name = "cmd_search", skip_all)]
pub fn cmd_search(
    args: SearchArgs,
    global_json: bool,
    quiet: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let dictionary = load_dictionary(args.dictionary.as_deref(), config)?;
    let phrase = read_phrase(&args.phrase, std::io::stdin().lock(), std::io::stderr())?;
    let options = args.options(config);
    debug!(%phrase, ?options, no_grammar = args.no_grammar, "executing search command");

    let search =
        HomophoneSearch::new(&dictionary, MarkedStress, args.grammar()).with_options(options);

    let spinner = if quiet || global_json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    spinner.set_message(format!("searching \"{phrase}\""));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut examined = 0u64;
    let report = search.search_with(&phrase, |_, _| {
        examined += 1;
        if examined % 512 == 0 {
            spinner.set_message(format!("{examined} candidates examined"));
        }
    });
    spinner.finish_and_clear();

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for phrase in &report.accepted {
        println!("{phrase}");
    }
    if !quiet {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &SearchReport) {
    if report.accepted.is_empty() && !report.phrase.trim().is_empty() {
        eprintln!("{}", "no homophones found".yellow());
    }
    if let Some(reason) = report.stopped {
        eprintln!(
            "{} {} after {} candidates",
            "stopped:".yellow(),
            reason,
            report.examined
        );
    }
}
