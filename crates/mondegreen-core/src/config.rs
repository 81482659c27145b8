//! Configuration loading and discovery.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. `~/.config/mondegreen/config.<ext>` (user config)
//! 3. `.mondegreen.<ext>` then `mondegreen.<ext>` in the closest directory,
//!    walking up from the search root until a `.git` boundary
//! 4. Explicit files, in the order given
//! 5. `MONDEGREEN_*` environment variables
//!
//! Where `<ext>` is one of `toml`, `yaml`, `yml`, `json`. Files found in the
//! same directory are all merged; later extensions override earlier.
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use mondegreen_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
//! let (config, sources) = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! println!("{:?} from {:?}", config.dictionary, sources.primary_file());
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::dictionary::DictionaryOptions;
use crate::error::{ConfigError, ConfigResult};
use crate::partition::DEFAULT_MIN_SEGMENT_TOKENS;

/// Settings for mondegreen.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application.
    pub log_level: LogLevel,
    /// Directory for log files.
    pub log_dir: Option<Utf8PathBuf>,
    /// Pronunciation dictionary (TSV, last column is the transcription).
    pub dictionary: Option<Utf8PathBuf>,
    /// Header rows to skip when reading the dictionary.
    pub skip_rows: usize,
    /// Vowel phonemes, replacing the built-in Russian set.
    pub vowels: Option<Vec<String>>,
    /// Dictionary runs must be longer than this many mask tokens.
    pub min_segment_tokens: usize,
    /// Stop after this many accepted phrases.
    pub max_candidates: Option<usize>,
    /// Stop after this many segment evaluations.
    pub max_search_nodes: Option<u64>,
    /// Stop after this many milliseconds.
    pub time_budget_ms: Option<u64>,
    /// Search every pronunciation variant, not only the first.
    pub all_variants: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_dir: None,
            dictionary: None,
            skip_rows: 0,
            vowels: None,
            min_segment_tokens: DEFAULT_MIN_SEGMENT_TOKENS,
            max_candidates: None,
            max_search_nodes: None,
            time_budget_ms: None,
            all_variants: false,
        }
    }
}

impl Config {
    /// Dictionary loading options derived from this config.
    pub fn dictionary_options(&self) -> DictionaryOptions {
        DictionaryOptions {
            skip_rows: self.skip_rows,
            vowels: self.vowels.clone(),
            inventory: None,
        }
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Which configuration files [`ConfigLoader::load`] actually merged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSources {
    /// Project config files, ordered low to high precedence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub project_files: Vec<Utf8PathBuf>,
    /// User config file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_file: Option<Utf8PathBuf>,
    /// Explicit config files (e.g. from `--config`).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigSources {
    /// The highest-precedence file that was loaded.
    pub fn primary_file(&self) -> Option<&Utf8Path> {
        self.explicit_files
            .last()
            .map(Utf8PathBuf::as_path)
            .or_else(|| self.project_files.last().map(Utf8PathBuf::as_path))
            .or(self.user_file.as_deref())
    }
}

const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

const APP_NAME: &str = "mondegreen";

const ENV_PREFIX: &str = "MONDEGREEN_";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Loader with user config enabled and a `.git` boundary.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for project config.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Include or skip `~/.config/mondegreen/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Stop walking up at a directory containing `marker`.
    pub fn with_boundary_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.boundary_marker = Some(marker.into());
        self
    }

    /// Walk up to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file; later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Merge every source into a [`Config`].
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<(Config, ConfigSources)> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let mut sources = ConfigSources::default();

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            figment = merge_file(figment, &user_config);
            sources.user_file = Some(user_config);
        }

        if let Some(ref root) = self.project_search_root {
            let project_configs = self.find_project_configs(root);
            for pc in &project_configs {
                figment = merge_file(figment, pc);
            }
            sources.project_files = project_configs;
        }

        for file in &self.explicit_files {
            figment = merge_file(figment, file);
        }
        sources.explicit_files = self.explicit_files;

        // MONDEGREEN_DICTIONARY=words.tsv, MONDEGREEN_MIN_SEGMENT_TOKENS=3, ...
        figment = figment.merge(Env::prefixed(ENV_PREFIX).lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::info!(
            log_level = config.log_level.as_str(),
            dictionary = ?config.dictionary,
            "configuration loaded"
        );
        Ok((config, sources))
    }

    /// Like [`ConfigLoader::load`], but fails when no file was found at all.
    pub fn load_or_error(self) -> ConfigResult<(Config, ConfigSources)> {
        let has_user = self.include_user_config && find_user_config().is_some();
        let has_project = self
            .project_search_root
            .as_ref()
            .is_some_and(|root| !self.find_project_configs(root).is_empty());
        if !has_user && !has_project && self.explicit_files.is_empty() {
            return Err(ConfigError::NotFound);
        }
        self.load()
    }

    /// Config files in the closest directory that has any, low to high precedence.
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let mut found: Vec<Utf8PathBuf> = [format!(".{APP_NAME}"), APP_NAME.to_string()]
                .iter()
                .flat_map(|stem| {
                    CONFIG_EXTENSIONS
                        .iter()
                        .map(move |ext| format!("{stem}.{ext}"))
                })
                .map(|name| dir.join(name))
                .collect();
            found.retain(|path| path.is_file());
            if !found.is_empty() {
                return found;
            }

            // Checked after the files so a config beside the marker still counts.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", APP_NAME)
}

/// `~/.config/mondegreen/` on Linux, the platform equivalent elsewhere.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = project_dirs()?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serializes tests that touch the process environment.
    static TEST_ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path).unwrap()
    }

    fn load_file(path: &Utf8Path) -> Config {
        ConfigLoader::new()
            .with_user_config(false)
            .with_file(path)
            .load()
            .unwrap()
            .0
    }

    #[test]
    fn defaults_match_search_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.min_segment_tokens, DEFAULT_MIN_SEGMENT_TOKENS);
        assert!(config.dictionary.is_none());
        assert!(!config.all_variants);
    }

    #[test]
    fn loads_defaults_without_files() {
        let (config, sources) = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load()
            .unwrap();
        assert_eq!(config.min_segment_tokens, DEFAULT_MIN_SEGMENT_TOKENS);
        assert!(config.dictionary.is_none());
        assert!(sources.primary_file().is_none());
    }

    #[test]
    fn toml_file_sets_search_fields() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        fs::write(
            &path,
            "dictionary = \"/data/ru.tsv\"\nskip_rows = 1\nmin_segment_tokens = 2\n\
             max_candidates = 50\nall_variants = true\nvowels = [\"a\", \"o\"]\n",
        )
        .unwrap();

        let config = load_file(&path);
        assert_eq!(config.dictionary.as_deref().map(Utf8Path::as_str), Some("/data/ru.tsv"));
        assert_eq!(config.skip_rows, 1);
        assert_eq!(config.min_segment_tokens, 2);
        assert_eq!(config.max_candidates, Some(50));
        assert!(config.all_variants);
        assert_eq!(config.vowels, Some(vec!["a".to_string(), "o".to_string()]));

        let options = config.dictionary_options();
        assert_eq!(options.skip_rows, 1);
        assert_eq!(options.vowels.map(|v| v.len()), Some(2));
    }

    #[test]
    fn yaml_and_json_are_supported() {
        let tmp = TempDir::new().unwrap();
        let yaml = utf8(tmp.path().join("config.yaml"));
        fs::write(&yaml, "time_budget_ms: 1500\nlog_level: debug\n").unwrap();
        let json = utf8(tmp.path().join("config.json"));
        fs::write(&json, r#"{"max_search_nodes": 10000}"#).unwrap();

        let config = load_file(&yaml);
        assert_eq!(config.time_budget_ms, Some(1500));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(load_file(&json).max_search_nodes, Some(10000));
    }

    #[test]
    fn config_deserializes_from_yaml_directly() {
        let config: Config = serde_yaml::from_str("min_segment_tokens: 3\n").unwrap();
        assert_eq!(config.min_segment_tokens, 3);
        assert_eq!(config.skip_rows, 0);
    }

    #[test]
    fn later_file_overrides_earlier() {
        let tmp = TempDir::new().unwrap();
        let base = utf8(tmp.path().join("base.toml"));
        fs::write(&base, "min_segment_tokens = 2\nskip_rows = 1\n").unwrap();
        let over = utf8(tmp.path().join("override.toml"));
        fs::write(&over, "min_segment_tokens = 6\n").unwrap();

        let (config, sources) = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&base)
            .with_file(&over)
            .load()
            .unwrap();
        assert_eq!(config.min_segment_tokens, 6);
        assert_eq!(config.skip_rows, 1);
        assert_eq!(sources.primary_file(), Some(over.as_path()));
    }

    #[test]
    fn project_config_found_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        let project = tmp.path().join("project");
        let deep = project.join("a").join("b");
        fs::create_dir_all(&deep).unwrap();
        fs::write(project.join(".mondegreen.toml"), "skip_rows = 2\n").unwrap();
        fs::write(project.join("mondegreen.toml"), "skip_rows = 3\n").unwrap();

        let (config, sources) = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(utf8(deep))
            .load()
            .unwrap();
        assert_eq!(config.skip_rows, 3);
        assert_eq!(sources.project_files.len(), 2);
    }

    #[test]
    fn boundary_marker_stops_search() {
        let tmp = TempDir::new().unwrap();
        let parent = tmp.path().join("parent");
        let child = parent.join("child");
        let work = child.join("work");
        fs::create_dir_all(&work).unwrap();
        fs::write(parent.join(".mondegreen.toml"), "skip_rows = 9\n").unwrap();
        fs::create_dir(child.join(".git")).unwrap();

        let (config, sources) = ConfigLoader::new()
            .with_user_config(false)
            .with_boundary_marker(".git")
            .with_project_search(utf8(work))
            .load()
            .unwrap();
        assert_eq!(config.skip_rows, 0);
        assert!(sources.project_files.is_empty());
    }

    #[test]
    fn explicit_file_overrides_project_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".mondegreen.toml"), "max_candidates = 5\n").unwrap();
        let over = utf8(tmp.path().join("override.toml"));
        fs::write(&over, "max_candidates = 7\n").unwrap();

        let (config, sources) = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .with_project_search(utf8(tmp.path().to_path_buf()))
            .with_file(&over)
            .load()
            .unwrap();
        assert_eq!(config.max_candidates, Some(7));
        assert_eq!(sources.project_files.len(), 1);
        assert_eq!(sources.explicit_files.len(), 1);
    }

    #[test]
    fn load_or_error_without_any_file() {
        let result = ConfigLoader::new()
            .with_user_config(false)
            .without_boundary_marker()
            .load_or_error();
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn invalid_value_is_a_deserialize_error() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        fs::write(&path, "min_segment_tokens = \"many\"\n").unwrap();

        let result = ConfigLoader::new()
            .with_user_config(false)
            .with_file(&path)
            .load();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[test]
    fn user_config_dir_is_named_after_the_app() {
        if let Some(path) = user_config_dir() {
            assert!(path.as_str().contains("mondegreen"));
        }
    }

    #[test]
    #[allow(unsafe_code)]
    fn env_var_overrides_file() {
        let _lock = TEST_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("config.toml"));
        fs::write(&path, "log_dir = \"/tmp/from-file\"\n").unwrap();

        // SAFETY: guarded by TEST_ENV_MUTEX.
        unsafe {
            std::env::set_var("MONDEGREEN_LOG_DIR", "/tmp/from-env");
        }
        let config = load_file(&path);
        // SAFETY: guarded by TEST_ENV_MUTEX.
        unsafe {
            std::env::remove_var("MONDEGREEN_LOG_DIR");
        }

        assert_eq!(
            config.log_dir.as_deref().map(Utf8Path::as_str),
            Some("/tmp/from-env")
        );
    }
}
