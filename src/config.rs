//! Filter configuration.
//!
//! Decides which scanned files take part in a run. Filters never change how a
//! file is bucketed, only whether it is moved at all. Rules are read from TOML:
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Patterns are matched against the path relative to the directory being
//! organized.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".janitorrc.toml";

/// Errors raised while loading or compiling the filter configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration in {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("Failed to read configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether names starting with "." are organized. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist; a match here overrides every exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions without the dot, compared case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regexes matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FilterConfig {
    /// Loads the configuration.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (it must exist)
    /// 2. `.janitorrc.toml` in the current directory
    /// 3. `~/.config/file-janitor/config.toml`
    /// 4. built-in defaults, which exclude nothing
    ///
    /// # Errors
    ///
    /// Fails if the chosen file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("file-janitor")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded configuration");

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Compiles the rules into matchers.
    ///
    /// # Errors
    ///
    /// Fails on an invalid glob or regex.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Filter rules with every pattern pre-compiled.
#[derive(Debug)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
    /// Configuration files that must stay where they are.
    protected: Vec<PathBuf>,
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
            protected: Vec::new(),
        })
    }

    /// Keeps `path` out of every run, whatever the rules say.
    ///
    /// `.janitorrc.toml` is always protected; this adds a configuration file
    /// given on the command line.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use file_janitor::config::FilterConfig;
    /// use std::path::Path;
    ///
    /// let rules = Path::new("/data/inbox/rules.toml");
    /// let filters = FilterConfig::load(Some(rules))?.compile()?.protect(rules);
    /// # Ok::<(), file_janitor::ConfigError>(())
    /// ```
    pub fn protect(mut self, path: &Path) -> Self {
        let canonical = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.protected.push(canonical);
        self
    }

    fn is_protected(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if name == OsStr::new(LOCAL_CONFIG_FILE) {
            return true;
        }
        self.protected.iter().any(|protected| {
            protected.file_name() == Some(name)
                && (protected == path
                    || fs::canonicalize(path).is_ok_and(|canonical| canonical == *protected))
        })
    }

    /// True when every file passes, so filtering can be skipped.
    pub fn is_permissive(&self) -> bool {
        self.enable_hidden_files
            && self.exclude_filenames.is_empty()
            && self.exclude_extensions.is_empty()
            && self.exclude_patterns.is_empty()
            && self.exclude_regexes.is_empty()
    }

    /// Whether `relative_path` should be organized.
    ///
    /// Include patterns win; otherwise the file is dropped if it is hidden (when
    /// hidden files are disabled) or matches any exclude rule.
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }

    /// Splits `files` into the ones to organize and the ones filtered out,
    /// preserving order. Paths are matched relative to `root`.
    ///
    /// Protected configuration files always land in the second list.
    ///
    /// # Arguments
    ///
    /// * `files` - Scanned paths, all inside `root`
    /// * `root` - The directory being organized
    pub fn partition(&self, files: Vec<PathBuf>, root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        files.into_iter().partition(|path| {
            if self.is_protected(path) {
                debug!(path = %path.display(), "leaving configuration file in place");
                return false;
            }
            if self.is_permissive() {
                return true;
            }
            let relative = path.strip_prefix(root).unwrap_or(path.as_path());
            self.should_include(relative)
        })
    }
}
