//! Scan configuration.
//!
//! There is no configuration file. A [`ScanConfig`] is assembled from the
//! command line (with environment fallbacks handled by clap) and handed to
//! the pipeline, which never consults global state.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::cli::Cli;
use crate::scanner::HashAlgorithm;

/// Default cap on simultaneously open files / in-flight hashes.
pub const DEFAULT_MAX_CONCURRENCY: usize = 30;

/// Directory names pruned by default: VCS metadata, dependency caches,
/// tool state and build output.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".venv",
    "venv",
    "node_modules",
    "__pycache__",
    ".idea",
    ".vscode",
    ".cache",
    ".cargo",
    ".config",
    ".docker",
    ".local",
    ".rustup",
    ".themes",
    "target",
    "go",
    "build",
    "dist",
    "vendor",
];

/// Errors raised while building a configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An exclusion pattern could not be compiled.
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// The underlying matcher error
        #[source]
        source: ignore::Error,
    },
}

/// Set of directory-name patterns whose subtrees are pruned from the walk.
///
/// Patterns use gitignore syntax and are matched against a directory's own
/// name, so `node_modules` and `*.egg-info` both work as expected.
#[derive(Debug, Clone)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    matcher: Option<Gitignore>,
}

impl Default for ExcludeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl ExcludeSet {
    /// An exclusion set that prunes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            matcher: None,
        }
    }

    /// The built-in exclusion set ([`DEFAULT_EXCLUDED_DIRS`]).
    #[must_use]
    pub fn defaults() -> Self {
        let mut builder = GitignoreBuilder::new("");
        for name in DEFAULT_EXCLUDED_DIRS {
            // Plain names are always valid gitignore lines.
            let _ = builder.add_line(None, name);
        }
        Self {
            patterns: DEFAULT_EXCLUDED_DIRS.iter().map(|s| (*s).to_string()).collect(),
            matcher: builder.build().ok(),
        }
    }

    /// Compile an exclusion set from arbitrary patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        if patterns.is_empty() {
            return Ok(Self::empty());
        }

        let mut builder = GitignoreBuilder::new("");
        for pattern in &patterns {
            builder
                .add_line(None, pattern)
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
        }
        let matcher = builder.build().map_err(|source| ConfigError::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self {
            patterns,
            matcher: Some(matcher),
        })
    }

    /// The patterns this set was built from.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a directory called `name` should be pruned.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        match &self.matcher {
            Some(gi) => gi.matched(Path::new(name), true).is_ignore(),
            None => false,
        }
    }
}

/// Everything a single scan needs.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of concurrent hash tasks (at least 1).
    pub max_concurrency: usize,
    /// Directory names to prune.
    pub excludes: ExcludeSet,
    /// Content digest algorithm.
    pub algorithm: HashAlgorithm,
    /// Confirm hash groups with a byte-for-byte comparison.
    pub paranoid: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanConfig {
    /// Configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            excludes: ExcludeSet::defaults(),
            algorithm: HashAlgorithm::default(),
            paranoid: false,
        }
    }

    /// Set the concurrency cap (clamped to at least 1).
    #[must_use]
    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    /// Replace the exclusion set.
    #[must_use]
    pub fn with_excludes(mut self, excludes: ExcludeSet) -> Self {
        self.excludes = excludes;
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Enable or disable byte-for-byte verification.
    #[must_use]
    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }

    /// Build a configuration from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// Fails if an exclusion pattern is invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut patterns: Vec<String> = if cli.no_default_excludes {
            Vec::new()
        } else {
            DEFAULT_EXCLUDED_DIRS.iter().map(|s| (*s).to_string()).collect()
        };
        patterns.extend(cli.exclude.iter().cloned());
        let excludes = ExcludeSet::new(patterns)?;

        Ok(Self::new()
            .with_max_concurrency(cli.max_concurrency)
            .with_excludes(excludes)
            .with_algorithm(cli.algorithm)
            .with_paranoid(cli.paranoid))
    }
}
