// vim: set ai et ts=4 sw=4 sts=4:
//! Solver configuration.
//!
//! Values start from [`SolverConfig::default`], may be overridden by an
//! optional `solver:` section in the puzzle file, and finally by command-line
//! flags.
use std::convert::TryFrom;
use std::fmt;
use thiserror::Error;
use yaml_rust::Yaml;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum SearchMode {
    /// Stop at the first solution found.
    FirstSolution,
    /// Keep exploring after the first solution to detect a second one.
    VerifyUnique,
}
impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            SearchMode::FirstSolution => "first",
            SearchMode::VerifyUnique  => "unique",
        })
    }
}
impl TryFrom<&str> for SearchMode {
    type Error = &'static str;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "first"  => Ok(SearchMode::FirstSolution),
            "unique" => Ok(SearchMode::VerifyUnique),
            _        => Err("Not a valid SearchMode value")
        }
    }
}

/// Bounds and behaviour of the backtracking search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Whether to branch at all when line logic stalls.
    pub enabled: bool,
    pub mode: SearchMode,
    /// Maximum number of nested guesses along one branch.
    pub max_depth: usize,
    /// Maximum number of branches explored in total.
    pub max_nodes: usize,
    /// Number of worker threads exploring branches.
    pub threads: usize,
}
impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            enabled: false,
            mode: SearchMode::FirstSolution,
            max_depth: 64,
            max_nodes: 100_000,
            threads: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Safety valve: line solves allowed in one propagation run before it
    /// gives up and reports a stall.
    pub max_line_solves: usize,
    /// Entries kept in the per-solve line cache; 0 disables caching.
    pub line_cache_capacity: usize,
    pub search: SearchConfig,
}
impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_line_solves: 1_000_000,
            line_cache_capacity: 65_536,
            search: SearchConfig::default(),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("solver section must be a mapping")]
    NotAMapping,
    #[error("unknown solver setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value for solver setting '{key}': {value}")]
    InvalidValue { key: String, value: String },
}

impl SolverConfig {
    /// Applies the settings present in a `solver:` YAML mapping on top of `self`.
    /// A missing or null section leaves the configuration untouched.
    pub fn merge_yaml(mut self, section: &Yaml) -> Result<Self, ConfigError> {
        let hash = match section {
            Yaml::BadValue | Yaml::Null => return Ok(self),
            Yaml::Hash(hash)            => hash,
            _                           => return Err(ConfigError::NotAMapping),
        };
        for (key, value) in hash {
            let key = key.as_str().ok_or(ConfigError::NotAMapping)?;
            match key {
                "max_line_solves"     => self.max_line_solves = Self::_parse_count(key, value)?,
                "line_cache_capacity" => self.line_cache_capacity = Self::_parse_count(key, value)?,
                "brute_force"         => self.search.enabled = Self::_parse_bool(key, value)?,
                "max_depth"           => self.search.max_depth = Self::_parse_count(key, value)?,
                "max_nodes"           => self.search.max_nodes = Self::_parse_count(key, value)?,
                "threads"             => self.search.threads = Self::_parse_count(key, value)?.max(1),
                "mode" => {
                    self.search.mode = value.as_str()
                                            .and_then(|s| SearchMode::try_from(s).ok())
                                            .ok_or_else(|| Self::_invalid(key, value))?;
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }
        Ok(self)
    }

    fn _parse_count(key: &str, value: &Yaml) -> Result<usize, ConfigError> {
        value.as_i64()
             .and_then(|i| usize::try_from(i).ok())
             .ok_or_else(|| Self::_invalid(key, value))
    }
    fn _parse_bool(key: &str, value: &Yaml) -> Result<bool, ConfigError> {
        value.as_bool().ok_or_else(|| Self::_invalid(key, value))
    }
    fn _invalid(key: &str, value: &Yaml) -> ConfigError {
        ConfigError::InvalidValue { key: key.to_string(), value: format!("{:?}", value) }
    }
}
