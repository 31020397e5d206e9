//! Container options.
//!
//! Options can be built in code, read from environment variables, or (with
//! the `config` feature) deserialized from JSON.

use std::env;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Default bound on registration walks and resolution stacks.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What to do when two producer methods declare the same return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum DuplicateProducers {
    /// Keep the first producer in scan order, ignore the rest
    #[default]
    FirstWins,
    /// Fail registration with `DuplicateProducer`
    Reject,
}

impl FromStr for DuplicateProducers {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first_wins" | "first-wins" => Ok(DuplicateProducers::FirstWins),
            "reject" => Ok(DuplicateProducers::Reject),
            other => Err(DiError::InvalidOption {
                name: "duplicate_producers".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Options for a container.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{ContainerOptions, DuplicateProducers};
///
/// let options = ContainerOptions::default()
///     .with_max_depth(32)
///     .with_duplicate_producers(DuplicateProducers::Reject);
///
/// assert_eq!(options.max_depth, 32);
/// assert_eq!(options.duplicate_producers, DuplicateProducers::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Deepest dependency chain accepted before `DepthExceeded`
    #[cfg_attr(feature = "config", serde(deserialize_with = "positive_depth"))]
    pub max_depth: usize,
    /// Policy for producer methods sharing a return type
    pub duplicate_producers: DuplicateProducers,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            duplicate_producers: DuplicateProducers::FirstWins,
        }
    }
}

impl ContainerOptions {
    /// Sets the depth bound. A bound of 0 admits no type at all, so every
    /// registration fails with `DepthExceeded(0)`; the loaders reject it.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_duplicate_producers(mut self, policy: DuplicateProducers) -> Self {
        self.duplicate_producers = policy;
        self
    }

    /// Reads `<PREFIX>_MAX_DEPTH` and `<PREFIX>_DUPLICATE_PRODUCERS`.
    ///
    /// Unset variables keep their defaults; unparsable ones, and a max depth
    /// of 0, fail with `InvalidOption`.
    pub fn from_env_prefixed(prefix: &str) -> DiResult<Self> {
        Self::from_lookup(prefix, |name| env::var(name).ok())
    }

    fn from_lookup<F>(prefix: &str, lookup: F) -> DiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = prefix.to_uppercase();
        let mut options = Self::default();

        let depth_var = format!("{}_MAX_DEPTH", prefix);
        if let Some(raw) = lookup(&depth_var) {
            options.max_depth = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|depth| *depth > 0)
                .ok_or_else(|| DiError::InvalidOption {
                    name: depth_var.clone(),
                    value: raw.clone(),
                })?;
        }

        let policy_var = format!("{}_DUPLICATE_PRODUCERS", prefix);
        if let Some(raw) = lookup(&policy_var) {
            options.duplicate_producers = raw.parse().map_err(|_| DiError::InvalidOption {
                name: policy_var.clone(),
                value: raw.clone(),
            })?;
        }

        Ok(options)
    }

    /// Parses options from JSON; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(feature = "config")]
fn positive_depth<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match usize::deserialize(deserializer)? {
        0 => Err(serde::de::Error::custom("max_depth must be at least 1")),
        depth => Ok(depth),
    }
}
