use serde::{Deserialize, Serialize};

use crate::cache::{CachedFilter, DEFAULT_CACHE_SIZE};
use crate::error::{FilterError, Result};
use crate::filter::Filter;

/// Serializable description of a filter.
///
/// ```
/// use ipfilter::FilterConfig;
///
/// let config = FilterConfig::from_json(r#"{"ranges": ["10.0.0.0/8"]}"#).unwrap();
/// assert!(config.build().contains("10.1.2.3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// CIDR literals, inserted in order
    #[serde(default)]
    pub ranges: Vec<String>,
    /// Capacity of the lookup cache used by [`build_cached`](Self::build_cached)
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ranges: Vec::new(),
            cache_size: DEFAULT_CACHE_SIZE,
        }
    }
}

impl FilterConfig {
    pub fn new(ranges: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            ranges: ranges.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Deserialize a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.cache_size == 0 {
            return Err(FilterError::Config("cache_size must be at least 1".to_string()));
        }
        Ok(config)
    }

    /// Append ranges from a line-oriented list (see [`parse_range_list`]).
    pub fn with_range_list(mut self, text: &str) -> Self {
        self.ranges
            .extend(parse_range_list(text).into_iter().map(String::from));
        self
    }

    pub fn build(&self) -> Filter {
        Filter::new(&self.ranges)
    }

    pub fn build_cached(&self) -> CachedFilter {
        CachedFilter::new(self.build(), self.cache_size)
    }
}

/// Split a range list into entries: one per line, `#` starts a comment.
///
/// Entries are trimmed but not validated; malformed ones are skipped later
/// when the filter is built.
pub fn parse_range_list(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| match line.find('#') {
            Some(comment_pos) => &line[..comment_pos],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
