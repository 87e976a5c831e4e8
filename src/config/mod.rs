//! Server presets and search limit configuration.
//!
//! Every Gelbooru-compatible website enforces two numbers the deep search
//! has to respect: how many posts a single API call may return and how far
//! pagination may reach into one search. [`SearchLimits`] carries that pair
//! with its invariants enforced at construction, and [`DEFAULT_SERVERS`]
//! maps the known website labels to ready-made [`ServerConfig`] entries.
use std::collections::HashMap;
use std::fmt::Display;

use once_cell::sync::Lazy;

use self::error::ConfigError;

pub mod error;

pub(crate) const DEFAULT_UA: &str = concat!("Booru Deep Search/", env!("CARGO_PKG_VERSION"));

/// Websites with known pagination limits, addressable by label from the
/// command line. Built once and never mutated afterwards.
pub static DEFAULT_SERVERS: Lazy<HashMap<String, ServerConfig>> = Lazy::new(|| {
    let mut hmap = HashMap::with_capacity(3);
    hmap.insert(
        "gelbooru".to_string(),
        ServerConfig {
            name: "gelbooru".to_string(),
            pretty_name: "Gelbooru".to_string(),
            client_user_agent: DEFAULT_UA.to_string(),
            post_list_url: "https://gelbooru.com/index.php?page=dapi&s=post&q=index&json=1"
                .to_string(),
            limits: SearchLimits::preset(20_000, 100),
        },
    );
    hmap.insert(
        "safebooru".to_string(),
        ServerConfig {
            name: "safebooru".to_string(),
            pretty_name: "Safebooru".to_string(),
            client_user_agent: DEFAULT_UA.to_string(),
            post_list_url: "https://safebooru.org/index.php?page=dapi&s=post&q=index&json=1"
                .to_string(),
            limits: SearchLimits::preset(200_000, 1_000),
        },
    );
    hmap.insert(
        "rule34".to_string(),
        ServerConfig {
            name: "rule34".to_string(),
            pretty_name: "Rule34".to_string(),
            client_user_agent: DEFAULT_UA.to_string(),
            post_list_url: "https://api.rule34.xxx/index.php?page=dapi&s=post&q=index&json=1"
                .to_string(),
            limits: SearchLimits::preset(200_000, 1_000),
        },
    );
    hmap
});

/// The pagination limits of one website.
///
/// Invariants: both limits are greater than zero and the page size never
/// exceeds the pagination cap, so [`SearchLimits::max_pages`] is always at
/// least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    max_posts_per_search: u64,
    max_posts_per_page: u64,
}

impl SearchLimits {
    pub fn new(max_posts_per_search: u64, max_posts_per_page: u64) -> Result<Self, ConfigError> {
        if max_posts_per_search == 0 {
            return Err(ConfigError::ZeroLimit {
                limit: "max_posts_per_search",
            });
        }

        if max_posts_per_page == 0 {
            return Err(ConfigError::ZeroLimit {
                limit: "max_posts_per_page",
            });
        }

        if max_posts_per_page > max_posts_per_search {
            return Err(ConfigError::PageLimitTooBig {
                per_page: max_posts_per_page,
                per_search: max_posts_per_search,
            });
        }

        Ok(Self {
            max_posts_per_search,
            max_posts_per_page,
        })
    }

    // Presets are known-good pairs and skip the checks `new` runs on user
    // input.
    const fn preset(max_posts_per_search: u64, max_posts_per_page: u64) -> Self {
        Self {
            max_posts_per_search,
            max_posts_per_page,
        }
    }

    pub const fn max_posts_per_search(&self) -> u64 {
        self.max_posts_per_search
    }

    pub const fn max_posts_per_page(&self) -> u64 {
        self.max_posts_per_page
    }

    /// Highest page index usable as a probe: pagination stops paying out
    /// once `page * limit` walks past the search cap.
    pub const fn max_pages(&self) -> u64 {
        self.max_posts_per_search / self.max_posts_per_page
    }
}

/// Everything needed to talk to one Gelbooru-compatible website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub pretty_name: String,
    pub client_user_agent: String,
    /// Full post index endpoint, query string included.
    pub post_list_url: String,
    pub limits: SearchLimits,
}

impl ServerConfig {
    /// Resolves the `--api` argument into a server configuration.
    ///
    /// Known labels map to their preset and ignore the limit overrides,
    /// anything else is treated as the post index URL of a custom website
    /// and requires both limits to be supplied.
    pub fn resolve(
        api: &str,
        max_per_search: Option<u64>,
        max_per_page: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if let Some(config) = DEFAULT_SERVERS.get(&api.to_lowercase()) {
            return Ok(config.clone());
        }

        match (max_per_search, max_per_page) {
            (Some(per_search), Some(per_page)) => Ok(Self {
                name: api.to_string(),
                pretty_name: api.to_string(),
                client_user_agent: DEFAULT_UA.to_string(),
                post_list_url: api.to_string(),
                limits: SearchLimits::new(per_search, per_page)?,
            }),
            (None, Some(_)) => Err(ConfigError::MissingLimit {
                missing: "max-per-search",
            }),
            (Some(_), None) => Err(ConfigError::MissingLimit {
                missing: "max-per-page",
            }),
            (None, None) => Err(ConfigError::MissingLimits {
                server: api.to_string(),
            }),
        }
    }
}

impl Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn limits_reject_zero_values() {
        assert_eq!(
            SearchLimits::new(0, 100),
            Err(ConfigError::ZeroLimit {
                limit: "max_posts_per_search"
            })
        );
        assert_eq!(
            SearchLimits::new(20_000, 0),
            Err(ConfigError::ZeroLimit {
                limit: "max_posts_per_page"
            })
        );
    }

    #[test]
    fn limits_reject_page_size_above_search_cap() {
        assert_eq!(
            SearchLimits::new(100, 1_000),
            Err(ConfigError::PageLimitTooBig {
                per_page: 1_000,
                per_search: 100
            })
        );
    }

    #[test]
    fn max_pages_is_floor_division() {
        let limits = SearchLimits::new(250, 100).unwrap();
        assert_eq!(limits.max_pages(), 2);

        let limits = SearchLimits::new(20_000, 100).unwrap();
        assert_eq!(limits.max_pages(), 200);

        // Degenerate but legal: a single page per search.
        let limits = SearchLimits::new(100, 100).unwrap();
        assert_eq!(limits.max_pages(), 1);
    }

    #[test]
    fn known_labels_resolve_to_presets() {
        let config = ServerConfig::resolve("gelbooru", None, None).unwrap();
        assert_eq!(config.limits.max_posts_per_search(), 20_000);
        assert_eq!(config.limits.max_posts_per_page(), 100);

        // Labels are case-insensitive and presets win over overrides.
        let config = ServerConfig::resolve("Rule34", Some(7), Some(3)).unwrap();
        assert_eq!(config.limits.max_posts_per_search(), 200_000);
        assert_eq!(config.limits.max_posts_per_page(), 1_000);
    }

    #[test]
    fn custom_servers_require_both_limits() {
        let url = "https://booru.example/index.php?page=dapi&s=post&q=index&json=1";

        assert_eq!(
            ServerConfig::resolve(url, None, None),
            Err(ConfigError::MissingLimits {
                server: url.to_string()
            })
        );
        assert_eq!(
            ServerConfig::resolve(url, Some(20_000), None),
            Err(ConfigError::MissingLimit {
                missing: "max-per-page"
            })
        );
        assert_eq!(
            ServerConfig::resolve(url, None, Some(100)),
            Err(ConfigError::MissingLimit {
                missing: "max-per-search"
            })
        );

        let config = ServerConfig::resolve(url, Some(20_000), Some(100)).unwrap();
        assert_eq!(config.post_list_url, url);
        assert_eq!(config.limits.max_pages(), 200);
    }
}
