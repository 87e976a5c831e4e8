use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// One of the search limits was set to zero.
    #[error("{limit} should be greater than 0")]
    ZeroLimit { limit: &'static str },

    /// The page size exceeds the pagination cap, which would make every
    /// window computation nonsensical.
    #[error(
        "max_posts_per_page ({per_page}) cannot be bigger than max_posts_per_search ({per_search})"
    )]
    PageLimitTooBig { per_page: u64, per_search: u64 },

    /// A custom API was selected but one of its limits was left out.
    #[error("When using a custom booru API, --{missing} should be specified")]
    MissingLimit { missing: &'static str },

    /// A custom API was selected without supplying any limits.
    #[error(
        "\"{server}\" is not a known server, so --max-per-search and --max-per-page should be specified"
    )]
    MissingLimits { server: String },
}
