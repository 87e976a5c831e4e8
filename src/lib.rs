//! # Booru Deep Search
//!
//! booru_deep_search splits a tag search that matches more posts than an
//! imageboard (booru) lets you page through into a list of smaller
//! searches, each constrained to a post-ID window sized to fit the site's
//! pagination cap.
//!
//! Gelbooru-compatible APIs never reveal a total result count and stop
//! paginating past a fixed offset, so a big search simply cannot be
//! retrieved in one go. The partitioner infers window boundaries from a
//! handful of bounded page probes instead, then renders one
//! ready-to-paste search string per window.
pub mod client;
pub mod config;
mod macros;
pub mod search;

// Export the probe client surface
pub use client::models::Post;
pub use client::{GelbooruClient, RetryPolicy, SearchClient};

// Export server presets and limit configuration
pub use config::{SearchLimits, ServerConfig, DEFAULT_SERVERS};

// Export the partitioning core
pub use search::query::{IdWindow, Partition, TagQuery};
pub use search::SearchPartitioner;
