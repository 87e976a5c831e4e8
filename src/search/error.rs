use thiserror::Error;

use crate::client::error::ClientError;

#[derive(Error, Debug)]
pub enum DeepSearchError {
    /// The caller's tags already carry one of the sort directives the
    /// partitioner needs to inject itself.
    #[error("Tags must not contain \"{tag}\", sort:id:* is used internally")]
    ForbiddenTags { tag: String },

    /// The search matched nothing at all. Distinct from running out of
    /// results mid-partition, which is an expected termination signal.
    #[error("Failed to find any post for search \"{tags}\"")]
    EmptySearch { tags: String },

    /// A page earlier probes guaranteed to be populated came back empty;
    /// the result set changed while the partition was being computed.
    #[error("Search results changed while partitioning")]
    InconsistentResults,

    #[error(transparent)]
    Client(#[from] ClientError),
}
