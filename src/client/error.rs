use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Any network-level failure while talking to the imageboard,
    /// including non-success HTTP statuses and undecodable bodies.
    #[error("Connection Error")]
    ConnectionError(#[from] reqwest::Error),

    /// The server answered with something that is not a DAPI post list.
    #[error("Imageboard returned an invalid response")]
    InvalidServerResponse,
}
