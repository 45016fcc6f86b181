use url::Url;
use vidra_net::NetError;

pub type ManifestResult<T> = Result<T, ManifestError>;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest document could not be fetched.
    #[error("manifest unavailable at {url}: {source}")]
    Unavailable {
        url: Url,
        #[source]
        source: NetError,
    },

    /// The document was fetched but is not a valid manifest.
    #[error("manifest parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A structurally valid manifest with an empty resolution map.
    #[error("manifest lists no representations")]
    NoRepresentations,

    /// A segment path in the manifest does not resolve to a URL.
    #[error("invalid media url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A URL was requested for a label the manifest does not carry.
    #[error("unknown representation label {label:?}")]
    UnknownLabel { label: String },
}
