use tracing::debug;
use url::Url;
use vidra_net::Net;

use crate::error::{ManifestError, ManifestResult};
use crate::model::{Manifest, ManifestDoc};

/// Fetches and validates manifests relative to a server base URL.
pub struct ManifestLoader<N> {
    net: N,
    base: Url,
}

impl<N: Net> ManifestLoader<N> {
    pub fn new(net: N, base: Url) -> Self {
        Self { net, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Fetch `{base}/videos/{video_id}/manifest.json` and parse it.
    pub async fn load(&self, video_id: &str) -> ManifestResult<Manifest> {
        let url = self.base.join(&format!("videos/{video_id}/manifest.json"))?;

        let bytes = self
            .net
            .get_bytes(url.clone(), None)
            .await
            .map_err(|source| ManifestError::Unavailable {
                url: url.clone(),
                source,
            })?;

        let doc: ManifestDoc = serde_json::from_slice(&bytes)?;
        if doc.resolutions.is_empty() {
            return Err(ManifestError::NoRepresentations);
        }

        debug!(
            %url,
            representations = doc.resolutions.len(),
            audio_chunks = doc.audio.chunk_count,
            "manifest loaded"
        );
        Ok(Manifest::new(doc, url))
    }
}
