use std::collections::BTreeMap;

use serde::Deserialize;
use url::Url;

use crate::error::ManifestResult;

const DEFAULT_SEGMENT_EXT: &str = "m4s";

/// One video representation as published in the manifest.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RepresentationInfo {
    pub bitrate_kbps: u64,
    /// Directory holding this representation's segments, relative to the
    /// manifest URL (or absolute on the same origin).
    pub path: String,
    pub chunk_count: u32,
}

/// The single audio track. Audio has no bitrate ladder.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct AudioTrack {
    pub path: String,
    pub chunk_count: u32,
}

/// The manifest document as it appears on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct ManifestDoc {
    /// `BTreeMap` keeps label iteration deterministic.
    pub resolutions: BTreeMap<String, RepresentationInfo>,
    pub audio: AudioTrack,
    /// Init-segment file name, shared by all representations and audio.
    pub init_name: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_mime: Option<String>,
    #[serde(default)]
    pub audio_mime: Option<String>,
    /// Legacy single-mime field, video only.
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub chunk_seconds: Option<f64>,
    /// Segment file-name pattern; `{i}` is replaced with the zero-padded
    /// index. May carry its own extension (`chunk_{i}.m4s`). Defaults to
    /// `chunk_{i}.m4s`-style naming derived from `init_name`.
    #[serde(default)]
    pub chunk_name_template: Option<String>,
}

/// A loaded manifest bound to the URL it was fetched from.
///
/// Immutable after load. All segment URLs are derived here so the rest of
/// the player never does string surgery on paths.
#[derive(Clone, Debug)]
pub struct Manifest {
    doc: ManifestDoc,
    url: Url,
}

impl Manifest {
    pub fn new(doc: ManifestDoc, url: Url) -> Self {
        Self { doc, url }
    }

    pub fn doc(&self) -> &ManifestDoc {
        &self.doc
    }

    /// The URL this manifest was fetched from; segment paths resolve
    /// against it.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn resolution_labels(&self) -> impl Iterator<Item = &str> {
        self.doc.resolutions.keys().map(String::as_str)
    }

    pub fn representation(&self, label: &str) -> Option<&RepresentationInfo> {
        self.doc.resolutions.get(label)
    }

    pub fn audio(&self) -> &AudioTrack {
        &self.doc.audio
    }

    /// Map a requested label onto one the manifest actually has. Unknown
    /// labels fall back to the first label in order.
    ///
    /// Callers must not invoke this on an empty manifest; the loader
    /// rejects those at load time.
    pub fn clamp<'a>(&'a self, label: &'a str) -> &'a str {
        if self.doc.resolutions.contains_key(label) {
            label
        } else {
            self.doc
                .resolutions
                .keys()
                .next()
                .map(String::as_str)
                .unwrap_or(label)
        }
    }

    /// Segment file extension, taken from `init_name`.
    pub fn segment_ext(&self) -> &str {
        self.doc
            .init_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_SEGMENT_EXT)
    }

    pub fn init_url(&self, label: &str) -> ManifestResult<Url> {
        let rep = self.require(label)?;
        self.join(&rep.path, &self.doc.init_name)
    }

    pub fn audio_init_url(&self) -> ManifestResult<Url> {
        self.join(&self.doc.audio.path, &self.doc.init_name)
    }

    /// Media segment URL for 1-based `index` under representation `label`.
    pub fn media_url(&self, label: &str, index: u32) -> ManifestResult<Url> {
        let rep = self.require(label)?;
        self.join(&rep.path, &self.chunk_name(index))
    }

    pub fn audio_media_url(&self, index: u32) -> ManifestResult<Url> {
        self.join(&self.doc.audio.path, &self.chunk_name(index))
    }

    fn require(&self, label: &str) -> ManifestResult<&RepresentationInfo> {
        self.representation(label)
            .ok_or_else(|| crate::ManifestError::UnknownLabel {
                label: label.to_owned(),
            })
    }

    fn chunk_name(&self, index: u32) -> String {
        match &self.doc.chunk_name_template {
            Some(template) => {
                let name = template.replace("{i}", &format!("{index:05}"));
                if name.contains('.') {
                    name
                } else {
                    format!("{name}.{}", self.segment_ext())
                }
            }
            None => format!("chunk_{index:05}.{}", self.segment_ext()),
        }
    }

    fn join(&self, dir: &str, file: &str) -> ManifestResult<Url> {
        let dir = dir.trim_end_matches('/');
        Ok(self.url.join(&format!("{dir}/{file}"))?)
    }
}
