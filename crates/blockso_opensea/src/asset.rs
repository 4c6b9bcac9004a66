//! Asset document returned by `GET /asset/{contract}/{token_id}/`.

use serde::{Deserialize, Serialize};

/// The fields of an Opensea asset that Blockso displays.
///
/// Opensea returns many more fields; unknown ones are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, derive_getters::Getters)]
pub struct Asset {
    /// Token id within its contract
    #[serde(default)]
    token_id: Option<String>,
    /// Display name
    #[serde(default)]
    name: Option<String>,
    /// Full-size image
    #[serde(default)]
    image_url: Option<String>,
    /// Thumbnail image used in post galleries
    #[serde(default)]
    image_thumbnail_url: Option<String>,
    /// Asset page on opensea.io
    #[serde(default)]
    permalink: Option<String>,
}
