use serde::{Deserialize, Serialize};
use vstore_codec::MEDIA_TYPE_JSON;

/// Settings fixed when a store handle is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Media type of stored documents.
    pub media_type: String,
    /// Write indented documents.
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            media_type: MEDIA_TYPE_JSON.to_string(),
            pretty: false,
        }
    }
}
