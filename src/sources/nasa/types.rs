use serde::{Deserialize, Serialize};

/// NASA's Astronomy Picture of the Day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoOfTheDay {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    pub url: String,
    #[serde(default)]
    pub hdurl: Option<String>,
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    #[serde(other)]
    Other,
}

impl PhotoOfTheDay {
    /// URL to use as a backdrop, preferring the HD rendition.
    ///
    /// Only images qualify; videos and unknown media yield `None` so the
    /// display layer can fall back to its own background.
    pub fn backdrop_url(&self) -> Option<&str> {
        match self.media_type {
            Some(MediaType::Image) => Some(self.hdurl.as_deref().unwrap_or(&self.url)),
            _ => None,
        }
    }
}
