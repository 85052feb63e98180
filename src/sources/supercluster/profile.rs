use log::debug;
use scraper::Html;
use url::Url;

use super::extract::{extract_profile, Selectors};
use crate::astronaut::AstronautProfile;
use crate::error::{Result, WhosInSpaceError};
use crate::sources::http::{base_url, HttpFetcher};

/// Scrapes astronaut profile pages from Supercluster.
pub struct ProfileScraper {
    http: HttpFetcher,
    profile_base: Url,
    selectors: Selectors,
}

impl ProfileScraper {
    /// # Errors
    ///
    /// Returns a configuration error if `profile_url` is not a valid base URL.
    pub fn new(http: HttpFetcher, profile_url: &str) -> Result<Self> {
        Ok(Self {
            http,
            profile_base: base_url(profile_url)?,
            selectors: Selectors::new()?,
        })
    }

    /// Address of the profile page for a canonical name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownName` if the name does not yield a usable slug. The
    /// slug is always a single path segment below the profile base.
    pub fn profile_url(&self, name: &str) -> Result<Url> {
        let unknown = || WhosInSpaceError::UnknownName(name.to_string());

        let slug = slug(name);
        if slug.contains(['/', '?', '#', '\\', ':']) || slug.chars().all(|c| c == '.') {
            return Err(unknown());
        }

        let mut url = self.profile_base.clone();
        url.path_segments_mut()
            .map_err(|()| unknown())?
            .pop_if_empty()
            .push(&slug);
        Ok(url)
    }

    /// Fetches one profile page, parses it once and extracts every field.
    ///
    /// # Errors
    ///
    /// - `UnknownName` if the name has no usable slug or the page is a 404
    /// - network errors from the page fetch
    /// - `Parse` if any field is missing or malformed on the page
    pub async fn scrape_profile(&self, name: &str, craft: &str) -> Result<AstronautProfile> {
        let url = self.profile_url(name)?;

        let body = self.http.get_text(&url).await.map_err(|e| match e {
            WhosInSpaceError::HttpStatus { status: 404, .. } => {
                WhosInSpaceError::UnknownName(name.to_string())
            }
            other => other,
        })?;

        let document = Html::parse_document(&body);
        let profile = extract_profile(&document, &self.selectors, name, craft).await?;
        debug!("Scraped profile for {name} from {url}");

        Ok(profile)
    }
}

/// Lowercased name with spaces replaced by hyphens, e.g. "Jane Doe" -> "jane-doe".
pub fn slug(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}
