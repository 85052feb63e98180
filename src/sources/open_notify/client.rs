use log::{debug, info};
use url::Url;

use super::names::NameNormalizer;
use super::types::AstronautsResponse;
use crate::astronaut::RosterEntry;
use crate::error::{Result, WhosInSpaceError};
use crate::sources::http::{base_url, HttpFetcher};

const ASTROS_PATH: &str = "astros.json";

/// Fetches the list of people currently in space from Open Notify.
pub struct RosterFetcher {
    http: HttpFetcher,
    astros_url: Url,
    names: NameNormalizer,
}

impl RosterFetcher {
    /// # Errors
    ///
    /// Returns a configuration error if `roster_url` is not a valid base URL.
    pub fn new(http: HttpFetcher, roster_url: &str, names: NameNormalizer) -> Result<Self> {
        let astros_url = base_url(roster_url)?
            .join(ASTROS_PATH)
            .map_err(|e| WhosInSpaceError::Config(format!("Invalid roster URL: {e}")))?;

        Ok(Self {
            http,
            astros_url,
            names,
        })
    }

    /// Fetches the roster once, correcting each name against the alias table.
    ///
    /// # Errors
    ///
    /// Any transport failure, non-success status or undecodable body is
    /// returned as a network error; this method never degrades to an empty
    /// roster.
    pub async fn fetch_roster(&self) -> Result<Vec<RosterEntry>> {
        let response: AstronautsResponse = self.http.get_json(&self.astros_url).await?;

        if let Some(message) = &response.message {
            debug!("Roster API message: {message}");
        }
        if response.number as usize != response.people.len() {
            debug!(
                "Roster reports {} people but lists {}",
                response.number,
                response.people.len()
            );
        }

        let entries: Vec<RosterEntry> = response
            .people
            .into_iter()
            .map(|person| RosterEntry {
                name: self.names.normalize(&person.name),
                craft: person.craft,
            })
            .collect();

        info!("Roster lists {} people in space", entries.len());

        Ok(entries)
    }
}
