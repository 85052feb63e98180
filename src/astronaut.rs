use serde::{Deserialize, Serialize};

/// One person reported by the roster API, after name correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub craft: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccupationOrRank {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
}

/// A fully scraped astronaut profile.
///
/// Field names serialize in camelCase; this is the snapshot format written by
/// `fetch --output` and read back by `replay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstronautProfile {
    pub name: String,
    pub craft: String,
    pub profile_image_url: String,
    /// `None` when the profile site reports "Birthdate Unknown".
    pub birthday: Option<String>,
    pub flag_image_url: String,
    pub gender: String,
    pub occupation_or_rank: OccupationOrRank,
    pub number_of_missions: u32,
    pub days_in_space: u32,
    pub profile_excerpt: String,
}
