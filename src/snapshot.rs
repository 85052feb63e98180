use std::fs;
use std::path::Path;

use log::info;

use crate::astronaut::AstronautProfile;
use crate::error::Result;

/// Serializes the result list in the snapshot format: a JSON array of
/// profiles with camelCase keys.
pub fn to_json(profiles: &[AstronautProfile], pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(profiles)?
    } else {
        serde_json::to_string(profiles)?
    };
    Ok(json)
}

pub fn from_json(json: &str) -> Result<Vec<AstronautProfile>> {
    Ok(serde_json::from_str(json)?)
}

pub fn write(path: &Path, profiles: &[AstronautProfile], pretty: bool) -> Result<()> {
    fs::write(path, to_json(profiles, pretty)?)?;
    info!("Snapshot of {} profiles written to: {}", profiles.len(), path.display());
    Ok(())
}

pub fn read(path: &Path) -> Result<Vec<AstronautProfile>> {
    let profiles = from_json(&fs::read_to_string(path)?)?;
    info!("Loaded {} profiles from: {}", profiles.len(), path.display());
    Ok(profiles)
}
