use serde::Deserialize;

/// Response body of Open Notify's `astros.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct AstronautsResponse {
    pub number: u32,
    pub people: Vec<Person>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub name: String,
    pub craft: String,
}
