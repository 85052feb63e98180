mod client;
mod types;

pub use client::PhotoOfTheDayClient;
pub use types::PhotoOfTheDay;
