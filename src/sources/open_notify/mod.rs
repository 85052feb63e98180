mod client;
mod names;
mod types;

pub use client::RosterFetcher;
pub use names::NameNormalizer;
