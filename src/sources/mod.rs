pub mod http;
pub mod nasa;
pub mod open_notify;
pub mod supercluster;

pub use http::HttpFetcher;
pub use nasa::PhotoOfTheDayClient;
pub use open_notify::{NameNormalizer, RosterFetcher};
pub use supercluster::ProfileScraper;
