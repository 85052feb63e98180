mod extract;
mod profile;

pub use profile::ProfileScraper;
