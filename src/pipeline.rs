use futures::future::join_all;
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::astronaut::{AstronautProfile, RosterEntry};
use crate::config::Config;
use crate::error::{Result, WhosInSpaceError};
use crate::sources::{HttpFetcher, NameNormalizer, ProfileScraper, RosterFetcher};

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    FetchingRoster,
    ScrapingProfiles { total: usize },
    Aggregating,
    Done,
    Failed,
}

/// A roster entry whose profile could not be built.
#[derive(Debug)]
pub struct ProfileFailure {
    pub entry: RosterEntry,
    pub error: WhosInSpaceError,
}

/// Result of a completed run: the sorted profiles plus every dropped entry.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub profiles: Vec<AstronautProfile>,
    pub failures: Vec<ProfileFailure>,
}

/// Fetches the roster, scrapes one profile per person, and merges the
/// results into a single list sorted by name.
///
/// A roster failure fails the run. A profile failure drops only that
/// profile; it is reported in [`PipelineOutcome::failures`].
pub struct Pipeline {
    roster: RosterFetcher,
    scraper: ProfileScraper,
    cancel: CancellationToken,
    state: watch::Sender<PipelineState>,
}

impl Pipeline {
    pub fn new(roster: RosterFetcher, scraper: ProfileScraper, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            roster,
            scraper,
            cancel,
            state,
        }
    }

    /// Wires a pipeline from configuration. Both sources share one
    /// [`HttpFetcher`], so the request limit applies to the whole run.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid URLs, alias tables or
    /// request limits.
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self> {
        let http = HttpFetcher::new(&config.fetch, cancel.clone())?;
        let names = NameNormalizer::with_extra_aliases(&config.aliases)?;
        debug!("Using {} name aliases", names.alias_count());

        let roster = RosterFetcher::new(http.clone(), &config.sources.roster_url, names)?;
        let scraper = ProfileScraper::new(http, &config.sources.profile_url)?;

        Ok(Self::new(roster, scraper, cancel))
    }

    /// Watch the run's state transitions.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Runs the pipeline once.
    ///
    /// The returned future resolves only after every profile task has
    /// settled, and is the single completion signal of the run.
    ///
    /// # Errors
    ///
    /// Returns the roster error if the roster cannot be fetched, or
    /// `Cancelled` if the run was cancelled before it completed.
    pub async fn run(&self) -> Result<PipelineOutcome> {
        self.transition(PipelineState::FetchingRoster);
        let roster = match self.roster.fetch_roster().await {
            Ok(roster) => roster,
            Err(e) => {
                self.transition(PipelineState::Failed);
                return Err(e);
            }
        };

        self.transition(PipelineState::ScrapingProfiles {
            total: roster.len(),
        });
        let results = self.scrape_all(roster).await;

        if self.cancel.is_cancelled() {
            self.transition(PipelineState::Failed);
            return Err(WhosInSpaceError::Cancelled("pipeline run".to_string()));
        }

        self.transition(PipelineState::Aggregating);
        let outcome = aggregate(results);
        info!(
            "Collected {} profiles ({} dropped)",
            outcome.profiles.len(),
            outcome.failures.len()
        );

        self.transition(PipelineState::Done);
        Ok(outcome)
    }

    /// One task per roster entry; each task hands its own result back.
    async fn scrape_all(
        &self,
        roster: Vec<RosterEntry>,
    ) -> Vec<(RosterEntry, Result<AstronautProfile>)> {
        let tasks = roster.into_iter().map(|entry| async move {
            let result = self.scraper.scrape_profile(&entry.name, &entry.craft).await;
            (entry, result)
        });

        join_all(tasks).await
    }

    fn transition(&self, next: PipelineState) {
        debug!("Pipeline state: {next:?}");
        self.state.send_replace(next);
    }
}

/// Splits per-entry results into profiles and failures and sorts the
/// profiles by name, so the order never depends on completion order.
pub fn aggregate(results: Vec<(RosterEntry, Result<AstronautProfile>)>) -> PipelineOutcome {
    let mut outcome = PipelineOutcome::default();

    for (entry, result) in results {
        match result {
            Ok(profile) => outcome.profiles.push(profile),
            Err(error) => {
                warn!("Dropping profile for {}: {error}", entry.name);
                outcome.failures.push(ProfileFailure { entry, error });
            }
        }
    }

    outcome
        .profiles
        .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.craft.cmp(&b.craft)));

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronaut::OccupationOrRank;
    use crate::error::ErrorKind;
    use crate::sources::http::unresponsive_server;
    use std::time::Duration;

    const JANE_DOE: &str = include_str!("sources/supercluster/fixtures/jane-doe.html");

    fn entry(name: &str) -> RosterEntry {
        RosterEntry {
            name: name.to_string(),
            craft: "ISS".to_string(),
        }
    }

    fn profile(name: &str) -> AstronautProfile {
        AstronautProfile {
            name: name.to_string(),
            craft: "ISS".to_string(),
            profile_image_url: String::new(),
            birthday: None,
            flag_image_url: String::new(),
            gender: String::new(),
            occupation_or_rank: OccupationOrRank::default(),
            number_of_missions: 1,
            days_in_space: 1,
            profile_excerpt: String::new(),
        }
    }

    fn config_for(server: &mockito::ServerGuard, max_concurrent_requests: usize) -> Config {
        let mut config = Config::default();
        config.sources.roster_url = server.url();
        config.sources.profile_url = format!("{}/astronauts/", server.url());
        config.fetch.timeout_secs = 5;
        config.fetch.max_concurrent_requests = max_concurrent_requests;
        config
    }

    fn page_for(name: &str) -> String {
        JANE_DOE.replace("Jane Doe", name)
    }

    #[test]
    fn test_aggregate_sorts_regardless_of_completion_order() {
        let names = ["Sergey Prokopyev", "Frank Rubio", "Jane Doe", "Cai Xuzhe"];
        let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];

        for order in orders {
            let results = order
                .iter()
                .map(|&i| (entry(names[i]), Ok(profile(names[i]))))
                .collect();
            let outcome = aggregate(results);
            let sorted: Vec<_> = outcome.profiles.iter().map(|p| p.name.as_str()).collect();
            assert_eq!(
                sorted,
                ["Cai Xuzhe", "Frank Rubio", "Jane Doe", "Sergey Prokopyev"]
            );
        }
    }

    #[test]
    fn test_aggregate_separates_failures() {
        let results = vec![
            (entry("B"), Ok(profile("B"))),
            (
                entry("C"),
                Err(WhosInSpaceError::parse("missions", "'N/A' is not a count")),
            ),
            (entry("A"), Ok(profile("A"))),
        ];

        let outcome = aggregate(results);
        assert_eq!(outcome.profiles.len(), 2);
        assert_eq!(outcome.profiles[0].name, "A");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].entry.name, "C");
        assert_eq!(outcome.failures[0].error.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_single_astronaut_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/astros.json")
            .with_status(200)
            .with_body(r#"{"number": 1, "people": [{"name": "Jane Doe", "craft": "ISS"}]}"#)
            .create_async()
            .await;
        let page = server
            .mock("GET", "/astronauts/jane-doe")
            .with_status(200)
            .with_body(JANE_DOE)
            .expect(1)
            .create_async()
            .await;

        let pipeline =
            Pipeline::from_config(&config_for(&server, 4), CancellationToken::new()).unwrap();
        let states = pipeline.subscribe();
        let outcome = pipeline.run().await.unwrap();

        assert_eq!(outcome.profiles.len(), 1);
        assert!(outcome.failures.is_empty());
        let jane = &outcome.profiles[0];
        assert_eq!(jane.name, "Jane Doe");
        assert_eq!(jane.craft, "ISS");
        assert_eq!(jane.number_of_missions, 3);
        assert_eq!(jane.days_in_space, 200);
        assert_eq!(jane.birthday, None);
        assert_eq!(*states.borrow(), PipelineState::Done);
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_full_roster_is_scraped_and_sorted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/astros.json")
            .with_status(200)
            .with_body(
                r#"{"number": 3, "people": [
                    {"name": "Sergey Prokopyev", "craft": "ISS"},
                    {"name": "Bob Hines", "craft": "ISS"},
                    {"name": "Cai Xuzhe", "craft": "Tiangong"}
                ]}"#,
            )
            .create_async()
            .await;
        let mut pages = Vec::new();
        for (slug, name) in [
            ("sergey-prokopyev", "Sergey Prokopyev"),
            ("robert-hines", "Robert Hines"),
            ("cai-xuzhe", "Cai Xuzhe"),
        ] {
            let page = server
                .mock("GET", format!("/astronauts/{slug}").as_str())
                .with_status(200)
                .with_body(page_for(name))
                .expect(1)
                .create_async()
                .await;
            pages.push(page);
        }

        // A single permit forces every request through one at a time
        let pipeline =
            Pipeline::from_config(&config_for(&server, 1), CancellationToken::new()).unwrap();
        let outcome = pipeline.run().await.unwrap();

        let names: Vec<_> = outcome.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cai Xuzhe", "Robert Hines", "Sergey Prokopyev"]);
        assert_eq!(outcome.profiles[0].craft, "Tiangong");
        assert!(outcome.failures.is_empty());
        for page in pages {
            page.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_failed_profile_is_dropped_and_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/astros.json")
            .with_status(200)
            .with_body(
                r#"{"number": 2, "people": [
                    {"name": "Jane Doe", "craft": "ISS"},
                    {"name": "John Roe", "craft": "ISS"}
                ]}"#,
            )
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/astronauts/jane-doe")
            .with_status(200)
            .with_body(JANE_DOE)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/astronauts/john-roe")
            .with_status(200)
            .with_body(page_for("John Roe").replace(
                r#"<div class="astronaut_page__big_stats">3</div>"#,
                r#"<div class="astronaut_page__big_stats">N/A</div>"#,
            ))
            .create_async()
            .await;

        let pipeline =
            Pipeline::from_config(&config_for(&server, 4), CancellationToken::new()).unwrap();
        let outcome = pipeline.run().await.unwrap();

        assert_eq!(outcome.profiles.len(), 1);
        assert_eq!(outcome.profiles[0].name, "Jane Doe");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].entry.name, "John Roe");
        assert_eq!(outcome.failures[0].error.kind(), ErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_roster_failure_fails_the_run() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/astros.json")
            .with_status(503)
            .create_async()
            .await;

        let pipeline =
            Pipeline::from_config(&config_for(&server, 4), CancellationToken::new()).unwrap();
        let states = pipeline.subscribe();
        let err = pipeline.run().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(*states.borrow(), PipelineState::Failed);
    }

    #[tokio::test]
    async fn test_empty_roster_is_a_successful_empty_run() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/astros.json")
            .with_status(200)
            .with_body(r#"{"number": 0, "people": []}"#)
            .create_async()
            .await;

        let pipeline =
            Pipeline::from_config(&config_for(&server, 4), CancellationToken::new()).unwrap();
        let outcome = pipeline.run().await.unwrap();

        assert!(outcome.profiles.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_run_fails() {
        let server = mockito::Server::new_async().await;
        let cancel = CancellationToken::new();
        let pipeline = Pipeline::from_config(&config_for(&server, 4), cancel.clone()).unwrap();
        cancel.cancel();

        let err = pipeline.run().await.unwrap_err();
        assert!(matches!(err, WhosInSpaceError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_cancel_during_profile_scrape_fails_run() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/astros.json")
            .with_status(200)
            .with_body(r#"{"number": 1, "people": [{"name": "Jane Doe", "craft": "ISS"}]}"#)
            .create_async()
            .await;

        let mut config = config_for(&server, 4);
        config.fetch.timeout_secs = 30;
        config.sources.profile_url = format!("{}/astronauts/", unresponsive_server().await);

        let cancel = CancellationToken::new();
        let pipeline = Pipeline::from_config(&config, cancel.clone()).unwrap();
        let mut states = pipeline.subscribe();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let scraping = matches!(
                    *states.borrow_and_update(),
                    PipelineState::ScrapingProfiles { .. }
                );
                if scraping {
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    canceller.cancel();
                    break;
                }
            }
        });

        let states = pipeline.subscribe();
        let err = tokio::time::timeout(Duration::from_secs(5), pipeline.run())
            .await
            .expect("cancellation should end the run")
            .unwrap_err();

        assert!(matches!(err, WhosInSpaceError::Cancelled(_)));
        assert_eq!(*states.borrow(), PipelineState::Failed);
    }

    #[test]
    fn test_chained_config_aliases_are_rejected() {
        let mut config = Config::default();
        config
            .aliases
            .insert("Robert Hines".to_string(), "Bob Hines Sr.".to_string());

        let result = Pipeline::from_config(&config, CancellationToken::new());
        assert!(matches!(result, Err(WhosInSpaceError::Config(_))));
    }
}
