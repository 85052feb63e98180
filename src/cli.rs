use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::astronaut::AstronautProfile;
use crate::config::{Config, OutputFormat};
use crate::output;
use crate::pipeline::Pipeline;
use crate::snapshot;
use crate::sources::{HttpFetcher, NameNormalizer, PhotoOfTheDayClient, ProfileScraper};

#[derive(Parser)]
#[command(name = "whosinspace")]
#[command(author, version, about = "Who is in space right now?", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the result list as a JSON snapshot to this path
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the roster and every profile
    Fetch {
        /// Maximum number of requests in flight at once
        #[arg(short = 'j', long)]
        max_concurrent: Option<usize>,

        /// Per-request timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Scrape a single profile by name
    Profile {
        name: String,

        #[arg(long, default_value = "ISS")]
        craft: String,
    },
    /// Print a previously written snapshot without touching the network
    Replay { snapshot: PathBuf },
    /// Show NASA's Astronomy Picture of the Day
    Backdrop {
        #[arg(long, env = "NASA_API_KEY")]
        api_key: Option<String>,
    },
}

impl Cli {
    fn format(&self, config: &Config) -> OutputFormat {
        self.format.unwrap_or(config.output.format)
    }

    fn pretty(&self, config: &Config) -> bool {
        self.pretty || config.output.pretty
    }

    /// Writes the snapshot if requested, then prints in the chosen format.
    fn emit(&self, config: &Config, profiles: &[AstronautProfile]) -> Result<()> {
        let pretty = self.pretty(config);

        if let Some(path) = &self.output {
            snapshot::write(path, profiles, pretty)
                .with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
        }

        match self.format(config) {
            OutputFormat::Table => output::print_astronauts(profiles),
            OutputFormat::Json if self.output.is_none() => {
                println!("{}", snapshot::to_json(profiles, pretty)?);
            }
            OutputFormat::Json => {}
        }

        Ok(())
    }

    async fn execute_fetch(
        &self,
        mut config: Config,
        max_concurrent: Option<usize>,
        timeout: Option<u64>,
    ) -> Result<()> {
        if let Some(max_concurrent) = max_concurrent {
            config.fetch.max_concurrent_requests = max_concurrent;
        }
        if let Some(timeout) = timeout {
            config.fetch.timeout_secs = timeout;
        }

        let cancel = cancel_on_ctrl_c();
        let pipeline = Pipeline::from_config(&config, cancel)?;

        let progress = tokio::spawn(output::follow_pipeline(pipeline.subscribe()));
        let result = pipeline.run().await;
        drop(pipeline);
        finish_progress(progress).await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{}", output::bright_red("Loading failed."));
                return Err(e).context("Could not load the list of people in space");
            }
        };

        if self.format(&config) == OutputFormat::Table {
            output::print_failures(&outcome.failures);
        } else {
            for failure in &outcome.failures {
                warn!("Dropped {}: {}", failure.entry.name, failure.error);
            }
        }

        self.emit(&config, &outcome.profiles)
    }

    async fn execute_profile(&self, config: Config, name: &str, craft: &str) -> Result<()> {
        let http = HttpFetcher::new(&config.fetch, cancel_on_ctrl_c())?;
        let names = NameNormalizer::with_extra_aliases(&config.aliases)?;
        let scraper = ProfileScraper::new(http, &config.sources.profile_url)?;

        let canonical = names.normalize(name);
        info!("Scraping profile for {canonical}");
        let profile = scraper
            .scrape_profile(&canonical, craft)
            .await
            .with_context(|| format!("Could not load the profile of {canonical}"))?;

        self.emit(&config, &[profile])
    }

    fn execute_replay(&self, config: &Config, path: &Path) -> Result<()> {
        let profiles = snapshot::read(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;

        self.emit(config, &profiles)
    }

    async fn execute_backdrop(&self, config: Config, api_key: Option<&str>) -> Result<()> {
        let http = HttpFetcher::new(&config.fetch, cancel_on_ctrl_c())?;
        let api_key = api_key.unwrap_or_else(|| config.nasa_api_key());
        let client = PhotoOfTheDayClient::new(http, &config.sources.nasa_url, api_key)?;

        let photo = client
            .fetch_photo_of_the_day()
            .await
            .context("Could not load the photo of the day")?;

        match self.format(&config) {
            OutputFormat::Table => output::print_backdrop(&photo),
            OutputFormat::Json => {
                let json = if self.pretty(&config) {
                    serde_json::to_string_pretty(&photo)?
                } else {
                    serde_json::to_string(&photo)?
                };
                println!("{json}");
            }
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Fetch {
                max_concurrent,
                timeout,
            } => self.execute_fetch(config, *max_concurrent, *timeout).await,
            Commands::Profile { name, craft } => self.execute_profile(config, name, craft).await,
            Commands::Replay { snapshot } => self.execute_replay(&config, snapshot),
            Commands::Backdrop { api_key } => {
                self.execute_backdrop(config, api_key.as_deref()).await
            }
        }
    }
}

/// Waits for the progress follower; returns whether it ended cleanly.
async fn finish_progress(progress: JoinHandle<()>) -> bool {
    match progress.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Progress display stopped unexpectedly: {e}");
            false
        }
    }
}

/// A token that is cancelled when the user presses Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            token.cancel();
        }
    });
    cancel
}
