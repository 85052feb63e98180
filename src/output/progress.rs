use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::watch;

use super::styling::{bright, bright_green, bright_red, bright_yellow};
use crate::pipeline::PipelineState;

/// Spinner for the phase currently running, plus the message it ends with.
struct Phase {
    pb: ProgressBar,
    done_message: String,
}

/// Progress tracking for the three pipeline phases
struct PhaseProgress {
    current: Option<Phase>,
}

impl PhaseProgress {
    fn new() -> Self {
        eprintln!("{}  {}", bright("🛰️"), bright("Phases").underlined());
        Self { current: None }
    }

    fn start(&mut self, message: String, done_message: String) {
        self.finish_current();
        self.current = Some(Phase {
            pb: create_spinner(bright_yellow(message).to_string()),
            done_message,
        });
    }

    fn finish_current(&mut self) {
        if let Some(phase) = self.current.take() {
            phase
                .pb
                .finish_with_message(bright_green(phase.done_message).to_string());
        }
    }

    fn fail(&mut self) {
        if let Some(phase) = self.current.take() {
            phase
                .pb
                .abandon_with_message(bright_red("Run failed ✗").to_string());
        }
    }

    /// Applies one observed state; returns `true` once the run has ended.
    fn apply(&mut self, state: PipelineState) -> bool {
        match state {
            PipelineState::Idle => false,
            PipelineState::FetchingRoster => {
                self.start(
                    "Phase 1/3: Fetching roster".to_string(),
                    "Phase 1/3: Fetched roster ✓".to_string(),
                );
                false
            }
            PipelineState::ScrapingProfiles { total } => {
                self.start(
                    format!("Phase 2/3: Scraping {total} profiles"),
                    format!("Phase 2/3: Scraped {total} profiles ✓"),
                );
                false
            }
            PipelineState::Aggregating => {
                self.start(
                    "Phase 3/3: Merging results".to_string(),
                    "Phase 3/3: Results merged ✓".to_string(),
                );
                false
            }
            PipelineState::Done => {
                self.finish_current();
                eprintln!();
                true
            }
            PipelineState::Failed => {
                self.fail();
                eprintln!();
                true
            }
        }
    }
}

/// Renders spinners for a pipeline run until it reaches `Done` or `Failed`
/// or the pipeline is dropped.
pub async fn follow_pipeline(mut states: watch::Receiver<PipelineState>) {
    let mut progress = PhaseProgress::new();

    loop {
        let state = *states.borrow_and_update();
        if progress.apply(state) {
            return;
        }
        if states.changed().await.is_err() {
            progress.fail();
            return;
        }
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
