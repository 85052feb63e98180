mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::follow_pipeline;
pub use styling::{bright_red, dim, magenta_bold};
pub use summary::{print_astronauts, print_backdrop, print_failures};

/// Prints the whosinspace banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🚀 whosinspace"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Who is in space right now?")
    );
}
