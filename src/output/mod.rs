mod exports;
mod progress;
mod styling;
mod summary;
mod tables;

pub use exports::{render_path_listing, render_report};
pub use progress::PhaseProgress;

use styling::{banner_title, muted};

/// Prints the `cfpaths` banner to stderr.
///
/// Displays the tool name, version, and description at the start of execution.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        banner_title("🗺️  cfpaths"),
        muted(env!("CARGO_PKG_VERSION")),
        muted("CloudFormation template usage across TeamCity")
    );
}
