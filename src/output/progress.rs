use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::debug;

use super::styling::{heading, phase_done, phase_running};

/// Progress tracking for the two scan phases
pub struct PhaseProgress {
    pb: ProgressBar,
}

impl PhaseProgress {
    pub fn start_phase_1() -> Self {
        eprintln!("⚙️  {}", heading("Phases"));
        let pb = create_spinner(
            phase_running("Phase 1/2: Listing build configurations").to_string(),
        );
        Self { pb }
    }

    pub fn finish_phase_1_start_phase_2(self, build_type_count: usize) -> Self {
        self.pb.finish_with_message(
            phase_done(format!(
                "Phase 1/2: Found {build_type_count} build configurations ✓"
            ))
            .to_string(),
        );
        let pb = create_bar(
            build_type_count,
            phase_running("Phase 2/2: Scanning parameters").to_string(),
        );
        Self { pb }
    }

    /// Marks one more build configuration as being scanned.
    pub fn advance(&self, build_type_name: &str) {
        debug!("Scanning {build_type_name}");
        self.pb.inc(1);
    }

    pub fn finish_phase_2(self, file_path_count: usize) {
        self.pb.finish_and_clear();
        eprintln!(
            "  {}",
            phase_done(format!(
                "Phase 2/2: Scanned parameters, {file_path_count} template paths ✓"
            ))
        );
        eprintln!();
    }
}

fn create_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {msg} {spinner}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn create_bar(len: usize, message: String) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(message);
    pb
}
