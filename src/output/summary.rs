use std::fmt::Write;

use crate::usage::TemplateUsage;

use super::styling::{failure_note, heading, muted, template_path};

/// Renders the human-readable mapping of template paths to jobs.
///
/// Layout:
///
/// ```text
/// Mapping of '<parameter>' to jobs:
///
/// CloudFormation file path: templates/app.yaml
/// Used in jobs:
///   - Root / Infra / Deploy App
/// ```
///
/// The header is printed even when nothing was found. A footer notes failed lookups
/// so a partial scan is not mistaken for a complete one.
pub fn render_summary(usage: &TemplateUsage) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{}",
        heading(format!("Mapping of '{}' to jobs:", usage.parameter))
    );

    for (file_path, jobs) in &usage.file_paths {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "{} {}",
            muted("CloudFormation file path:"),
            template_path(file_path)
        );
        let _ = writeln!(output, "{}", muted("Used in jobs:"));
        for job in jobs {
            let _ = writeln!(output, "  - {job}");
        }
    }

    push_failure_note(&mut output, usage);
    output
}

/// Renders each distinct template path once, in discovery order.
pub fn render_unique_paths(usage: &TemplateUsage) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "{}",
        heading(format!(
            "Unique '{}' values across all builds:",
            usage.parameter
        ))
    );

    for file_path in usage.file_paths.keys() {
        let _ = writeln!(output, "{file_path}");
    }

    push_failure_note(&mut output, usage);
    output
}

fn push_failure_note(output: &mut String, usage: &TemplateUsage) {
    if usage.failed_lookups == 0 {
        return;
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "{}",
        failure_note(format!(
            "{} lookups failed, the mapping may be incomplete (see warnings above)",
            usage.failed_lookups
        ))
    );
}
