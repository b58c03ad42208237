use std::fmt::Display;

use console::{style, StyledObject};

/// Report and phase headings.
pub fn heading(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().underlined()
}

/// Field labels and banner details.
pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn template_path(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

/// Footer warning that some lookups failed and the mapping is partial.
pub fn failure_note(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().red().bold()
}

pub fn phase_running(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().yellow()
}

pub fn phase_done(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright().green()
}

pub fn banner_title(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).magenta().bold()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styles_emit_ansi_when_forced() {
        let path = template_path("templates/app.yaml").force_styling(true).to_string();
        assert!(path.starts_with("\u{1b}["));
        assert!(path.contains("templates/app.yaml"));

        let note = failure_note("2 lookups failed").force_styling(true).to_string();
        assert_ne!(note, path);
        assert!(note.contains("2 lookups failed"));
    }
}
