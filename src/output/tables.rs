use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use crate::usage::TemplateUsage;

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// One row per template path with its job count and job labels.
pub fn render_table(usage: &TemplateUsage) -> String {
    if usage.is_empty() {
        return format!("No '{}' values found\n", usage.parameter);
    }

    let mut table = create_table();
    table.set_header(create_cyan_header(&["Template path", "Jobs", "Build configurations"]));

    for (file_path, jobs) in &usage.file_paths {
        table.add_row(vec![
            Cell::new(file_path),
            Cell::new(jobs.len()).set_alignment(CellAlignment::Right),
            Cell::new(jobs.join("\n")),
        ]);
    }

    format!("{table}\n")
}
