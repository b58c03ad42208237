use anyhow::Result;
use std::fmt::Write;

use crate::config::OutputFormat;
use crate::usage::TemplateUsage;

use super::summary::{render_summary, render_unique_paths};
use super::tables::render_table;

/// Renders the full template usage report in the requested format.
///
/// - Summary: grouped console listing
/// - Table: one row per template path
/// - JSON: the complete [`TemplateUsage`] document
/// - CSV: one `file_path,job` row per label
pub fn render_report(usage: &TemplateUsage, format: OutputFormat, pretty: bool) -> Result<String> {
    match format {
        OutputFormat::Summary => Ok(render_summary(usage)),
        OutputFormat::Table => Ok(render_table(usage)),
        OutputFormat::Json => export_json(usage, pretty),
        OutputFormat::Csv => Ok(export_csv(usage)),
    }
}

/// Renders only the distinct template paths.
pub fn render_path_listing(
    usage: &TemplateUsage,
    format: OutputFormat,
    pretty: bool,
) -> Result<String> {
    match format {
        OutputFormat::Summary | OutputFormat::Table => Ok(render_unique_paths(usage)),
        OutputFormat::Json => {
            let paths: Vec<&String> = usage.file_paths.keys().collect();
            let json = if pretty {
                serde_json::to_string_pretty(&paths)?
            } else {
                serde_json::to_string(&paths)?
            };
            Ok(format!("{json}\n"))
        }
        OutputFormat::Csv => {
            let mut output = String::from("file_path\n");
            for file_path in usage.file_paths.keys() {
                let _ = writeln!(output, "{}", csv_field(file_path));
            }
            Ok(output)
        }
    }
}

fn export_json(usage: &TemplateUsage, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(usage)?
    } else {
        serde_json::to_string(usage)?
    };
    Ok(format!("{json}\n"))
}

fn export_csv(usage: &TemplateUsage) -> String {
    let mut output = String::from("file_path,job\n");

    for (file_path, jobs) in &usage.file_paths {
        for job in jobs {
            let _ = writeln!(output, "{},{}", csv_field(file_path), csv_field(job));
        }
    }

    output
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelStyle;

    fn sample_usage() -> TemplateUsage {
        let mut usage = TemplateUsage::new("http://ci", "tpl", LabelStyle::LastRun);
        usage.total_build_types = 4;
        usage.record(
            "templates/app.yaml",
            "Root / Deploy App (Last run: January 15, 2024)".to_string(),
        );
        usage.record("templates/app.yaml", "Root / Deploy \"EU\"".to_string());
        usage.record("templates/db.yaml", "Root / Deploy DB".to_string());
        usage
    }

    #[test]
    fn test_export_csv_quotes_fields() {
        let output = render_report(&sample_usage(), OutputFormat::Csv, false).unwrap();

        let expected = "\
file_path,job
templates/app.yaml,\"Root / Deploy App (Last run: January 15, 2024)\"
templates/app.yaml,\"Root / Deploy \"\"EU\"\"\"
templates/db.yaml,Root / Deploy DB
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_export_json_keeps_order_and_metadata() {
        let output = render_report(&sample_usage(), OutputFormat::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["parameter"], "tpl");
        assert_eq!(value["label_style"], "last-run");
        assert_eq!(value["total_build_types"], 4);

        let paths: Vec<&String> = value["file_paths"].as_object().unwrap().keys().collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(value["file_paths"]["templates/app.yaml"].as_array().unwrap().len(), 2);
        assert!(output.contains("\n  "));
    }

    #[test]
    fn test_json_round_trips_into_usage() {
        let output = render_report(&sample_usage(), OutputFormat::Json, false).unwrap();
        let parsed: TemplateUsage = serde_json::from_str(&output).unwrap();

        let keys: Vec<_> = parsed.file_paths.keys().cloned().collect();
        assert_eq!(keys, vec!["templates/app.yaml", "templates/db.yaml"]);
        assert_eq!(parsed.label_style, LabelStyle::LastRun);
    }

    #[test]
    fn test_path_listing_formats() {
        let usage = sample_usage();

        let json = render_path_listing(&usage, OutputFormat::Json, false).unwrap();
        assert_eq!(json, "[\"templates/app.yaml\",\"templates/db.yaml\"]\n");

        let csv = render_path_listing(&usage, OutputFormat::Csv, false).unwrap();
        assert_eq!(csv, "file_path\ntemplates/app.yaml\ntemplates/db.yaml\n");
    }

    #[test]
    fn test_csv_field_plain_value_untouched() {
        assert_eq!(csv_field("templates/app.yaml"), "templates/app.yaml");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
    }
}
