use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::LabelStyle;

/// Result of one scan: which build configurations reference each template path.
///
/// `file_paths` keeps discovery order for both keys and labels, and a key only exists
/// once a configuration has declared the parameter with that value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateUsage {
    pub server: String,
    pub parameter: String,
    pub label_style: LabelStyle,
    pub collected_at: DateTime<Utc>,
    pub total_build_types: usize,
    /// Per-item lookups that failed and were skipped or truncated
    pub failed_lookups: usize,
    pub file_paths: IndexMap<String, Vec<String>>,
}

impl TemplateUsage {
    pub fn new(server: impl Into<String>, parameter: impl Into<String>, label_style: LabelStyle) -> Self {
        Self {
            server: server.into(),
            parameter: parameter.into(),
            label_style,
            collected_at: Utc::now(),
            total_build_types: 0,
            failed_lookups: 0,
            file_paths: IndexMap::new(),
        }
    }

    /// Appends `label` under `file_path`, creating the entry on first use.
    pub fn record(&mut self, file_path: &str, label: String) {
        self.file_paths
            .entry(file_path.to_string())
            .or_default()
            .push(label);
    }

    pub fn total_jobs(&self) -> usize {
        self.file_paths.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.file_paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_groups_in_discovery_order() {
        let mut usage = TemplateUsage::new("http://ci", "p", LabelStyle::Name);
        usage.record("templates/app.yaml", "Deploy App".to_string());
        usage.record("templates/db.yaml", "Deploy DB".to_string());
        usage.record("templates/app.yaml", "Deploy App (EU)".to_string());

        let keys: Vec<_> = usage.file_paths.keys().cloned().collect();
        assert_eq!(keys, vec!["templates/app.yaml", "templates/db.yaml"]);
        assert_eq!(
            usage.file_paths["templates/app.yaml"],
            vec!["Deploy App", "Deploy App (EU)"]
        );
        assert_eq!(usage.total_jobs(), 3);
    }

    #[test]
    fn test_record_keeps_duplicate_labels() {
        let mut usage = TemplateUsage::new("http://ci", "p", LabelStyle::Name);
        usage.record("a.yaml", "Job".to_string());
        usage.record("a.yaml", "Job".to_string());

        assert_eq!(usage.file_paths["a.yaml"].len(), 2);
    }

    #[test]
    fn test_new_usage_is_empty() {
        let usage = TemplateUsage::new("http://ci", "p", LabelStyle::LastRun);
        assert!(usage.is_empty());
        assert_eq!(usage.total_jobs(), 0);
    }
}
