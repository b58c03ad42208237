use chrono::DateTime;

use crate::error::{CfPathsError, Result};

/// TeamCity's compact timestamp format, e.g. `20240115T093000+0000`.
const TEAMCITY_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%z";
const REPORT_DATE_FORMAT: &str = "%B %d, %Y";

/// Renders a TeamCity build timestamp as a long-form date (`January 15, 2024`).
///
/// The date is taken in the timestamp's own offset, not converted to local time.
pub fn format_build_date(raw: &str) -> Result<String> {
    let parsed = DateTime::parse_from_str(raw, TEAMCITY_TIMESTAMP_FORMAT).map_err(|source| {
        CfPathsError::DateParse {
            value: raw.to_string(),
            source,
        }
    })?;

    Ok(parsed.format(REPORT_DATE_FORMAT).to_string())
}
