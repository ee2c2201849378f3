//! Markdown report generation
//!
//! This module writes a human-readable markdown report of a finished run,
//! including statistics, per-page results and the collected records.

use crate::harvest::HarvestReport;
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report for `report` to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the file
pub fn generate_markdown_report(report: &HarvestReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a harvest report as markdown
pub fn format_markdown_report(report: &HarvestReport, generated_at: DateTime<Utc>) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Card-Harvester Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Generated**: {}\n", generated_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n\n",
        report.elapsed.as_secs_f64()
    ));

    md.push_str("## Statistics\n\n");
    md.push_str(&format!("- **Pages Requested**: {}\n", stats.pages_requested));
    md.push_str(&format!("- **Pages Succeeded**: {}\n", stats.pages_succeeded));
    md.push_str(&format!("- **Pages Failed**: {}\n", stats.pages_failed));
    md.push_str(&format!("- **Total Attempts**: {}\n", stats.total_attempts));
    md.push_str(&format!("- **Records Seen**: {}\n", stats.records_seen));
    md.push_str(&format!("- **Unique Records**: {}\n", stats.unique_records));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    md.push_str("## Pages\n\n");
    md.push_str("| Page | State | Attempts | Records |\n");
    md.push_str("|------|-------|----------|---------|\n");
    for outcome in &report.outcomes {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            outcome.index,
            outcome.state,
            outcome.attempts,
            outcome.records.len()
        ));
    }
    md.push('\n');

    md.push_str("## Records\n\n");
    if report.result.is_empty() {
        md.push_str("No records collected.\n");
    } else {
        md.push_str("| Name | Identifier |\n");
        md.push_str("|------|------------|\n");
        for record in &report.result {
            md.push_str(&format!(
                "| {} | `{}` |\n",
                escape_cell(&record.name),
                record.identifier
            ));
        }
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::{ExtractedRecord, FetchOutcome, ResultAggregator};
    use crate::output::HarvestStats;
    use chrono::TimeZone;
    use std::time::Duration;

    fn sample_report() -> HarvestReport {
        let outcomes = vec![
            FetchOutcome::succeeded(
                0,
                vec![ExtractedRecord::new(
                    "123",
                    Some("Spa | Wellness".to_string()),
                )],
                1,
            ),
            FetchOutcome::failed(1, 3),
        ];
        let result = ResultAggregator::merge(&outcomes);
        let stats = HarvestStats::from_run(&outcomes, &result);
        HarvestReport {
            result,
            outcomes,
            stats,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_format_markdown_report() {
        let generated_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let md = format_markdown_report(&sample_report(), generated_at);

        assert!(md.starts_with("# Card-Harvester Report"));
        assert!(md.contains("- **Generated**: 2024-05-01T12:00:00+00:00"));
        assert!(md.contains("- **Duration**: 1.50 seconds"));
        assert!(md.contains("| 1 | failed | 3 | 0 |"));
        assert!(md.contains("| Spa \\| Wellness | `123` |"));
        assert!(md.contains("- **Success Rate**: 50.00%"));
    }

    #[test]
    fn test_generate_markdown_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        generate_markdown_report(&sample_report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Records"));
    }
}
