//! Output formatters: colored console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::*;
use crate::processing::gap_analyzer::{GapReport, MatchStrength};
use colored::{Color, Colorize};
use std::path::Path;

/// Gap report rows shown on the console unless `--detailed`
const CONSOLE_GAP_ROWS: usize = 15;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub trait OutputFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String>;
    fn format_analytics(&self, report: &AnalyticsReport) -> Result<String>;
    fn format_ranking(&self, report: &RankingReport) -> Result<String>;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Dispatches a report to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = match score {
            s if s >= 80.0 => ("STRONG FIT", Color::Green),
            s if s >= 65.0 => ("GOOD FIT", Color::BrightGreen),
            s if s >= 50.0 => ("PARTIAL FIT", Color::Yellow),
            _ => ("WEAK FIT", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn strength_color(strength: MatchStrength) -> Color {
        match strength {
            MatchStrength::StrongMatch => Color::Green,
            MatchStrength::PartialMatch => Color::Yellow,
            MatchStrength::Missing => Color::Red,
        }
    }

    fn format_gap_table(&self, gap_report: &GapReport) -> String {
        let mut output = String::new();
        let rows = if self.detailed {
            gap_report.len()
        } else {
            CONSOLE_GAP_ROWS
        };

        output.push_str(&format!("  {:<24} {:>10}  {}\n", "Keyword", "Similarity", "Match"));
        for term in gap_report.terms.iter().take(rows) {
            let strength = term.strength.to_string();
            output.push_str(&format!(
                "  {:<24} {:>9.1}%  {}\n",
                term.term,
                term.similarity,
                self.colorize(&strength, Self::strength_color(term.strength))
            ));
        }
        if gap_report.len() > rows {
            output.push_str(&format!("  ... {} more (use --detailed)\n", gap_report.len() - rows));
        }

        output.push_str(&format!(
            "\n  {} strong, {} partial, {} missing\n",
            gap_report.count(MatchStrength::StrongMatch),
            gap_report.count(MatchStrength::PartialMatch),
            gap_report.count(MatchStrength::Missing)
        ));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME MATCH REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Model: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format(TIMESTAMP_FORMAT),
            report.metadata.embedding_model,
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("ATS Score", 2));
        output.push_str(&format!(
            "Match score: {:.2}% {}\n",
            report.ats_score,
            self.format_score_badge(report.ats_score)
        ));

        output.push_str(&self.format_header("Keywords", 2));
        let matched: Vec<&str> = report.keywords.matched.iter().map(String::as_str).collect();
        output.push_str(&format!(
            "{} ({}): {}\n",
            self.colorize("Matched", Color::Green),
            matched.len(),
            if matched.is_empty() { "-".to_string() } else { matched.join(", ") }
        ));
        let missing = report.keywords.display_missing();
        output.push_str(&format!(
            "{} ({}): {}\n",
            self.colorize("Missing", Color::Red),
            report.keywords.missing.len(),
            if missing.is_empty() { "-".to_string() } else { missing.join(", ") }
        ));

        if !report.gap_report.is_empty() {
            output.push_str(&self.format_header("Skill Gap Analysis", 2));
            output.push_str(&self.format_gap_table(&report.gap_report));
        }

        if let Some(letter) = &report.cover_letter {
            output.push_str(&self.format_header("✉️  Cover Letter", 2));
            output.push_str(&letter.text);
            output.push('\n');
        }

        Ok(output)
    }

    fn format_analytics(&self, report: &AnalyticsReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📈 ANALYTICS DASHBOARD", 1));
        output.push_str(&format!(
            "Generated: {} | Resume: {} words | Job: {} words\n",
            report.metadata.generated_at.format(TIMESTAMP_FORMAT),
            report.resume_word_count,
            report.job_word_count
        ));

        output.push_str(&self.format_header("Metrics", 2));
        output.push_str(&format!(
            "Similarity:       {:.2}% {}\n",
            report.similarity,
            self.format_score_badge(report.similarity)
        ));
        output.push_str(&format!("Keyword overlap:  {:.2}%\n", report.keyword_overlap_percent));

        output.push_str(&self.format_header("Top Missing Keywords", 3));
        if report.missing_keywords.is_empty() {
            output.push_str(&self.colorize("  None, every job keyword appears in the resume\n", Color::Green));
        }
        for keyword in &report.missing_keywords {
            output.push_str(&format!("  • {}\n", self.colorize(keyword, Color::Red)));
        }

        output.push_str(&self.format_header("Resume Term Frequency", 3));
        let widest = report.top_resume_terms.first().map(|t| t.count).unwrap_or(1).max(1);
        for tf in &report.top_resume_terms {
            let bar = "■".repeat((tf.count * 30).div_ceil(widest));
            output.push_str(&format!("  {:<20} {:>4} {}\n", tf.term, tf.count, self.colorize(&bar, Color::Cyan)));
        }

        Ok(output)
    }

    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("🏆 RESUME RANKING", 1));
        output.push_str(&format!(
            "Job: {} | Generated: {}\n\n",
            report.job_source,
            report.generated_at.format(TIMESTAMP_FORMAT)
        ));

        output.push_str(&format!("  {:>4}  {:<40} {:>15}\n", "#", "Resume", "Match Score (%)"));
        for (i, row) in report.rankings.iter().enumerate() {
            output.push_str(&format!(
                "  {:>4}  {:<40} {:>15}\n",
                i + 1,
                row.name,
                self.colorize(&format!("{:.2}", row.score), Color::Cyan)
            ));
        }

        if !report.skipped.is_empty() {
            output.push_str(&self.format_header("Skipped", 3));
            for skipped in &report.skipped {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    self.colorize("✗", Color::Red),
                    skipped.name,
                    skipped.reason
                ));
            }
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_analytics(&self, report: &AnalyticsReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        self.to_json(report)
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn metadata_block(&self, metadata: &ReportMetadata) -> String {
        if !self.include_metadata {
            return String::new();
        }

        format!(
            "**Generated:** {} | **Processing Time:** {}ms\n**Resume:** `{}` | **Job:** `{}` | **Model:** `{}`\n\n",
            metadata.generated_at.format(TIMESTAMP_FORMAT),
            metadata.processing_time_ms,
            file_label(&metadata.resume_source),
            file_label(&metadata.job_source),
            metadata.embedding_model
        )
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Match Report\n\n");
        output.push_str(&self.metadata_block(&report.metadata));
        output.push_str(&format!("**ATS Score:** {:.2}%\n\n", report.ats_score));

        output.push_str("## Keywords\n\n");
        let matched: Vec<&str> = report.keywords.matched.iter().map(String::as_str).collect();
        output.push_str(&format!("**Matched ({}):** {}\n\n", matched.len(), matched.join(", ")));
        output.push_str(&format!(
            "**Missing ({}):** {}\n\n",
            report.keywords.missing.len(),
            report.keywords.display_missing().join(", ")
        ));

        if !report.gap_report.is_empty() {
            output.push_str("## Skill Gap Analysis\n\n");
            output.push_str("| Keyword | Similarity | Match |\n");
            output.push_str("|---------|-----------:|-------|\n");
            for term in &report.gap_report.terms {
                output.push_str(&format!("| {} | {:.1}% | {} |\n", term.term, term.similarity, term.strength));
            }
            output.push('\n');
        }

        if let Some(letter) = &report.cover_letter {
            output.push_str("## Cover Letter\n\n");
            for line in letter.text.lines() {
                output.push_str(&format!("> {}\n", line));
            }
            output.push('\n');
        }

        Ok(output)
    }

    fn format_analytics(&self, report: &AnalyticsReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Analytics Dashboard\n\n");
        output.push_str(&self.metadata_block(&report.metadata));

        output.push_str("| Metric | Value |\n|--------|------:|\n");
        output.push_str(&format!("| Similarity | {:.2}% |\n", report.similarity));
        output.push_str(&format!("| Keyword overlap | {:.2}% |\n", report.keyword_overlap_percent));
        output.push_str(&format!("| Resume words | {} |\n", report.resume_word_count));
        output.push_str(&format!("| Job words | {} |\n\n", report.job_word_count));

        output.push_str("## Top Missing Keywords\n\n");
        for keyword in &report.missing_keywords {
            output.push_str(&format!("- {}\n", keyword));
        }
        output.push('\n');

        output.push_str("## Resume Term Frequency\n\n| Term | Count |\n|------|------:|\n");
        for tf in &report.top_resume_terms {
            output.push_str(&format!("| {} | {} |\n", tf.term, tf.count));
        }

        Ok(output)
    }

    fn format_ranking(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Resume Ranking\n\n");
        if self.include_metadata {
            output.push_str(&format!(
                "**Job:** `{}` | **Generated:** {}\n\n",
                file_label(&report.job_source),
                report.generated_at.format(TIMESTAMP_FORMAT)
            ));
        }

        output.push_str("| Rank | Resume | Match Score (%) |\n|-----:|--------|----------------:|\n");
        for (i, row) in report.rankings.iter().enumerate() {
            output.push_str(&format!("| {} | {} | {:.2} |\n", i + 1, row.name, row.score));
        }

        if !report.skipped.is_empty() {
            output.push_str("\n## Skipped\n\n");
            for skipped in &report.skipped {
                output.push_str(&format!("- `{}`: {}\n", skipped.name, skipped.reason));
            }
        }

        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn generate_match(&self, report: &MatchReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_match(report)
    }

    pub fn generate_analytics(&self, report: &AnalyticsReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_analytics(report)
    }

    pub fn generate_ranking(&self, report: &RankingReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_ranking(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn file_label(source: &str) -> String {
    Path::new(source)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string())
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    save_bytes_to_file(content.as_bytes(), file_path)
}

pub fn save_bytes_to_file(bytes: &[u8], file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::gap_analyzer::{LexicalDiff, TermClassification};
    use crate::processing::scorer::RankedResume;
    use chrono::Utc;

    fn sample_match_report() -> MatchReport {
        MatchReport {
            metadata: ReportMetadata::new("cv/jane.txt", "jobs/analyst.txt", "test-model", 12),
            ats_score: 72.5,
            keywords: LexicalDiff {
                matched: ["python", "sql"].iter().map(|s| s.to_string()).collect(),
                missing: ["tableau"].iter().map(|s| s.to_string()).collect(),
                overlap_percent: 66.67,
            },
            gap_report: GapReport {
                terms: vec![
                    TermClassification {
                        term: "python".to_string(),
                        similarity: 100.0,
                        strength: MatchStrength::StrongMatch,
                    },
                    TermClassification {
                        term: "tableau".to_string(),
                        similarity: 12.0,
                        strength: MatchStrength::Missing,
                    },
                ],
            },
            cover_letter: None,
        }
    }

    #[test]
    fn test_console_match_without_colors() {
        let output = ConsoleFormatter::new(false, false)
            .format_match(&sample_match_report())
            .unwrap();

        assert!(output.contains("Match score: 72.50% [GOOD FIT]"));
        assert!(output.contains("Matched (2): python, sql"));
        assert!(output.contains("Missing (1): tableau"));
        assert!(output.contains("Strong Match"));
        assert!(output.contains("1 strong, 0 partial, 1 missing"));
    }

    #[test]
    fn test_json_match_roundtrips_fields() {
        let json = JsonFormatter::new(false).format_match(&sample_match_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["ats_score"], 72.5);
        assert_eq!(value["keywords"]["missing"][0], "tableau");
        assert_eq!(value["gap_report"]["terms"][0]["strength"], "StrongMatch");
    }

    #[test]
    fn test_markdown_match() {
        let output = MarkdownFormatter::new(true).format_match(&sample_match_report()).unwrap();

        assert!(output.starts_with("# Resume Match Report"));
        assert!(output.contains("**Resume:** `jane.txt`"));
        assert!(output.contains("| tableau | 12.0% | Missing |"));
    }

    #[test]
    fn test_ranking_formats() {
        let report = RankingReport {
            generated_at: Utc::now(),
            job_source: "job.txt".to_string(),
            embedding_model: "test-model".to_string(),
            rankings: vec![
                RankedResume { name: "b.pdf".to_string(), score: 81.234 },
                RankedResume { name: "a.txt".to_string(), score: 40.0 },
            ],
            skipped: vec![SkippedResume {
                name: "broken.pdf".to_string(),
                reason: "invalid xref".to_string(),
            }],
        };

        let console = ConsoleFormatter::new(false, false).format_ranking(&report).unwrap();
        assert!(console.contains("81.23"));
        assert!(console.contains("broken.pdf: invalid xref"));

        let markdown = MarkdownFormatter::new(false).format_ranking(&report).unwrap();
        assert!(markdown.contains("| 1 | b.pdf | 81.23 |"));
        assert!(markdown.contains("| 2 | a.txt | 40.00 |"));
    }

    #[test]
    fn test_generator_dispatch() {
        let generator = ReportGenerator::with_options(false, true, false, false);
        let report = sample_match_report();

        assert!(generator.generate_match(&report, OutputFormat::Json).unwrap().starts_with('{'));
        assert!(generator
            .generate_match(&report, OutputFormat::Markdown)
            .unwrap()
            .starts_with("# Resume Match Report"));
    }

    #[test]
    fn test_save_report_creates_parent_dirs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("out.md");

        save_report_to_file("# Report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report");
    }
}
