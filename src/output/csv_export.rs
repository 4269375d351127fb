//! Recruiter ranking as CSV

use crate::error::Result;
use crate::processing::scorer::RankedResume;
use std::io::Write;
use std::path::Path;

pub const RANKING_HEADER: [&str; 2] = ["Resume", "Match Score (%)"];

/// One row per resume in the given order, scores with two decimals
pub fn write_ranking_csv<W: Write>(rankings: &[RankedResume], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(RANKING_HEADER)?;

    for row in rankings {
        let score = format!("{:.2}", row.score);
        csv_writer.write_record([row.name.as_str(), score.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn ranking_csv_string(rankings: &[RankedResume]) -> Result<String> {
    let mut buffer = Vec::new();
    write_ranking_csv(rankings, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn save_ranking_csv(rankings: &[RankedResume], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_ranking_csv(rankings, file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranking_csv_layout() {
        let rankings = vec![
            RankedResume {
                name: "jane.pdf".to_string(),
                score: 83.458,
            },
            RankedResume {
                name: "doe, john.docx".to_string(),
                score: 7.0,
            },
        ];

        let csv = ranking_csv_string(&rankings).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Resume,Match Score (%)");
        assert_eq!(lines[1], "jane.pdf,83.46");
        assert_eq!(lines[2], "\"doe, john.docx\",7.00");
    }

    #[test]
    fn test_empty_ranking_has_header_only() {
        let csv = ranking_csv_string(&[]).unwrap();
        assert_eq!(csv.trim_end(), "Resume,Match Score (%)");
    }
}
