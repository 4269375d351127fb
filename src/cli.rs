//! CLI interface for the resume screener

use crate::config::OutputFormat;
use crate::input::file_detector::FileType;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(version)]
#[command(about = "Match resumes against job descriptions with static embeddings")]
#[command(long_about = "Score resume and job description similarity, list keyword gaps, \
rank a batch of resumes for one posting, and draft a tailored cover letter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// A resume and a job description, each as a file or pasted text.
/// Pasted text wins when both are given.
#[derive(Args, Debug, Clone)]
pub struct PairInput {
    /// Resume file (PDF, DOCX, TXT)
    #[arg(short, long)]
    pub resume: Option<PathBuf>,

    /// Resume as pasted text
    #[arg(long, value_name = "TEXT")]
    pub resume_text: Option<String>,

    /// Job description file (PDF, DOCX, TXT)
    #[arg(short, long)]
    pub job: Option<PathBuf>,

    /// Job description as pasted text
    #[arg(long, value_name = "TEXT")]
    pub job_text: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one resume against a job description (applicant view)
    Match {
        #[command(flatten)]
        input: PairInput,

        /// Show every gap report row and the document previews
        #[arg(short, long)]
        detailed: bool,

        /// Output format: console, json, markdown
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Save the report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Also draft a cover letter
        #[arg(long)]
        letter: bool,

        /// Write the cover letter PDF here (implies --letter)
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Rank several resumes against one job description (recruiter view)
    Rank {
        /// Resume files
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// Job description file
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Job description as pasted text
        #[arg(long, value_name = "TEXT")]
        job_text: Option<String>,

        /// Write the ranking table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,
    },

    /// Similarity, keyword overlap and term frequency dashboard
    Analytics {
        #[command(flatten)]
        input: PairInput,

        /// Output format: console, json, markdown
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,

        /// Save the report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Draft a cover letter tailored to the job description
    Letter {
        #[command(flatten)]
        input: PairInput,

        /// Write the letter PDF here
        #[arg(long)]
        pdf: Option<PathBuf>,

        /// Write the letter text here
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download a model
    Download {
        /// Model key, name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show model information
    Info {
        /// Model key, name or HuggingFace repo ID
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

/// Reject files whose extension no extractor handles
pub fn validate_file_extension(path: &Path) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if FileType::from_extension(ext) != FileType::Unknown => Ok(()),
        Some(ext) => Err(format!(
            "Unsupported file extension: .{}. Allowed: {}",
            ext,
            FileType::supported_extensions().join(", ")
        )),
        None => Err(format!("{} has no extension", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_match_arguments() {
        let cli = Cli::try_parse_from([
            "resume-screener",
            "match",
            "--resume",
            "cv.pdf",
            "--job-text",
            "Data Analyst",
            "-o",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Match { input, output, letter, .. } => {
                assert_eq!(input.resume, Some(PathBuf::from("cv.pdf")));
                assert_eq!(input.job_text.as_deref(), Some("Data Analyst"));
                assert_eq!(output, Some(OutputFormat::Json));
                assert!(!letter);
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_rank_requires_resumes() {
        assert!(Cli::try_parse_from(["resume-screener", "rank", "--job", "jd.txt"]).is_err());

        let cli = Cli::try_parse_from(["resume-screener", "rank", "-r", "a.pdf", "b.docx", "-j", "jd.txt"]).unwrap();
        match cli.command {
            Commands::Rank { resumes, .. } => assert_eq!(resumes.len(), 2),
            _ => panic!("expected rank command"),
        }
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF")).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx")).is_ok());
        assert!(validate_file_extension(Path::new("cv.odt")).is_err());
        assert!(validate_file_extension(Path::new("README")).is_err());
    }
}
