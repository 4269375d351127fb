//! Resume screener: match resumes against job descriptions

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_screener::cli::{self, Cli, Commands, ConfigAction, ModelAction, PairInput};
use resume_screener::config::{Config, OutputFormat};
use resume_screener::error::{Result, ScreenerError};
use resume_screener::input::manager::InputManager;
use resume_screener::input::ExtractedText;
use resume_screener::output::csv_export::save_ranking_csv;
use resume_screener::output::{save_bytes_to_file, save_report_to_file, RankingReport, ReportGenerator, SkippedResume};
use resume_screener::processing::analyzer::AnalysisEngine;
use resume_screener::processing::document::{Document, DocumentKind};
use resume_screener::processing::embedding_manager::EmbeddingModelManager;
use std::path::{Path, PathBuf};
use std::process;

const PREVIEW_CHARS: usize = 300;
const PASTED_SOURCE: &str = "pasted text";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if !config.output.color_output {
        colored::control::set_override(false);
    }

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_override: Option<PathBuf>) -> Result<()> {
    let mut input_manager = InputManager::new().with_max_file_bytes(config.input.max_file_bytes);

    match command {
        Commands::Match {
            input,
            detailed,
            output,
            save,
            letter,
            pdf,
        } => {
            let (resume, job) = load_pair(&mut input_manager, &input).await?;
            let format = output.unwrap_or(config.output.format);
            let engine = AnalysisEngine::new(&config);

            info!("Scoring {} against {}", resume.source(), job.source());
            let report = engine.analyze_match(&resume, &job, letter || pdf.is_some())?;

            let generator = ReportGenerator::with_options(config.output.color_output, detailed, true, true);
            println!("{}", generator.generate_match(&report, format)?);

            if detailed && format == OutputFormat::Console {
                println!("\n📄 Resume preview:\n{}", resume.preview(PREVIEW_CHARS));
                println!("\n💼 Job description preview:\n{}", job.preview(PREVIEW_CHARS));
            }

            if let Some(path) = save {
                let plain = ReportGenerator::with_options(false, detailed, true, true);
                save_report_to_file(&plain.generate_match(&report, format)?, &path)?;
                println!("💾 Report saved to {}", path.display());
            }

            if let Some(path) = pdf {
                let document = report.cover_letter.as_ref().and_then(|l| l.document.as_deref());
                write_letter_pdf(document, &path)?;
            }
        }

        Commands::Rank {
            resumes,
            job,
            job_text,
            csv,
            output,
        } => {
            let job_doc = load_document(
                &mut input_manager,
                job_text.as_deref(),
                job.as_deref(),
                DocumentKind::JobDescription,
            )
            .await?;

            let mut documents = Vec::new();
            let mut skipped = Vec::new();
            for path in &resumes {
                match read_resume(&mut input_manager, path).await {
                    Ok(doc) => documents.push(doc),
                    Err(reason) => {
                        warn!("Skipping {}: {}", path.display(), reason);
                        skipped.push(SkippedResume {
                            name: display_name(path),
                            reason,
                        });
                    }
                }
            }

            let engine = AnalysisEngine::new(&config);
            let progress = ProgressBar::new(documents.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| ScreenerError::OutputFormatting(e.to_string()))?
                    .progress_chars("#>-"),
            );

            let rankings = engine.rank(&documents, &job_doc, Some(&progress))?;
            progress.finish_and_clear();

            let report = RankingReport {
                generated_at: chrono::Utc::now(),
                job_source: job_doc.source().to_string(),
                embedding_model: engine.model_name(),
                rankings,
                skipped,
            };

            let format = output.unwrap_or(config.output.format);
            let generator = ReportGenerator::with_options(config.output.color_output, false, true, true);
            println!("{}", generator.generate_ranking(&report, format)?);

            if let Some(path) = csv {
                save_ranking_csv(&report.rankings, &path)?;
                println!("💾 Ranking saved to {}", path.display());
            }
        }

        Commands::Analytics { input, output, save } => {
            let (resume, job) = load_pair(&mut input_manager, &input).await?;
            let format = output.unwrap_or(config.output.format);
            let engine = AnalysisEngine::new(&config);

            let report = engine.analytics(&resume, &job)?;

            let generator = ReportGenerator::with_options(config.output.color_output, false, true, true);
            println!("{}", generator.generate_analytics(&report, format)?);

            if let Some(path) = save {
                let plain = ReportGenerator::with_options(false, false, true, true);
                save_report_to_file(&plain.generate_analytics(&report, format)?, &path)?;
                println!("💾 Report saved to {}", path.display());
            }
        }

        Commands::Letter { input, pdf, save } => {
            let (resume, job) = load_pair(&mut input_manager, &input).await?;
            let engine = AnalysisEngine::new(&config);

            let letter = engine.cover_letter(&resume, &job)?;
            println!("{}", letter.text);

            if !letter.is_letter() {
                warn!("No cover letter written: {}", letter.text);
                return Ok(());
            }

            if let Some(path) = save {
                save_report_to_file(&letter.text, &path)?;
                println!("💾 Letter saved to {}", path.display());
            }

            if let Some(path) = pdf {
                write_letter_pdf(letter.document.as_deref(), &path)?;
            }
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

            match action {
                ModelAction::List => {
                    println!("📚 Embedding Models\n");
                    for (id, info, downloaded) in manager.list_models() {
                        let status = if downloaded { "✅ Downloaded" } else { "⬇️  Available" };
                        println!("  • {} [{}] ({}) - {} MB {}", info.name, id, info.repo_id, info.size_mb, status);
                        println!("    {}", info.description);
                    }
                    println!("\nPrimary: {}", config.models.primary_embedding_model);
                    println!("Fallback: {}", config.models.fallback_embedding_model);
                }

                ModelAction::Download { model, force } => {
                    println!("⬇️  Downloading model: {}", model);
                    let path = manager.download_model(&model, force).await?;
                    println!("✅ Model available at {}", path.display());
                }

                ModelAction::Info { model } => {
                    let info = manager
                        .get_model_info(&model)
                        .ok_or_else(|| ScreenerError::ModelNotFound(model.clone()))?;

                    println!("📋 Model Information for '{}'\n", model);
                    println!("Name: {}", info.name);
                    println!("Repository: {}", info.repo_id);
                    println!("Type: {:?}", info.model_type);
                    println!("Dimensions: {}", info.dimensions);
                    println!("Size: {} MB", info.size_mb);
                    println!("Description: {}", info.description);

                    match manager.get_model_path(&model) {
                        Some(path) => println!("Status: ✅ Downloaded to {}", path.display()),
                        None => {
                            println!("Status: ⬇️  Available for download");
                            println!("\n💡 To download this model, run:");
                            println!("   resume-screener models download {}", model);
                        }
                    }
                }
            }
        }

        Commands::Config { action } => {
            let path = config_override.unwrap_or_else(Config::config_path);

            match action {
                Some(ConfigAction::Show) | None => {
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| ScreenerError::Configuration(e.to_string()))?;
                    println!("⚙️  Configuration ({})\n", path.display());
                    println!("{}", rendered);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("✅ Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Resume and job description; either failing to extract stops the command
async fn load_pair(manager: &mut InputManager, input: &PairInput) -> Result<(Document, Document)> {
    let resume = load_document(
        manager,
        input.resume_text.as_deref(),
        input.resume.as_deref(),
        DocumentKind::Resume,
    )
    .await?;
    let job = load_document(
        manager,
        input.job_text.as_deref(),
        input.job.as_deref(),
        DocumentKind::JobDescription,
    )
    .await?;

    Ok((resume, job))
}

async fn load_document(
    manager: &mut InputManager,
    pasted: Option<&str>,
    path: Option<&Path>,
    kind: DocumentKind,
) -> Result<Document> {
    let pasted = pasted.filter(|t| !t.trim().is_empty());

    let source = match (pasted, path) {
        (Some(_), _) => PASTED_SOURCE.to_string(),
        (None, Some(path)) => {
            cli::validate_file_extension(path)
                .map_err(|e| ScreenerError::UnsupportedFormat(format!("{}: {}", kind, e)))?;
            path.display().to_string()
        }
        (None, None) => String::new(),
    };

    let extracted = manager.resolve(pasted, path).await?;
    let document = Document::from_extracted(extracted, source, kind)?;

    if document.is_blank() {
        warn!("{} is empty; scores will be 0", document.kind());
    }

    Ok(document)
}

/// A ranked resume, or the reason it was left out
async fn read_resume(manager: &mut InputManager, path: &Path) -> std::result::Result<Document, String> {
    cli::validate_file_extension(path)?;

    match manager.extract_text(path).await {
        Ok(ExtractedText::Text(text)) => Ok(Document::new(text, display_name(path), DocumentKind::Resume)),
        Ok(failed @ ExtractedText::Failed { .. }) => Err(failed.into_pipeline_text()),
        Err(e) => Err(e.to_string()),
    }
}

fn write_letter_pdf(document: Option<&[u8]>, path: &Path) -> Result<()> {
    match document {
        Some(bytes) => {
            save_bytes_to_file(bytes, path)?;
            println!("📄 Cover letter PDF saved to {}", path.display());
        }
        None => warn!("No cover letter PDF was produced; {} not written", path.display()),
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
