use crate::cli::{Cli, Commands, KeyCommands};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use veogen::{
    logger::{self, LogLevel, LoggerConfig},
    translator, BatchEvent, BatchForm, Config, GenerationForm, GenerationState, ItemStatus,
    Locale, Result, Studio, Submission, VeoError, VEO_MODELS,
};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let mut logger_config = match (cli.json_logs, cli.verbose) {
        (true, true) => LoggerConfig::production().with_level(LogLevel::Debug),
        (true, false) => LoggerConfig::production(),
        (false, true) => LoggerConfig::development(),
        (false, false) => LoggerConfig::new(),
    };
    if let Some(path) = &cli.log_file {
        logger_config = logger_config.with_file_output(&path.to_string_lossy());
    }
    if let Err(e) = logger::init_with_config(logger_config) {
        eprintln!("{} {}", "❌ Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    if dotenv_loaded {
        log::debug!("✅ .env file loaded");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env();
    if let Some(locale) = cli.locale {
        config = config.with_locale(locale);
    }
    logger::log_config_info(&config);

    let locale = config.locale;
    match try_main(config, cli.command).await {
        Ok(code) => code,
        Err(err) => {
            log::debug!("Command failed: {:?}", err);
            eprintln!(
                "{} {}",
                "❌".red(),
                translator::translate_error(&err, locale).red().bold()
            );
            ExitCode::FAILURE
        }
    }
}

async fn try_main(mut config: Config, command: Commands) -> Result<ExitCode> {
    if let Commands::Batch {
        output_dir: Some(dir),
        ..
    } = &command
    {
        config = config.with_output_dir(dir.clone());
    }
    let studio = Studio::from_config(config)?;

    match command {
        Commands::Key(key_command) => handle_key(&studio, key_command).await,
        Commands::Models => {
            list_models();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Generate {
            prompt,
            model,
            aspect_ratio,
            count,
            duration,
            mute_audio,
            image,
            output,
        } => {
            let form = GenerationForm {
                prompt,
                model_id: model,
                aspect_ratio,
                video_count: count,
                duration,
                mute_audio,
                image,
            };
            handle_generate(&studio, form, output).await
        }
        Commands::Batch {
            prompts_file,
            image,
            model,
            aspect_ratio,
            duration,
            mute_audio,
            ..
        } => {
            let prompts = tokio::fs::read_to_string(&prompts_file).await?;
            let form = BatchForm {
                prompts,
                images: image,
                model_id: model,
                aspect_ratio,
                duration,
                mute_audio,
            };
            handle_batch(&studio, form).await
        }
    }
}

async fn handle_key(studio: &Studio, command: KeyCommands) -> Result<ExitCode> {
    match command {
        KeyCommands::Save { key } => {
            studio.save_key(&key).await?;
            println!("{}", "✅ API key saved".green());
        }
        KeyCommands::Clear => {
            studio.clear_key().await?;
            println!("{}", "🗑️  API key cleared".yellow());
        }
        KeyCommands::Status => {
            if studio.config().api_key.is_some() {
                println!("{}", "✅ Using GEMINI_API_KEY from the environment".green());
            } else if studio.has_key().await {
                println!(
                    "{} {}",
                    "✅ API key saved in".green(),
                    studio.config().credential_path.display()
                );
            } else {
                println!(
                    "{}",
                    veogen::messages::missing_credential(studio.locale()).yellow()
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn list_models() {
    for model in VEO_MODELS {
        println!("{} {}", model.name.bold(), format!("({})", model.id).bright_black());
        println!("   aspect ratios: {}", model.aspect_ratios.join(", "));
        println!(
            "   durations:     {}",
            model
                .durations
                .iter()
                .map(|d| format!("{}s", d))
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!(
            "   videos:        {}",
            model
                .video_counts
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!(
            "   image input:   {}   mute audio: {}",
            if model.supports_image { "✅" } else { "❌" },
            if model.supports_mute_audio { "✅" } else { "❌" }
        );
    }
}

fn default_output(config: &Config) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    config.output_dir.join(format!("veo_{}.mp4", stamp))
}

async fn handle_generate(
    studio: &Studio,
    form: GenerationForm,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let submission = studio
        .generate(&form, |state| match state {
            GenerationState::Submitting => eprintln!("{}", "🎬 Submitting request...".cyan()),
            GenerationState::Polling { message, .. } => eprintln!("{}", message.cyan()),
            GenerationState::Downloading => eprintln!("{}", "⬇️  Downloading video...".cyan()),
            _ => {}
        })
        .await?;

    match submission {
        Submission::Accepted(GenerationState::Succeeded { video }) => {
            let path = output.unwrap_or_else(|| default_output(studio.config()));
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
            tokio::fs::write(&path, &video).await?;
            println!("{} {}", "✅ Video saved to".green(), path.display());
            Ok(ExitCode::SUCCESS)
        }
        Submission::Accepted(GenerationState::Failed { message }) => {
            eprintln!("{} {}", "❌".red(), message.red().bold());
            Ok(ExitCode::FAILURE)
        }
        Submission::Accepted(other) => Err(VeoError::Generation(format!(
            "generation ended in a non-terminal state: {:?}",
            other
        ))),
        Submission::AlreadyRunning | Submission::Empty => {
            eprintln!("{}", "⚠️  Nothing to do".yellow());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn handle_batch(studio: &Studio, form: BatchForm) -> Result<ExitCode> {
    let submission = studio
        .run_batch(&form, |event| match event {
            BatchEvent::Status(line) => eprintln!("{}", line.cyan()),
            BatchEvent::Error(error) => eprintln!("{}", error.red()),
            BatchEvent::Cleared => {}
        })
        .await?;

    let report = match submission {
        Submission::Accepted(report) => report,
        Submission::Empty => {
            let hint = match studio.locale() {
                Locale::Id => "Tidak ada prompt untuk diproses.",
                Locale::En => "No prompts to process.",
            };
            eprintln!("{}", hint.yellow());
            return Ok(ExitCode::SUCCESS);
        }
        Submission::AlreadyRunning => {
            eprintln!("{}", "⚠️  A batch is already running".yellow());
            return Ok(ExitCode::FAILURE);
        }
    };

    for item in &report.items {
        match &item.status {
            ItemStatus::Succeeded { file } => {
                println!("{} {} {}", "✅".green(), item.position(), file.display())
            }
            ItemStatus::Failed { message } => {
                println!("{} {} {}", "❌".red(), item.position(), message.red())
            }
            ItemStatus::Pending => println!("⏸️  {} {}", item.position(), item.prompt),
        }
    }
    println!(
        "{} {}/{} ({} failed)",
        "📊".bold(),
        report.succeeded(),
        report.items.len(),
        report.failed()
    );

    // Item failures are reported per line; the run itself completed.
    Ok(ExitCode::SUCCESS)
}
