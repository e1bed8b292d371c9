use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use grade_calc::config::{load_config, validate_config, Config};
use grade_calc::grading::{GradingConfig, Quality, QualitySection, Section};
use grade_calc::provider::{load_grading_config, ConfigSource, FetchOptions};
use grade_calc::session::{GradeSession, Selection};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_INPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive calculator (default if no subcommand)
    Tui,
    /// Compute a grade from marks given on the command line
    Calc {
        /// Quiz marks, up to three (e.g. --quiz 10 --quiz 12)
        #[arg(long, num_args = 1, allow_hyphen_values = true)]
        quiz: Vec<f64>,

        /// Mid-term mark
        #[arg(long, allow_hyphen_values = true)]
        midterm: Option<f64>,

        /// Attendance percentage (0-100)
        #[arg(long, allow_hyphen_values = true)]
        attendance: Option<f64>,

        /// Final exam mark; omit to get predictions
        #[arg(long = "final", allow_hyphen_values = true)]
        final_exam: Option<f64>,

        /// Presentation quality: poor, good or excellent
        #[arg(long, value_parser = Quality::parse)]
        presentation: Option<Quality>,

        /// Fix an excellent presentation at 7 or 8 instead of drawing one
        #[arg(long)]
        presentation_score: Option<f64>,

        /// Assignment quality: poor, good or excellent
        #[arg(long, value_parser = Quality::parse)]
        assignment: Option<Quality>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Load and validate the grading document, then print its scale
    Check,
    /// Create the grading document and settings interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "grade-calc")]
#[command(about = "Course grade calculator and final-exam target planner", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings file (defaults to ~/.config/grade-calc/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Grading document path or URL (overrides the settings file)
    #[arg(short, long, global = true)]
    source: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+); a provider
    // that is already installed is fine
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    if let Err(e) = grade_calc::telemetry::init(cli.verbose) {
        eprintln!("Logging disabled: {:#}", e);
    }

    let command = cli.command.unwrap_or(Commands::Tui);
    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = command {
        if let Err(e) = grade_calc::config::init::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load settings
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let (source, options) = match resolve_source(&config, cli.source.as_deref()) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    tracing::debug!(source = %source, timeout = ?options.timeout, "resolved grading source");

    match command {
        Commands::Tui => {
            let theme = grade_calc::tui::resolve_theme(grade_calc::tui::Theme::parse(
                config.theme.as_deref(),
            ));
            let app = grade_calc::tui::App::new_loading(source.to_string(), theme);
            if let Err(e) = grade_calc::tui::run_tui(app, source, options).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Check => {
            let grading = load_or_exit(&source, &options).await;
            let use_colors = grade_calc::output::should_use_colors();
            println!("{}", grade_calc::output::format_scale(&grading, use_colors));
            println!();
            println!("Grading document at {} is valid.", source);
        }
        Commands::Calc {
            quiz,
            midterm,
            attendance,
            final_exam,
            presentation,
            presentation_score,
            assignment,
            format,
        } => {
            if quiz.len() > 3 {
                eprintln!("At most three quiz marks can be given (got {}).", quiz.len());
                std::process::exit(EXIT_INPUT);
            }

            let grading = load_or_exit(&source, &options).await;
            let mut session = GradeSession::with_config(std::sync::Arc::new(grading));

            let numeric = [Section::Quiz1, Section::Quiz2, Section::Quiz3]
                .into_iter()
                .zip(quiz.iter().copied().map(Some))
                .chain([
                    (Section::Midterm, midterm),
                    (Section::Attendance, attendance),
                    (Section::Final, final_exam),
                ]);
            for (section, value) in numeric {
                if let Some(v) = value {
                    if let Err(e) = session.set_field(section, &v.to_string()) {
                        eprintln!("warning: {}", e);
                    }
                }
            }

            if let Err(e) = apply_qualities(&mut session, presentation, presentation_score, assignment)
            {
                eprintln!("Input error: {}", e);
                std::process::exit(EXIT_INPUT);
            }

            let Some(result) = session.compute() else {
                eprintln!("Grading configuration unavailable.");
                std::process::exit(EXIT_CONFIG);
            };
            let Some(grading) = session.config() else {
                std::process::exit(EXIT_CONFIG);
            };

            match format {
                OutputFormat::Table => {
                    let use_colors = grade_calc::output::should_use_colors();
                    println!(
                        "{}",
                        grade_calc::output::format_result(&result, grading, use_colors)
                    );
                }
                OutputFormat::Tsv => {
                    println!("{}", grade_calc::output::format_tsv(&result, grading));
                }
                OutputFormat::Json => match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize result: {}", e);
                        std::process::exit(EXIT_CONFIG);
                    }
                },
            }
        }
        // Handled before settings are loaded
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

fn resolve_source(
    config: &Config,
    cli_source: Option<&str>,
) -> anyhow::Result<(ConfigSource, FetchOptions)> {
    Ok((config.grading_source(cli_source)?, config.fetch_options()?))
}

/// Load the grading document or exit: network code for URLs, config code otherwise.
async fn load_or_exit(source: &ConfigSource, options: &FetchOptions) -> GradingConfig {
    match load_grading_config(source, options).await {
        Ok(grading) => grading,
        Err(e) => {
            eprintln!("{}", e);
            let code = match source {
                ConfigSource::Url(_) => EXIT_NETWORK,
                ConfigSource::File(path) => {
                    if !path.exists() {
                        eprintln!("Run `grade-calc init` to create a grading document.");
                    }
                    EXIT_CONFIG
                }
            };
            std::process::exit(code);
        }
    }
}

fn apply_qualities(
    session: &mut GradeSession,
    presentation: Option<Quality>,
    presentation_score: Option<f64>,
    assignment: Option<Quality>,
) -> anyhow::Result<()> {
    match (presentation, presentation_score) {
        (Some(Quality::Excellent), Some(score)) => {
            if score != 7.0 && score != 8.0 {
                anyhow::bail!("--presentation-score must be 7 or 8 (got {})", score);
            }
            session.restore_selection(
                QualitySection::Presentation,
                Selection {
                    quality: Quality::Excellent,
                    score,
                },
            );
        }
        (_, Some(_)) => {
            anyhow::bail!("--presentation-score only applies to --presentation excellent")
        }
        (Some(quality), None) => {
            let score = session.select_quality(QualitySection::Presentation, quality);
            tracing::debug!(score, "presentation resolved");
        }
        (None, None) => {}
    }

    if let Some(quality) = assignment {
        session.select_quality(QualitySection::Assignment, quality);
    }

    Ok(())
}
