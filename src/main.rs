//! A.R.E.S Research CLI Entry Point
//!
//! - `ares-research` - Interactive research session (default)
//! - `ares-research run` - Research a topic, save and optionally narrate the report
//! - `ares-research status` - Show configured agents
//! - `ares-research config` - Show or validate configuration
//! - `ares-research init` - Scaffold research.toml

use anyhow::{bail, Context};
use ares_research::cli::init::{self, InitConfig, InitResult};
use ares_research::cli::output::{Output, Stage};
use ares_research::cli::{Cli, Commands, RunArgs};
use ares_research::llm::LLMClient;
use ares_research::narration::NarrationConverter;
use ares_research::system::{save_report, ResearchSystem};
use ares_research::utils::toml_config::{LoggingConfig, ResearchConfig};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match cli.command {
        Some(Commands::Init {
            path,
            force,
            provider,
            search,
        }) => {
            init_tracing(&LoggingConfig::default(), cli.verbose)?;
            let config = InitConfig {
                path,
                force,
                provider,
                search,
            };
            match init::run(config, &output) {
                InitResult::Success | InitResult::AlreadyExists => Ok(()),
                InitResult::Error(e) => bail!("Initialization failed: {}", e),
            }
        }
        Some(Commands::Config { full, validate }) => {
            cmd_config(&cli.config, full, validate, &output)
        }
        Some(Commands::Status) => {
            let config = load_config(&cli.config, cli.verbose)?;
            cmd_status(&config, &output)
        }
        Some(Commands::Run(args)) => {
            let config = load_config(&cli.config, cli.verbose)?;
            cmd_run(&config, args, &output).await
        }
        None => {
            let config = load_config(&cli.config, cli.verbose)?;
            cmd_run(&config, RunArgs::default(), &output).await
        }
    }
}

fn load_config(path: &Path, verbose: bool) -> anyhow::Result<ResearchConfig> {
    let config = ResearchConfig::load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    init_tracing(&config.logging, verbose)?;
    if path.exists() {
        info!("Loaded configuration from {}", path.display());
    } else {
        debug!("Config file {} not found, using defaults", path.display());
    }
    Ok(config)
}

/// `RUST_LOG` wins over the configured level; `--verbose` forces debug.
fn init_tracing(logging: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("ares_research=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("ares_research={}", logging.level)))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

async fn cmd_run(config: &ResearchConfig, args: RunArgs, output: &Output) -> anyhow::Result<()> {
    output.banner();

    let interactive = args.topic.is_none();
    let topic = match args.topic {
        Some(topic) => topic.trim().to_string(),
        None => output.ask("Enter your research topic")?,
    };
    if topic.is_empty() {
        bail!("Research topic cannot be empty");
    }

    let llm: Arc<dyn LLMClient> = Arc::from(config.llm.provider()?.create_client()?);
    let system = ResearchSystem::with_llm(Arc::clone(&llm), config)?;

    let context = if args.skip_questions {
        None
    } else {
        output.stage(Stage::Clarify, None);
        let follow_ups = system.clarify(&topic).await;
        let answers = output.follow_ups(&follow_ups, &mut std::io::stdin().lock())?;
        Some(ResearchSystem::format_answers(
            &follow_ups.questions,
            &answers,
        ))
    };

    output.stage(Stage::Research, Some(&topic));
    let report = system
        .conduct_research(&topic, context.as_deref(), args.brief.as_deref())
        .await;

    output.report(&report);

    output.stage(Stage::Save, None);
    let dir = args
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.report.output_dir));
    let path = save_report(&dir, &topic, &report).await?;
    output.wrote("report", &path.display().to_string());

    let narrate = args.narrate
        || (interactive && output.ask_yes_no("Convert this report into a podcast?"));
    if narrate {
        narrate_report(llm, config, args.voice.as_deref(), &report, &topic, output).await;
    }

    output.done("Research complete!");
    Ok(())
}

/// Narration is best effort: the saved report is the deliverable.
async fn narrate_report(
    llm: Arc<dyn LLMClient>,
    config: &ResearchConfig,
    voice: Option<&str>,
    report: &str,
    topic: &str,
    output: &Output,
) {
    let mut converter = match NarrationConverter::from_config(llm, config.narration.clone()) {
        Ok(converter) => converter,
        Err(e) => {
            output.warning(&format!("Narration unavailable: {}", e));
            return;
        }
    };
    if let Some(voice) = voice {
        if !converter.set_voice(voice) {
            output.warning(&format!(
                "Unknown voice '{}', using '{}'",
                voice,
                converter.voice()
            ));
        }
    }

    output.info(&format!("Narrating with voice '{}'", converter.voice()));
    match converter.create_narration(report, topic).await {
        Ok(dir) => output.wrote("podcast", &dir.display().to_string()),
        Err(e) => output.error(&format!("Narration failed: {}", e)),
    }
}

fn cmd_status(config: &ResearchConfig, output: &Output) -> anyhow::Result<()> {
    let system = ResearchSystem::from_config(config)?;
    let status = system.status();

    output.section("System Status");
    output.field("Status", &status.system_status);
    output.field("Total agents", &status.total_agents.to_string());
    output.field("Max parallel tasks", &status.max_parallel_tasks.to_string());
    output.field("Report model", &status.reporter_model);

    output.group("Agents");
    output.agent_table(&status.agents);
    Ok(())
}

fn cmd_config(path: &Path, full: bool, validate: bool, output: &Output) -> anyhow::Result<()> {
    let exists = path.exists();
    let config = load_config(path, false)?;

    if validate {
        if exists {
            output.success(&format!("{} is valid", path.display()));
        } else {
            output.warning(&format!(
                "{} not found, built-in defaults are in use",
                path.display()
            ));
            output.hint("Run 'ares-research init' to create one");
        }
        return Ok(());
    }

    if full {
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        output.config_dump(&rendered);
        return Ok(());
    }

    output.section("Configuration");
    output.field("File", &path.display().to_string());
    output.field("LLM provider", &format!("{:?}", config.llm.provider));
    output.field("LLM endpoint", &config.llm.api_base);
    output.field("Coordinator model", &config.coordinator.model);
    output.field("Researcher model", &config.researcher.model);
    output.field("Report model", &config.report.model);
    output.field("Search provider", &format!("{:?}", config.search.provider));
    output.field("Reports directory", &config.report.output_dir);
    output.field("Podcasts directory", &config.narration.output_dir);
    output.hint("Use --full to print every setting");
    Ok(())
}
