// SPDX-License-Identifier: GPL-3.0-or-later
mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chorrosion_application::custom_formats::{facts_for_release, matching_formats};
use chorrosion_application::{
    parse_release_title, prioritize_decisions, CustomFormatService, FormatTag, InMemoryEventBus,
    SearchCriteria,
};
use chorrosion_config::{load as load_config, AppConfig};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scenario::{DecisionReport, Scenario};

#[derive(Debug, Parser)]
#[command(name = "chorrosion", about = "Judge releases against quality profiles and custom formats")]
struct Cli {
    /// TOML configuration file; CHORROSION_* environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every release in a scenario file through the decision pipeline.
    Evaluate {
        scenario: PathBuf,
        /// Treat the batch as an automatic search rather than an RSS sync.
        #[arg(long, conflicts_with = "user_invoked")]
        search: bool,
        /// Treat the batch as a search started by the user.
        #[arg(long)]
        user_invoked: bool,
    },
    /// List the custom formats a release title matches.
    Formats {
        title: String,
        /// Take formats from this scenario instead of the configured store.
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
    /// Validate format tags.
    CheckTag {
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Command::Evaluate {
            scenario,
            search,
            user_invoked,
        } => {
            let criteria = search_criteria(search, user_invoked);
            let reports = evaluate(&config, &scenario, criteria.as_ref())?;
            print_reports(&reports, cli.output)
        }
        Command::Formats { title, scenario } => {
            let names = formats_for_title(&config, &title, scenario.as_deref())?;
            match cli.output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
                OutputFormat::Text if names.is_empty() => println!("no custom formats matched"),
                OutputFormat::Text => names.iter().for_each(|name| println!("{name}")),
            }
            Ok(())
        }
        Command::CheckTag { tags } => check_tags(&tags),
    }
}

fn init_tracing(config: &AppConfig) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(true)
        .with_level(true);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn search_criteria(search: bool, user_invoked: bool) -> Option<SearchCriteria> {
    match (search, user_invoked) {
        (_, true) => Some(SearchCriteria::user_invoked()),
        (true, false) => Some(SearchCriteria::automatic()),
        (false, false) => None,
    }
}

fn evaluate(
    config: &AppConfig,
    path: &Path,
    criteria: Option<&SearchCriteria>,
) -> Result<Vec<DecisionReport>> {
    let scenario = Scenario::from_file(path)?;
    let maker = scenario.decision_maker(config)?;

    let decisions = maker.evaluate_all(scenario.candidates.clone(), criteria);
    let ordered = prioritize_decisions(
        decisions,
        &scenario.delay_profile(config),
        config.decision.propers_and_repacks,
    );

    info!(
        target: "cli",
        approved = ordered.iter().filter(|d| d.is_approved()).count(),
        total = ordered.len(),
        "evaluation finished"
    );
    Ok(ordered.iter().map(DecisionReport::from).collect())
}

fn formats_for_title(config: &AppConfig, title: &str, scenario: Option<&Path>) -> Result<Vec<String>> {
    let Some(parsed) = parse_release_title(title) else {
        bail!("unable to parse release title '{title}'");
    };

    let repository = match scenario {
        Some(path) => Scenario::from_file(path)?.format_repository(config)?,
        None => chorrosion_infrastructure::init_custom_format_store(&config.storage)?,
    };
    let service = CustomFormatService::new(repository, InMemoryEventBus::new());
    let formats = service.all()?;

    Ok(matching_formats(&formats, &facts_for_release(&parsed, None))
        .into_iter()
        .map(|format| format.name)
        .collect())
}

fn check_tags(tags: &[String]) -> Result<()> {
    let mut invalid = 0;
    for raw in tags {
        match FormatTag::parse(raw) {
            Ok(tag) => println!(
                "ok      {raw}: {:?} {:?}",
                tag.tag_type(),
                tag.modifier()
            ),
            Err(err) => {
                invalid += 1;
                println!("invalid {raw}: {err}");
            }
        }
    }

    if invalid > 0 {
        bail!("{invalid} of {} tags are invalid", tags.len());
    }
    Ok(())
}

fn print_reports(reports: &[DecisionReport], output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
        OutputFormat::Text => reports.iter().for_each(|report| println!("{report}")),
    }
    Ok(())
}
