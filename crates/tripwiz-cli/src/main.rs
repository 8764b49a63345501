// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

mod prompts;
mod render;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dialoguer::theme::ColorfulTheme;
use log::LevelFilter;
use serde_json::Value;
use simplelog::{ColorChoice, ConfigBuilder, TerminalMode, TermLogger};
use std::fs;
use std::path::PathBuf;
use tripwiz_core::itinerary::normalize_itinerary;
use tripwiz_core::wizard::PendingFetch;
use tripwiz_core::{
    Destination, HttpTravelApi, TravelApi, Wizard, WizardConfig, WizardError, WizardStep,
};
use tripwiz_text::RecommendationParser;

use prompts::{DetailsAction, ItineraryAction, Pick};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the recommendation service
    #[arg(long, env = "TRIPWIZ_API_URL")]
    api_url: Option<String>,

    /// Path to config.json
    #[arg(short, long, env = "TRIPWIZ_CONFIG")]
    config: Option<PathBuf>,

    /// More log output on stderr (-vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip step by step
    Plan,
    /// Reopen a shared trip link
    Resume { link: String },
    /// Parse a recommendations text file and list the destinations
    Parse {
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Normalize an itinerary payload file and print the canonical JSON
    Normalize { file: PathBuf },
    /// Show the effective configuration
    Config {
        /// Write the defaults if no config file exists yet
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config_path = cli.config.clone().unwrap_or_else(WizardConfig::default_path);
    let mut config = WizardConfig::load(&config_path)?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }

    match cli.command {
        Commands::Plan => {
            let api = HttpTravelApi::new(&config)?;
            let mut wizard = Wizard::new(&config);
            run_wizard(&mut wizard, &api)?;
        }
        Commands::Resume { link } => {
            let api = HttpTravelApi::new(&config)?;
            let (mut wizard, pending) = Wizard::from_entry(&config, Some(link.as_str()));
            match pending {
                Some(pending) => fetch(&mut wizard, &api, Ok(pending)),
                None => eprintln!("! No shared trip found in that link, starting fresh"),
            }
            run_wizard(&mut wizard, &api)?;
        }
        Commands::Parse { file, json } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let parser = RecommendationParser::new(config.scoring.clone());
            let mut parsed = Vec::new();
            for result in parser.parse(&text) {
                match result {
                    Ok(destination) => parsed.push(destination),
                    Err(e) => eprintln!("! {}", e),
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else if parsed.is_empty() {
                println!("No destinations found.");
            } else {
                for (i, destination) in parsed.into_iter().enumerate() {
                    println!("{}", render::destination(i + 1, &Destination::from(destination)));
                }
            }
        }
        Commands::Normalize { file } => {
            let content = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            // Accept a whole service response as well as the bare itinerary.
            let raw = match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(mut map)) if map.contains_key("itinerary") => {
                    map.remove("itinerary").unwrap_or(Value::Null)
                }
                Ok(value) => value,
                Err(_) => Value::String(content),
            };
            let itinerary = normalize_itinerary(&raw)
                .with_context(|| format!("Failed to normalize {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&itinerary)?);
        }
        Commands::Config { init } => {
            if init && !config_path.exists() {
                WizardConfig::default().save(&config_path)?;
                println!("Wrote defaults to {}", config_path.display());
            }
            println!("Config file: {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("tripwiz")
        .build();
    if let Err(e) = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Drives the wizard until the user quits.
fn run_wizard(wizard: &mut Wizard, api: &dyn TravelApi) -> Result<()> {
    let theme = ColorfulTheme::default();
    loop {
        match wizard.step() {
            WizardStep::CollectingBasics => prompts::basics(wizard, &theme)?,
            WizardStep::CollectingDetails => match prompts::details(wizard, &theme)? {
                DetailsAction::Search => {
                    let pending = wizard.request_recommendations();
                    fetch(wizard, api, pending);
                }
                DetailsAction::Back => {
                    wizard.back()?;
                }
            },
            WizardStep::ReviewingRecommendations => {
                print!("{}", render::recommendations(&wizard.view()));
                match prompts::pick_destination(wizard.destinations(), &theme)? {
                    Pick::Destination(index) => {
                        let pending = wizard.select_destination(index);
                        fetch(wizard, api, pending);
                    }
                    Pick::Back => {
                        wizard.back()?;
                    }
                    Pick::Quit => return Ok(()),
                }
            }
            WizardStep::ReviewingItinerary => {
                print!("{}", render::itinerary(&wizard.view()));
                match prompts::after_itinerary(&theme)? {
                    ItineraryAction::Back => {
                        wizard.back()?;
                    }
                    ItineraryAction::Quit => return Ok(()),
                }
            }
            step => anyhow::bail!("Wizard stopped while {}", step),
        }
    }
}

/// Runs a fetch the wizard has issued, showing its loading message meanwhile.
fn fetch(
    wizard: &mut Wizard,
    api: &dyn TravelApi,
    pending: Result<PendingFetch, WizardError>,
) {
    let pending = match pending {
        Ok(pending) => pending,
        Err(e) => {
            eprintln!("! {}", e);
            return;
        }
    };
    if let Some(message) = wizard.view().loading_message {
        println!("{}", message);
    }
    let response = pending.dispatch(api);
    prompts::report(wizard.complete(pending.ticket, response).map(|_| ()));
}
