//! Stoa - scheduled philosophy quote bot.
//!
//! One run asks a language model for a quote, renders it onto a card, and
//! publishes the card to every configured social platform.

mod adapters;
mod cassette;
mod cli;
mod config;
mod content;
mod context;
mod error;
mod gateway;
mod model;
mod output;
mod params;
mod ports;
mod render;
mod report;

use std::path::Path;
use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;
use crate::config::{process_env, Config, Settings};
use crate::content::generate_quote;
use crate::context::ServiceContext;
use crate::error::RunError;
use crate::gateway::{PublishGateway, PublishRequest};
use crate::output::resolve_output_path;
use crate::render::CardRenderer;
use crate::report::RunReport;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("stoa=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Run the pipeline once. `Ok(true)` means at least one platform accepted
/// the post.
async fn run(cli: Cli) -> Result<bool, RunError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(RunError::Config)?;
    let settings = Settings::resolve(config, &cli, &process_env)?;

    tracing::debug!(
        model = %settings.generation.model,
        provider = ?settings.generation.provider,
        platforms = ?settings.publish.platforms,
        "Resolved settings"
    );

    let replay_path = process_env("STOA_REPLAY");
    let is_recording = process_env("STOA_REC").is_some_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        tracing::info!(cassette = %cassette_path, "Replaying");
        (ServiceContext::replaying(Path::new(cassette_path), &settings.publish)?, None)
    } else if is_recording {
        tracing::info!("Recording mode enabled");
        let (ctx, session) = ServiceContext::recording(&settings)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&settings)?, None)
    };
    let ServiceContext { generator, transport, media_host, mode } = ctx;

    let quote = generate_quote(
        generator.as_ref(),
        &settings.generation.model,
        settings.generation.topic.as_deref(),
    )
    .await?;
    drop(generator);
    tracing::info!(author = quote.author(), "Generated quote");

    let renderer = CardRenderer::new(settings.render.clone())?;
    let card_path =
        resolve_output_path(settings.output.as_deref(), &settings.output_dir, quote.author());
    let card = renderer.render(&quote, &card_path)?;

    let gateway = PublishGateway::from_settings(&settings.publish, transport, media_host)
        .with_max_concurrency(mode.publish_concurrency(settings.publish.max_concurrency));
    let requests: Vec<PublishRequest> = settings
        .publish
        .platforms
        .iter()
        .map(|&platform| PublishRequest::for_card(&quote, &card, platform))
        .collect();
    let outcome = gateway.publish_all(&requests).await;
    drop(gateway);

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => tracing::info!(path = %path.display(), "Cassette saved"),
            Err(e) => tracing::warn!("Failed to save cassette: {e}"),
        }
    }

    let report = RunReport::new(&quote, &card, &outcome);
    if cli.json {
        let json = report.to_json().map_err(|e| RunError::Io(std::io::Error::other(e)))?;
        println!("{json}");
    } else {
        print!("{}", report.to_text());
    }

    Ok(outcome.any_succeeded())
}
