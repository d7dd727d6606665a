use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{
    load_settings, service_base, GenerationSession, HttpStoryGenerator, ImageRefResolver,
    SessionPhase,
};
use shared::domain::SceneCount;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{apply_command, parse_command, Flow, HELP};
use render::{render_full_story, render_session};

#[derive(Parser, Debug)]
#[command(about = "Generate illustrated stories from a prompt")]
struct Args {
    /// Base URL of the generation service.
    #[arg(long)]
    server_url: Option<String>,
    /// Generate once for this prompt, print the story and exit.
    #[arg(long)]
    prompt: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    count: Option<i64>,
    /// Settings file; defaults to story_client.toml in the working directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref());
    let service_url = args
        .server_url
        .unwrap_or_else(|| settings.service_url.clone());
    let base = service_base(&service_url)
        .with_context(|| format!("invalid service url '{service_url}'"))?;
    let generator = HttpStoryGenerator::new(base, settings.request_timeout())?;
    let resolver = generator
        .image_resolver()
        .context("service url cannot host image routes")?;
    info!(service = %generator.service_base(), "using generation service");

    let scene_count = match args.count {
        Some(count) => SceneCount::new(count)?,
        None => settings.default_scene_count,
    };
    let mut session = GenerationSession::new(std::sync::Arc::new(generator), scene_count);

    match args.prompt {
        Some(prompt) => run_once(&mut session, &resolver, prompt).await,
        None => run_interactive(&mut session, &resolver).await,
    }
}

async fn run_once(
    session: &mut GenerationSession,
    resolver: &ImageRefResolver,
    prompt: String,
) -> Result<()> {
    session.update_prompt_draft(prompt);
    session.submit()?;
    session.wait_for_completion().await;

    match (session.phase(), session.story(), session.error()) {
        (SessionPhase::Ready, Some(story), _) => {
            print!("{}", render_full_story(story, resolver));
            Ok(())
        }
        (_, _, Some(error)) => bail!("{error}"),
        (phase, _, _) => bail!("generation ended in unexpected phase {phase}"),
    }
}

async fn run_interactive(session: &mut GenerationSession, resolver: &ImageRefResolver) -> Result<()> {
    println!("{HELP}\n");
    print!("{}", render_session(session, resolver));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(err) => {
                        println!("{err}");
                        continue;
                    }
                };
                match apply_command(session, command) {
                    Flow::Quit => break,
                    Flow::Continue { notice } => {
                        if let Some(notice) = notice {
                            println!("{notice}");
                        }
                        print!("{}", render_session(session, resolver));
                    }
                }
            }
            Some(_) = session.wait_for_completion(), if session.is_generating() => {
                print!("{}", render_session(session, resolver));
            }
        }
    }

    session.reset();
    Ok(())
}
