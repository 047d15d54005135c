//! Clacker - a typewriter in your terminal
//!
//! Run with `clacker` or `clacker type` to type on the current paper.
//! Use `clacker list` to see saved papers.
//! Use `clacker play <text>` to watch the ghostwriter wrap a text.

use clacker::audio;
use clacker::completion::{self, Completer};
use clacker::config::{self, Config};
use clacker::engine::TypingEngine;
use clacker::keyboard;
use clacker::session::{self, Session};
use clacker::storage::{PaperStore, Texture};
use clacker::view::TerminalGuard;
use clacker::{Cli, Commands};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Type { paper: None });
    let interactive = matches!(command, Commands::Type { .. } | Commands::New { .. });

    // Initialize logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    // The interactive view owns the terminal, so its logs go to a file
    let writer = if interactive {
        log_file_writer()
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("clacker={},warn", log_level))),
        )
        .with_target(false)
        .with_ansi(!interactive)
        .with_writer(writer)
        .init();

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref())?;

    // Apply CLI overrides
    if cli.mute {
        config.audio.feedback.enabled = false;
    }
    if let Some(width) = cli.width {
        config.engine.max_chars_per_line = width;
    }
    config.validate()?;

    // Run the appropriate command
    match command {
        Commands::Type { paper } => {
            let mut store = open_store(&config)?;
            if let Some(id) = paper {
                store.select(&id)?;
            }
            run_session(&config, store).await?;
        }

        Commands::New { texture } => {
            let mut store = open_store(&config)?;
            let texture = match texture {
                Some(name) => parse_texture(&name)?,
                None => config.storage.default_texture,
            };
            store.create(texture);
            store.flush()?;
            run_session(&config, store).await?;
        }

        Commands::List => {
            list_papers(&open_store(&config)?);
        }

        Commands::Show { id } => {
            let store = open_store(&config)?;
            let paper = store
                .get(&id)
                .ok_or_else(|| anyhow::anyhow!("No paper with id {}", id))?;
            println!("{}", paper.content);
        }

        Commands::Delete { id } => {
            let mut store = open_store(&config)?;
            let paper = store.delete(&id)?;
            store.flush()?;
            println!("Deleted \"{}\" ({})", paper.title, paper.id);
        }

        Commands::Texture { id, texture } => {
            let mut store = open_store(&config)?;
            let texture = parse_texture(&texture)?;
            store.set_texture(&id, texture)?;
            store.flush()?;
            println!("Paper {} is now {}", id, texture);
        }

        Commands::Config { write } => {
            show_config(&config);
            if write {
                let path = Config::default_path()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
                config::save_config(&config, &path)?;
                println!("Wrote {:?}", path);
            }
        }

        Commands::Play { text, fast } => {
            let mut engine = TypingEngine::from_config(&config.engine);
            let player = audio::create_player(&config.audio.feedback);
            let interval = if fast {
                Duration::from_millis(1)
            } else {
                Duration::from_millis(config.engine.stream_interval_ms)
            };
            if !session::play(&mut engine, &text, player.as_ref(), interval).await {
                anyhow::bail!("Nothing to type");
            }
            println!("{}", engine.buffer());
        }
    }

    Ok(())
}

/// Writer for the session log, or nowhere if it cannot be created
fn log_file_writer() -> BoxMakeWriter {
    let path = Config::log_path();
    let file = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
        });
    match file {
        Ok(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
        Err(e) => {
            eprintln!("Warning: cannot open log file {:?}: {}", path, e);
            BoxMakeWriter::new(std::io::sink)
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<PaperStore> {
    let path = config.resolve_storage_path();
    Ok(PaperStore::open(path, config.storage.default_texture)?)
}

fn parse_texture(name: &str) -> anyhow::Result<Texture> {
    name.parse::<Texture>().map_err(|e| anyhow::anyhow!(e))
}

/// Type interactively until the user quits
async fn run_session(config: &Config, store: PaperStore) -> anyhow::Result<()> {
    let player = audio::create_player(&config.audio.feedback);
    let completer: Arc<dyn Completer> = Arc::from(completion::create_completer(&config.completion));
    let mut listener = keyboard::create_listener()?;

    let mut session = Session::new(config, store, player, completer);

    let guard = TerminalGuard::new()?;
    let mut stdout = std::io::stdout();
    let result = session.run(listener.as_mut(), Some(&mut stdout)).await;
    drop(guard);

    result?;
    let paper = session.store().current();
    println!(
        "Saved \"{}\" ({} characters) to {:?}",
        paper.title,
        paper.content.chars().count(),
        session.store().path()
    );
    Ok(())
}

fn list_papers(store: &PaperStore) {
    println!("{:<2}{:<15} {:<17} {:<6} TITLE", "", "ID", "DATE", "PAPER");
    for paper in store.papers() {
        let marker = if paper.id == store.current_id() { "*" } else { "" };
        let date = chrono::DateTime::from_timestamp_millis(paper.date)
            .map(|d| {
                d.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<2}{:<15} {:<17} {:<6} {}",
            marker, paper.id, date, paper.texture, paper.title
        );
    }
}

fn show_config(config: &Config) {
    println!("Current Configuration\n");
    println!("=====================\n");

    println!("[engine]");
    println!("  max_chars_per_line = {}", config.engine.max_chars_per_line);
    println!("  char_width = {}", config.engine.char_width);
    println!("  initial_offset = {}", config.engine.initial_offset);
    println!("  bell_margin = {}", config.engine.bell_margin);
    println!("  stream_interval_ms = {}", config.engine.stream_interval_ms);
    println!("  highlight_ms = {}", config.engine.highlight_ms);

    println!("\n[audio.feedback]");
    println!("  enabled = {}", config.audio.feedback.enabled);
    println!("  theme = {:?}", config.audio.feedback.theme);
    println!("  volume = {}", config.audio.feedback.volume);

    println!("\n[completion]");
    println!("  backend = {:?}", config.completion.backend);
    if let Some(ref endpoint) = config.completion.endpoint {
        println!("  endpoint = {:?}", endpoint);
    }
    if let Some(ref model) = config.completion.model {
        println!("  model = {:?}", model);
    }
    println!(
        "  api_key = {}",
        if config.completion.api_key.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    );
    println!("  timeout_secs = {}", config.completion.timeout_secs);
    if let Some(ref command) = config.completion.command {
        println!("  command = {:?}", command);
    }

    println!("\n[storage]");
    println!("  path = {:?}", config.storage.path);
    println!("  (resolves to: {:?})", config.resolve_storage_path());
    println!("  default_texture = {}", config.storage.default_texture);

    println!("\n---");
    println!(
        "Config file: {}",
        Config::default_path()
            .map(|p| format!("{:?}", p))
            .unwrap_or_else(|| "(not found)".to_string())
    );
    println!("Session log: {:?}", Config::log_path());
}
