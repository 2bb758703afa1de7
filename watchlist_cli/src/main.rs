//! Watchlist client — a terminal front end for the live watchlist feed. It reads
//! commands from stdin, keeps the subscribed symbols in a `Watchlist`, and prints
//! the table again after every batch of price updates.
//!
//! Usage example (CLI):
//! ```bash
//! watchlist_cli --interval-ms 1000 --generator random-walk --path ./symbols.txt
//! ```
//!
//! The symbol file may separate symbols with commas, spaces, or new lines.
//! See `command` for the interactive commands.
#![warn(missing_docs)]
mod args;
mod command;
mod render;

use crate::args::Args;
use crate::command::{Command, HELP};
use crate::render::{OutputFormat, render};
use clap::Parser;
use crossbeam_channel::{Sender, select, unbounded};
use log::{debug, error, info, warn};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread;
use watchlist_common::{Result, Symbol, SymbolParser, Tick, WatchlistError};
use watchlist_feed::Watchlist;

fn main() -> Result<(), WatchlistError> {
    init_logger();
    let args = Args::parse();
    let config = args.feed_config()?;
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        let _ = shutdown_tx.send(());
    })
    .map_err(|e| io::Error::other(e.to_string()))?;

    let mut watchlist = Watchlist::new(&config)?;
    if let Some(raw_path) = &args.path {
        let file_path = normalize_path(raw_path);
        if is_file_exist(&file_path) {
            let symbols = Symbol::parse_from_reader(BufReader::new(File::open(&file_path)?))?;
            info!("Initial symbols: {:?}", symbols);
            subscribe_all(&watchlist, symbols);
        } else {
            warn!("Symbol file {} not found, starting empty", file_path.display());
        }
    }

    let (update_tx, update_rx) = unbounded::<Tick>();
    watchlist.start(Some(update_tx))?;
    info!(
        "Watchlist running: interval {}ms, {} generator",
        config.interval_ms, config.generator
    );

    // Main keeps a sender so a closed stdin leaves the channel idle instead of disconnected.
    let (line_tx, lines_rx) = unbounded::<String>();
    spawn_stdin_reader(line_tx.clone())?;
    print_rows(&watchlist, format);

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(lines_rx) -> msg => match msg {
                Ok(line) => {
                    if !handle_line(&line, &watchlist, format) {
                        break;
                    }
                }
                Err(_) => break,
            },
            recv(update_rx) -> msg => if msg.is_ok() {
                let batch = 1 + update_rx.try_iter().count();
                debug!("Applied {} ticks", batch);
                print_rows(&watchlist, format);
            },
        }
    }

    drop(line_tx);
    watchlist.stop();
    info!("Watchlist stopped");
    Ok(())
}

/// Execute one input line. Returns `false` when the user asked to quit.
fn handle_line(line: &str, watchlist: &Watchlist, format: OutputFormat) -> bool {
    match Command::parse(line) {
        Ok(None) => {}
        Ok(Some(Command::Add(symbols))) => {
            subscribe_all(watchlist, symbols);
            print_rows(watchlist, format);
        }
        Ok(Some(Command::Remove(symbols))) => {
            for symbol in symbols {
                if watchlist.unsubscribe(symbol.as_str()) {
                    info!("Unsubscribed {}", symbol);
                } else {
                    warn!("{} is not in the watchlist", symbol);
                }
            }
            print_rows(watchlist, format);
        }
        Ok(Some(Command::List)) => print_rows(watchlist, format),
        Ok(Some(Command::Help)) => println!("{}", HELP),
        Ok(Some(Command::Quit)) => return false,
        Err(e) => warn!("{}", e),
    }
    true
}

/// Duplicates are skipped silently: they are already on screen.
fn subscribe_all(watchlist: &Watchlist, symbols: Vec<Symbol>) {
    for symbol in symbols {
        let name = symbol.to_string();
        if watchlist.subscribe(symbol) {
            info!("Subscribed {}", name);
        } else {
            debug!("{} already subscribed", name);
        }
    }
}

fn print_rows(watchlist: &Watchlist, format: OutputFormat) {
    match render(&watchlist.rows(), format) {
        Ok(text) => print!("{}", text),
        Err(e) => error!("Failed to render watchlist: {}", e),
    }
}

/// Forward stdin lines to the main loop from a background thread.
fn spawn_stdin_reader(tx: Sender<String>) -> Result<()> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
            info!("stdin closed; the feed keeps running, press Ctrl+C to exit");
        })?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use watchlist_common::FeedConfig;

    fn watchlist() -> Watchlist {
        let generator = Box::new(|symbol: &Symbol| -> Result<Tick> {
            Ok(Tick::new(symbol.clone(), 1.0, 1))
        });
        let config = FeedConfig {
            interval_ms: 60_000,
            ..FeedConfig::default()
        };
        Watchlist::with_generator(&config, generator).unwrap()
    }

    #[test]
    fn normalize_path_strips_quotes() {
        assert_eq!(normalize_path("  \"C:\\data\\syms.txt\" "), PathBuf::from("C:\\data\\syms.txt"));
        assert_eq!(normalize_path("plain.txt"), PathBuf::from("plain.txt"));
    }

    #[test]
    fn lines_drive_the_watchlist() {
        let list = watchlist();
        assert!(handle_line("add btc eth", &list, OutputFormat::Json));
        assert!(handle_line("btc", &list, OutputFormat::Json));
        assert_eq!(list.len(), 2);
        assert!(handle_line("rm btc", &list, OutputFormat::Json));
        assert!(!list.contains("BTC"));
        assert!(list.is_active("ETH"));
        assert!(handle_line("nonsense?", &list, OutputFormat::Json));
        assert!(!handle_line("quit", &list, OutputFormat::Json));
    }
}
