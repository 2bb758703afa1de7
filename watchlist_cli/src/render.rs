//! Terminal rendering of the watchlist.
//!
//! Prices are colored by movement: green when up, red when down, plain otherwise.
//! Entries that have not received a tick yet show `-` for price and volume.
use serde::Serialize;
use std::fmt::Write;
use watchlist_common::Result;
use watchlist_feed::{Entry, PriceDirection};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// How the watchlist is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned, colored table.
    Table,
    /// One JSON object per entry.
    Json,
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(flatten)]
    entry: &'a Entry,
    direction: PriceDirection,
}

/// Render `rows` in the requested format.
pub fn render(rows: &[Entry], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows)),
        OutputFormat::Json => render_json(rows),
    }
}

/// Aligned table with a header line, newest entry on top.
pub fn render_table(rows: &[Entry]) -> String {
    let mut out = format!("{:<10} {:>12} {:>10}\n", "SYMBOL", "PRICE", "VOLUME");
    if rows.is_empty() {
        out.push_str("(no symbols, type HELP for commands)\n");
        return out;
    }
    for entry in rows {
        let (price, volume) = if entry.previous_price.is_none() {
            ("-".to_string(), "-".to_string())
        } else {
            (format!("{:.2}", entry.price), entry.volume.to_string())
        };
        let price = paint(entry.direction(), &format!("{:>12}", price));
        let _ = writeln!(out, "{:<10} {} {:>10}", entry.symbol, price, volume);
    }
    out
}

/// One JSON object per line, each with its derived `direction`.
pub fn render_json(rows: &[Entry]) -> Result<String> {
    let mut out = String::new();
    for entry in rows {
        let row = Row {
            entry,
            direction: entry.direction(),
        };
        out.push_str(&serde_json::to_string(&row)?);
        out.push('\n');
    }
    Ok(out)
}

fn paint(direction: PriceDirection, text: &str) -> String {
    match direction {
        PriceDirection::Increase => format!("{GREEN}{text}{RESET}"),
        PriceDirection::Decrease => format!("{RED}{text}{RESET}"),
        PriceDirection::Neutral => text.to_string(),
    }
}
