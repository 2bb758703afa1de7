//! Commands typed by the user on stdin.
//!
//! One command per line: a verb followed by symbols, e.g. `add btc, eth` or
//! `rm aapl`. Verbs are case-insensitive. A line made only of symbols is an `ADD`.
//! Symbols are normalized here, before they reach the feed.
use strum_macros::{Display, EnumString};
use watchlist_common::{Result, Symbol, WatchlistError};

/// Command verbs, matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Verb {
    /// Subscribe to the following symbols.
    #[strum(to_string = "ADD", serialize = "SUB", serialize = "SUBSCRIBE")]
    Add,
    /// Unsubscribe from the following symbols.
    #[strum(to_string = "REMOVE", serialize = "RM", serialize = "UNSUBSCRIBE")]
    Remove,
    /// Print the watchlist.
    List,
    /// Print usage.
    Help,
    /// Exit.
    #[strum(to_string = "QUIT", serialize = "EXIT")]
    Quit,
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Subscribe to every symbol, in order.
    Add(Vec<Symbol>),
    /// Unsubscribe from every symbol.
    Remove(Vec<Symbol>),
    /// Print the watchlist.
    List,
    /// Print usage.
    Help,
    /// Exit.
    Quit,
}

/// Usage text printed by `HELP`.
pub const HELP: &str = "\
commands:
  ADD <SYMBOL>...      subscribe (a bare symbol list works too)
  REMOVE <SYMBOL>...   unsubscribe (aliases: RM, UNSUBSCRIBE)
  LIST                 print the watchlist
  HELP                 show this text
  QUIT                 exit (also Ctrl+C; end of input does not exit)";

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let tokens: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        let Some((first, rest)) = tokens.split_first() else {
            return Ok(None);
        };

        let Ok(verb) = first.parse::<Verb>() else {
            if tokens.iter().all(|t| looks_like_symbol(t)) {
                return Ok(Some(Command::Add(normalize_all(&tokens)?)));
            }
            return Err(WatchlistError::UnknownCommand(line.trim().to_string()));
        };

        let command = match verb {
            Verb::Add | Verb::Remove if rest.is_empty() => {
                return Err(WatchlistError::MissingSymbols(verb.to_string()));
            }
            Verb::Add => Command::Add(normalize_all(rest)?),
            Verb::Remove => Command::Remove(normalize_all(rest)?),
            _ if !rest.is_empty() => {
                return Err(WatchlistError::UnknownCommand(line.trim().to_string()));
            }
            Verb::List => Command::List,
            Verb::Help => Command::Help,
            Verb::Quit => Command::Quit,
        };
        Ok(Some(command))
    }
}

fn normalize_all(tokens: &[&str]) -> Result<Vec<Symbol>> {
    tokens.iter().map(|t| Symbol::normalize(t)).collect()
}

/// Tickers like `BRK.B`, `BTC-USD` or `^GSPC`.
fn looks_like_symbol(token: &str) -> bool {
    token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '/' | '^' | '='))
}
