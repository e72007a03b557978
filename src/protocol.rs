//! Line-based text protocol for playing against the engine.
//!
//! The framing follows GTP: each request is one line with an optional
//! numeric id, and each response starts with `=` on success or `?` on
//! failure, echoes the id, and ends with a blank line.
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the loop
//! - `clear_board` - Start a new game with a fresh search tree
//! - `play <column>` - Drop the human's piece into a column (1-7)
//! - `genmove` - Let the engine answer; returns the column it played
//! - `undo` - Take back the last two plies
//! - `showboard` - Print the board
//! - `stats` - Print the statistics of the last engine decision
//! - `heatmap` - Print the visit share of each candidate cell
//! - `winner` - Print the game status
//!
//! ## Example
//!
//! ```ignore
//! use connect_four_mcts::protocol::TextProtocol;
//! let mut protocol = TextProtocol::new(session);
//! protocol.run()?;
//! ```

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::connect_four::{ConnectFour, Move};
use crate::constants::{N_COLS, N_ROWS};
use crate::game::Outcome;
use crate::session::Session;

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "clear_board",
    "genmove",
    "heatmap",
    "known_command",
    "list_commands",
    "name",
    "play",
    "quit",
    "showboard",
    "stats",
    "undo",
    "version",
    "winner",
];

/// Protocol front end over a Connect Four session.
pub struct TextProtocol {
    session: Session<ConnectFour>,
}

impl TextProtocol {
    pub fn new(session: Session<ConnectFour>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<ConnectFour> {
        &self.session
    }

    /// Run the command loop on stdin/stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the command loop until `quit` or end of input.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);

            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            debug!(%command, ?args, "request");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let known = KNOWN_COMMANDS.contains(&args[0].to_lowercase().as_str());
                (true, if known { "true" } else { "false" }.to_string())
            }

            "quit" => (true, String::new()),

            "clear_board" => {
                self.session.reset();
                (true, String::new())
            }

            "play" => {
                if args.is_empty() {
                    return (false, "missing argument".to_string());
                }
                let col = match args[0].parse::<usize>() {
                    Ok(c) if (1..=N_COLS).contains(&c) => c - 1,
                    _ => return (false, format!("invalid column, expected 1-{N_COLS}")),
                };
                let session = &mut self.session;
                let result = session
                    .game()
                    .play_for_column(session.state(), col)
                    .and_then(|mv| session.play(&mv));
                match result {
                    Ok(outcome) => (true, Self::outcome_note(outcome)),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => match self.session.respond() {
                Ok(mv) => {
                    let note = Self::outcome_note(self.session.outcome());
                    let column = (mv.col + 1).to_string();
                    if note.is_empty() {
                        (true, column)
                    } else {
                        (true, format!("{column} {note}"))
                    }
                }
                Err(e) => (false, e.to_string()),
            },

            "undo" => match self.session.undo() {
                Ok(()) => (true, String::new()),
                Err(e) => (false, e.to_string()),
            },

            "showboard" => (true, format!("\n{}", self.session.state().board())),

            "stats" => match self.session.shown_stats() {
                Some(stats) => (true, stats.to_string()),
                None => (true, "none".to_string()),
            },

            "heatmap" => (true, self.heatmap()),

            "winner" => (true, self.session.outcome().to_string()),

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn outcome_note(outcome: Outcome) -> String {
        if outcome.is_terminal() {
            outcome.to_string()
        } else {
            String::new()
        }
    }

    /// Percentage of the last decision's visits per candidate cell.
    fn heatmap(&self) -> String {
        let shares = self.session.visit_shares();
        let mut out = String::from("\n");
        for row in 0..N_ROWS {
            for col in 0..N_COLS {
                let share = shares
                    .iter()
                    .find(|(mv, _)| *mv == Move::new(row, col))
                    .map(|(_, s)| *s);
                match share {
                    Some(s) => out.push_str(&format!("{:>4}", (s * 100.0).round() as u32)),
                    None => out.push_str("   ."),
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use fastrand::Rng;

    use super::*;
    use crate::config::SearchConfig;
    use crate::mcts::SearchBudget;

    fn protocol() -> TextProtocol {
        let session = Session::new(ConnectFour::new(), SearchConfig::default(), Rng::with_seed(8))
            .with_budget(SearchBudget::Iterations(200))
            .unwrap();
        TextProtocol::new(session)
    }

    #[test]
    fn test_parse_id_keeps_play_argument() {
        assert_eq!(TextProtocol::parse_id("7 play 4"), (Some(7), "play 4"));
        assert_eq!(TextProtocol::parse_id("  12   genmove "), (Some(12), "genmove"));
    }

    #[test]
    fn test_parse_id_column_is_not_an_id() {
        assert_eq!(TextProtocol::parse_id("play 4"), (None, "play 4"));
        // Too large for an id, so the line is left whole.
        assert_eq!(
            TextProtocol::parse_id("99999999999 play 4"),
            (None, "99999999999 play 4")
        );
        assert_eq!(TextProtocol::parse_id("undo"), (None, "undo"));
    }

    #[test]
    fn test_name_command() {
        let mut p = protocol();
        let (success, response) = p.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "connect-four-mcts");
    }

    #[test]
    fn test_known_command() {
        let mut p = protocol();

        let (success, response) = p.execute("known_command", &["genmove"]);
        assert!(success);
        assert_eq!(response, "true");

        let (success, response) = p.execute("known_command", &["resign"]);
        assert!(success);
        assert_eq!(response, "false");
    }

    #[test]
    fn test_play_rejects_bad_columns() {
        let mut p = protocol();
        assert!(!p.execute("play", &[]).0);
        assert!(!p.execute("play", &["0"]).0);
        assert!(!p.execute("play", &["8"]).0);
        assert!(!p.execute("play", &["x"]).0);
        assert!(p.session().state().history().is_empty());
    }

    #[test]
    fn test_play_genmove_undo() {
        let mut p = protocol();
        assert!(p.execute("play", &["4"]).0);

        let (success, response) = p.execute("genmove", &[]);
        assert!(success);
        let col: usize = response.parse().unwrap();
        assert!((1..=N_COLS).contains(&col));
        assert_eq!(p.session().state().history().len(), 2);

        let (success, stats) = p.execute("stats", &[]);
        assert!(success);
        assert!(stats.starts_with("plays=200"));

        let (_, heat) = p.execute("heatmap", &[]);
        assert_eq!(heat.lines().count(), N_ROWS + 1);

        assert!(p.execute("undo", &[]).0);
        assert!(p.session().state().history().is_empty());
        assert!(!p.execute("undo", &[]).0);
    }

    #[test]
    fn test_genmove_out_of_turn() {
        let mut p = protocol();
        let (success, response) = p.execute("genmove", &[]);
        assert!(!success);
        assert!(response.contains("player two"));
    }

    #[test]
    fn test_serve_session() {
        let mut p = protocol();
        let input = Cursor::new("# comment\n1 name\n\n2 play 9\nwinner\nquit\nname\n");
        let mut output = Vec::new();
        p.serve(input, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "=1 connect-four-mcts\n\n?2 invalid column, expected 1-7\n\n= in progress\n\n= \n\n"
        );
    }
}
