//! Parsing of typed commands.

use thiserror::Error;

/// A line of player input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Click the hex at row, column.
    Select { row: i32, col: i32 },
    EndTurn,
    /// Redraw the board.
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("empty input")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("expected `row col`, got: {0}")]
    BadCoordinates(String),
}

pub const HELP: &str = "\
Commands:
  <row> <col>   select a unit, then a destination or target
  end           end your turn
  show          redraw the board
  help          show this text
  quit          leave the game";

/// Parse one input line. Coordinates may be separated by spaces or a comma.
pub fn parse_command(line: &str) -> Result<Command, InputError> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "" => return Err(InputError::Empty),
        "end" | "e" => return Ok(Command::EndTurn),
        "show" | "s" => return Ok(Command::Show),
        "help" | "h" | "?" => return Ok(Command::Help),
        "quit" | "q" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() || !parts[0].starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return Err(InputError::Unknown(line.to_string()));
    }
    match parts.as_slice() {
        [row, col] => match (row.parse(), col.parse()) {
            (Ok(row), Ok(col)) => Ok(Command::Select { row, col }),
            _ => Err(InputError::BadCoordinates(line.to_string())),
        },
        _ => Err(InputError::BadCoordinates(line.to_string())),
    }
}
