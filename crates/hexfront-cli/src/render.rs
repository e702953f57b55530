//! Text sinks for the terminal.
//!
//! The board is printed with odd rows shifted right by half a cell so the rows read as an
//! offset hex layout. Each cell is a marker column plus three characters:
//! - `>` selected unit, `*` possible move, `!` possible attack, `@` pending target,
//!   `+` unit that cannot act until the next turn
//! - a unit shows its faction initial and type icon, e.g. `UInf`
//! - an empty hex shows its terrain glyph and the owner's initial in lower case

use hexfront_core::{ControllerMode, Faction, GameOverSink, HexCoord, Notice, RenderFrame, RenderSink, StatusSink};
use std::io::Write;
use tracing::warn;

const RESET: &str = "\x1b[0m";

fn faction_color(faction: Faction) -> &'static str {
    match faction {
        Faction::Us => "\x1b[34m",
        Faction::Rok => "\x1b[36m",
        Faction::Dprk => "\x1b[31m",
        Faction::Pla => "\x1b[33m",
    }
}

fn initial(faction: Faction) -> char {
    faction.code().chars().next().unwrap_or('?')
}

/// Prints the board after every change.
pub struct TextRenderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Draw `frame` into a string.
    pub fn draw(&self, frame: &RenderFrame<'_>) -> String {
        let grid = frame.grid;
        let selection = frame.selection;
        let fresh = frame.newly_created();
        let mut text = String::new();

        let header = match frame.mode {
            ControllerMode::AwaitingHumanInput => "your move",
            ControllerMode::RunningAi => "AI playing",
            ControllerMode::Idle => "idle",
        };
        text.push_str(&format!(
            "Turn {} | {} | {:?} | {}\n",
            frame.turn.number, frame.turn.active, frame.turn.phase, header
        ));

        text.push_str("    ");
        for col in 0..grid.cols() {
            text.push_str(&format!("{col:>4} "));
        }
        text.push('\n');

        for row in 0..grid.rows() as i32 {
            text.push_str(&format!("{row:>3} "));
            if row % 2 == 1 {
                text.push_str("  ");
            }
            for col in 0..grid.cols() as i32 {
                let coord = HexCoord::new(row, col);
                let Some(hex) = grid.get(&coord) else {
                    continue;
                };
                let marker = if selection.selected == Some(coord) {
                    '>'
                } else if selection.target == Some(coord) {
                    '@'
                } else if selection.possible_attacks.contains(&coord) {
                    '!'
                } else if selection.possible_moves.contains(&coord) {
                    '*'
                } else if fresh.contains(&coord) {
                    '+'
                } else {
                    ' '
                };
                text.push(marker);

                let (body, faction) = match &hex.unit {
                    Some(unit) => (
                        format!("{}{:<3}", initial(unit.faction), &unit.unit_type.icon()[..3]),
                        Some(unit.faction),
                    ),
                    None => {
                        let owner = hex
                            .owner
                            .map(|f| initial(f).to_ascii_lowercase())
                            .unwrap_or(' ');
                        (format!("{}{}  ", hex.terrain.glyph(), owner), hex.owner)
                    }
                };
                match faction {
                    Some(f) if self.color => {
                        text.push_str(faction_color(f));
                        text.push_str(&body);
                        text.push_str(RESET);
                    }
                    _ => text.push_str(&body),
                }
            }
            text.push('\n');
        }
        text
    }
}

impl<W: Write> RenderSink for TextRenderer<W> {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        let text = self.draw(frame);
        if let Err(err) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!(error = %err, "failed to draw board");
        }
    }
}

/// Prints notices as they arrive.
pub struct TextStatus<W: Write> {
    out: W,
}

impl<W: Write> TextStatus<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> StatusSink for TextStatus<W> {
    fn notify(&mut self, notice: &Notice) {
        if let Err(err) = writeln!(self.out, ">> {}", notice.text) {
            warn!(error = %err, "failed to print notice");
        }
    }
}

/// Announces the end of the game.
pub struct TextGameOver<W: Write> {
    out: W,
}

impl<W: Write> TextGameOver<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

/// Final banner for a winner or a draw.
pub fn game_over_text(winner: Option<Faction>) -> String {
    match winner {
        Some(faction) => format!("Game over! {faction} wins!"),
        None => "Game over! It's a draw!".to_string(),
    }
}

impl<W: Write> GameOverSink for TextGameOver<W> {
    fn game_over(&mut self, winner: Option<Faction>) {
        if let Err(err) = writeln!(self.out, "{}", game_over_text(winner)) {
            warn!(error = %err, "failed to print game over");
        }
    }
}
