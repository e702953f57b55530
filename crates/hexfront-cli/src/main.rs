//! Hexfront - four-faction hex conquest in the terminal.

use anyhow::Result;
use clap::Parser;
use hexfront_cli::{
    driver::{run_ai_turns, start_session, AiRunEnd},
    input::{parse_command, Command, HELP},
    load_settings, JsonTerrainFile, TextGameOver, TextRenderer, TextStatus,
};
use hexfront_core::{Faction, NoTerrain, Session, TerrainProvider};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Hexfront - four factions fight over the Korean peninsula on a hex board
#[derive(Parser, Debug)]
#[command(name = "hexfront")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file (missing keys use defaults)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Faction you play: US, ROK, DPRK or PLA
    #[arg(short, long, default_value = "US")]
    faction: Faction,

    /// Let every faction be played by the computer
    #[arg(long)]
    watch: bool,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Terrain JSON file (element list or Overpass document)
    #[arg(short, long)]
    terrain: Option<PathBuf>,

    /// Stop after this many rounds when watching
    #[arg(long, default_value = "100")]
    max_rounds: u32,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexfront=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let settings = load_settings(args.settings.as_deref(), args.seed)?;
    let human = (!args.watch).then_some(args.faction);
    let mut provider: Box<dyn TerrainProvider> = match &args.terrain {
        Some(path) => Box::new(JsonTerrainFile::new(path)),
        None => Box::new(NoTerrain),
    };

    let mut session = Session::new(settings)?
        .with_renderer(TextRenderer::new(std::io::stdout(), !args.no_color))
        .with_status(TextStatus::new(std::io::stdout()))
        .with_game_over(TextGameOver::new(std::io::stdout()));

    let stats = start_session(&mut session, human, provider.as_mut()).await?;
    info!(?human, ?stats, "session ready");

    let max_rounds = human.is_none().then_some(args.max_rounds);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if human.is_some() {
        println!("{HELP}");
    }

    loop {
        if session.is_ai_turn() {
            match run_ai_turns(&mut session, max_rounds).await? {
                AiRunEnd::HumanTurn => continue,
                AiRunEnd::GameOver(outcome) => {
                    info!(?outcome, "game finished");
                    break;
                }
                AiRunEnd::RoundLimit => {
                    println!("Stopped after {} rounds.", args.max_rounds);
                    break;
                }
            }
        }
        if session.is_game_over() {
            break;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match parse_command(&line) {
            Ok(Command::Select { row, col }) => {
                // Rejections are already shown as notices
                if let Err(err) = session.select_hex(row, col) {
                    debug!(row, col, error = %err, "selection rejected");
                }
            }
            Ok(Command::EndTurn) => {
                if let Err(err) = session.end_turn() {
                    println!("{err}");
                }
            }
            Ok(Command::Show) => {
                let text = TextRenderer::new(std::io::sink(), !args.no_color).draw(&session.frame());
                print!("{text}");
            }
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}
