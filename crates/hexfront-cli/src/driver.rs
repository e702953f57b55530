//! Async pacing around a [`Session`].
//!
//! The session itself never waits. This module owns the pauses: between terrain batches while
//! the board is built, before each scripted turn, and between scripted units.

use hexfront_core::{AiStep, Faction, GameOutcome, GameResult, Session, TerrainProvider, TerrainStats};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Build terrain in batches, yielding between them, then place forces and start play.
pub async fn start_session(
    session: &mut Session,
    human: Option<Faction>,
    provider: &mut dyn TerrainProvider,
) -> GameResult<TerrainStats> {
    let mut ingest = session.prepare_terrain(provider)?;
    let pause = session.settings().terrain_batch_pause();
    info!(source = ?ingest.source(), "building terrain");

    while ingest.next_batch().is_some() {
        let (done, total) = ingest.progress();
        debug!(done, total, "terrain progress");
        if !ingest.is_done() {
            sleep(pause).await;
        }
    }

    let (grid, stats) = ingest.finish();
    session.start_with_grid(human, grid)?;
    Ok(stats)
}

/// How a stretch of scripted play ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiRunEnd {
    /// A human faction is up.
    HumanTurn,
    GameOver(GameOutcome),
    /// The round limit was passed.
    RoundLimit,
}

/// Play scripted turns, with the configured pauses, until a human is up or the game ends.
///
/// `max_rounds` stops a fully scripted game once the round number exceeds it.
pub async fn run_ai_turns(session: &mut Session, max_rounds: Option<u32>) -> GameResult<AiRunEnd> {
    let start_delay = session.settings().ai_start_delay();
    let unit_pause = session.settings().ai_unit_pause();

    while session.is_ai_turn() {
        if max_rounds.is_some_and(|max| session.turn().number > max) {
            info!(round = session.turn().number, "round limit reached");
            return Ok(AiRunEnd::RoundLimit);
        }
        pause(start_delay).await;

        loop {
            match session.step_ai()? {
                AiStep::Acted { action, .. } => {
                    debug!(?action, "scripted unit acted");
                    pause(unit_pause).await;
                }
                AiStep::Finished(change) => {
                    debug!(event = ?change.event(), "scripted turn finished");
                    break;
                }
                AiStep::GameOver(outcome) => return Ok(AiRunEnd::GameOver(outcome)),
            }
        }
    }

    Ok(match session.outcome() {
        Some(outcome) => AiRunEnd::GameOver(outcome),
        None => AiRunEnd::HumanTurn,
    })
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexfront_core::{ControllerMode, GameSettings, NoTerrain};

    fn fast_settings(seed: u64) -> GameSettings {
        let mut settings = GameSettings::seeded(seed);
        settings.ai_start_delay_ms = 0;
        settings.ai_unit_pause_ms = 0;
        settings.terrain_batch_pause_ms = 0;
        settings
    }

    #[tokio::test]
    async fn test_start_session_builds_board() {
        let mut settings = fast_settings(4);
        settings.terrain_batch_size = 10;
        let mut session = Session::new(settings).unwrap();
        let stats = start_session(&mut session, Some(Faction::Pla), &mut NoTerrain)
            .await
            .unwrap();

        assert_eq!(stats.rock + stats.forest + stats.water, 53);
        assert_eq!(session.turn().active, Faction::Pla);
        assert_eq!(session.mode(), ControllerMode::AwaitingHumanInput);
    }

    #[tokio::test]
    async fn test_ai_turns_hand_back_to_human() {
        let mut session = Session::new(fast_settings(8)).unwrap();
        start_session(&mut session, Some(Faction::Us), &mut NoTerrain)
            .await
            .unwrap();
        session.end_turn().unwrap();

        let end = run_ai_turns(&mut session, None).await.unwrap();
        if end == AiRunEnd::HumanTurn {
            assert_eq!(session.turn().active, Faction::Us);
            assert_eq!(session.turn().number, 2);
        } else {
            assert!(matches!(end, AiRunEnd::GameOver(_)));
        }
    }

    #[tokio::test]
    async fn test_round_limit_stops_scripted_game() {
        let mut session = Session::new(fast_settings(15)).unwrap();
        start_session(&mut session, None, &mut NoTerrain).await.unwrap();

        let end = run_ai_turns(&mut session, Some(2)).await.unwrap();
        match end {
            AiRunEnd::RoundLimit => assert_eq!(session.turn().number, 3),
            AiRunEnd::GameOver(_) => assert!(session.is_game_over()),
            AiRunEnd::HumanTurn => panic!("no human faction in this game"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_uses_configured_delays() {
        let mut settings = GameSettings::seeded(21);
        settings.terrain_batch_pause_ms = 0;
        let mut session = Session::new(settings).unwrap();
        start_session(&mut session, Some(Faction::Us), &mut NoTerrain)
            .await
            .unwrap();
        session.end_turn().unwrap();

        let started = tokio::time::Instant::now();
        run_ai_turns(&mut session, None).await.unwrap();
        // Three scripted turns, each waiting at least the start delay
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }
}
