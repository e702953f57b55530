//! The game session: one board, four factions, and the turn state machine driving them.
//!
//! A [`Session`] owns every piece of mutable game state. Front ends feed it hex selections
//! through [`Session::select_hex`], end human turns with [`Session::end_turn`], and drive
//! scripted factions one unit at a time with [`Session::step_ai`] so they can pace the
//! actions however they like. Presentation goes out through the sinks in [`crate::events`].

use crate::ai::{self, AiAction};
use crate::combat::{self, CombatResult};
use crate::error::{GameError, GameResult, InitError, SelectionReason};
use crate::events::{GameEvent, GameOverSink, Notice, NullSink, RenderFrame, RenderSink, StatusSink, TerrainProvider};
use crate::grid::Grid;
use crate::hex::HexCoord;
use crate::mapgen::{self, TerrainIngest, TerrainStats};
use crate::merge::{self, MergeOutcome};
use crate::movement;
use crate::settings::{GameSettings, SettingsError};
use crate::territory::{self, Capture};
use crate::turn::{ControllerMode, Phase, SelectionState, TurnState};
use crate::types::Faction;
use crate::victory::{Elimination, GameOutcome, VictoryEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, error, info};

const AI_NOTICE: Duration = Duration::from_millis(1500);
const ELIMINATION_NOTICE: Duration = Duration::from_millis(3500);

/// Who takes over after a turn ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handoff {
    /// The human faction is active; selections are accepted again.
    Human,
    /// A scripted faction is active and should start acting after `delay`.
    Ai { delay: Duration },
}

/// Result of ending a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnChange {
    pub previous: Faction,
    pub next: Faction,
    /// Round number after the change.
    pub turn: u32,
    pub handoff: Handoff,
}

impl TurnChange {
    /// The change as a game event.
    pub fn event(&self) -> GameEvent {
        GameEvent::TurnEnded {
            faction: self.previous,
            next: self.next,
            turn: self.turn,
        }
    }
}

/// Result of one scripted step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AiStep {
    /// One unit acted. The driver should pause before the next step.
    Acted {
        action: AiAction,
        events: Vec<GameEvent>,
    },
    /// No eligible units remain; the turn has been passed on.
    Finished(TurnChange),
    /// The game ended. Nothing more will happen.
    GameOver(GameOutcome),
}

/// Which side caused an action; only changes how it is announced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Actor {
    Human,
    Ai,
}

/// A running game.
pub struct Session {
    settings: GameSettings,
    rng: ChaCha8Rng,
    grid: Grid,
    turn: TurnState,
    selection: SelectionState,
    victory: VictoryEvaluator,
    mode: ControllerMode,
    human: Option<Faction>,
    started: bool,
    /// Units still to act this scripted turn; `None` until the turn begins.
    ai_queue: Option<VecDeque<HexCoord>>,
    renderer: Box<dyn RenderSink>,
    status: Box<dyn StatusSink>,
    game_over_sink: Box<dyn GameOverSink>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("turn", &self.turn)
            .field("mode", &self.mode)
            .field("human", &self.human)
            .field("started", &self.started)
            .field("outcome", &self.victory.outcome())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create an unstarted session. Sinks default to [`NullSink`].
    pub fn new(settings: GameSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let grid = Grid::new(settings.rows, settings.cols);
        Ok(Self {
            settings,
            rng,
            grid,
            turn: TurnState::new(Faction::first()),
            selection: SelectionState::default(),
            victory: VictoryEvaluator::new(),
            mode: ControllerMode::Idle,
            human: None,
            started: false,
            ai_queue: None,
            renderer: Box::new(NullSink),
            status: Box::new(NullSink),
            game_over_sink: Box::new(NullSink),
        })
    }

    pub fn with_renderer(mut self, sink: impl RenderSink + 'static) -> Self {
        self.renderer = Box::new(sink);
        self
    }

    pub fn with_status(mut self, sink: impl StatusSink + 'static) -> Self {
        self.status = Box::new(sink);
        self
    }

    pub fn with_game_over(mut self, sink: impl GameOverSink + 'static) -> Self {
        self.game_over_sink = Box::new(sink);
        self
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn turn(&self) -> &TurnState {
        &self.turn
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    pub fn human(&self) -> Option<Faction> {
        self.human
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.victory.outcome()
    }

    pub fn is_game_over(&self) -> bool {
        self.victory.is_game_over()
    }

    /// Recorded elimination state of a faction.
    pub fn elimination(&self, faction: Faction) -> Option<Elimination> {
        self.victory.elimination(faction)
    }

    /// Whether the active faction is scripted.
    pub fn is_ai_turn(&self) -> bool {
        self.mode == ControllerMode::RunningAi
    }

    // ==================== Setup ====================

    /// Fetch terrain and prepare batched ingestion onto a fresh board.
    ///
    /// Drive the returned ingest to completion, then hand its board to
    /// [`Session::start_with_grid`].
    pub fn prepare_terrain(&mut self, provider: &mut dyn TerrainProvider) -> GameResult<TerrainIngest> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        let (elements, source) = mapgen::resolve_terrain(provider, &self.settings, &mut self.rng);
        Ok(TerrainIngest::new(&self.settings, elements, source))
    }

    /// Build terrain in one go, place the starting forces, and begin play.
    pub fn start(
        &mut self,
        human: Option<Faction>,
        provider: &mut dyn TerrainProvider,
    ) -> GameResult<TerrainStats> {
        let ingest = self.prepare_terrain(provider)?;
        let (grid, stats) = ingest.finish();
        self.start_with_grid(human, grid)?;
        Ok(stats)
    }

    /// Begin play on a board whose terrain is already in place.
    ///
    /// Starting forces are placed here. On failure the session stays unstarted.
    pub fn start_with_grid(&mut self, human: Option<Faction>, mut grid: Grid) -> GameResult<()> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        self.check_grid(&grid)?;
        let placed = mapgen::place_initial_units(&mut grid, &self.settings, &mut self.rng)?;
        info!(?human, ?placed, "game started");
        self.begin(human, grid);
        Ok(())
    }

    /// Begin play on a board that already holds every unit, such as a prepared scenario.
    ///
    /// Fails with [`InitError::NoUnitsPlaced`] if some faction has no units.
    pub fn start_scenario(&mut self, human: Option<Faction>, grid: Grid) -> GameResult<()> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        self.check_grid(&grid)?;
        let counts = grid.unit_counts();
        if let Some(empty) = Faction::all().iter().find(|f| counts[f.index()] == 0) {
            return Err(InitError::NoUnitsPlaced(*empty).into());
        }
        info!(?human, ?counts, "scenario started");
        self.begin(human, grid);
        Ok(())
    }

    fn check_grid(&self, grid: &Grid) -> Result<(), InitError> {
        let expected = (self.settings.rows, self.settings.cols);
        let found = (grid.rows(), grid.cols());
        if expected != found {
            return Err(InitError::GridMismatch { expected, found });
        }
        Ok(())
    }

    fn begin(&mut self, human: Option<Faction>, grid: Grid) {
        self.grid = grid;
        self.human = human;
        self.turn = TurnState::new(human.unwrap_or_else(Faction::first));
        self.selection.clear();
        self.victory = VictoryEvaluator::new();
        self.ai_queue = None;
        self.started = true;
        self.mode = self.mode_for(self.turn.active);
        if self.mode == ControllerMode::RunningAi {
            self.notify(format!("{} AI is thinking...", self.turn.active), AI_NOTICE);
        }
        self.render();
    }

    fn mode_for(&self, faction: Faction) -> ControllerMode {
        if self.human == Some(faction) {
            ControllerMode::AwaitingHumanInput
        } else {
            ControllerMode::RunningAi
        }
    }

    // ==================== Human input ====================

    /// Handle a click on hex (`row`, `col`).
    ///
    /// In the select phase this picks a unit of the active faction. With a unit selected it
    /// moves, attacks, or cancels (clicking the selected unit again). Rejections are also
    /// shown as notices.
    pub fn select_hex(&mut self, row: i32, col: i32) -> GameResult<Vec<GameEvent>> {
        let result = self.try_select_hex(HexCoord::new(row, col));
        if let Err(err) = &result {
            debug!(row, col, error = %err, "selection rejected");
            let duration = match err {
                GameError::AiTurnInProgress => AI_NOTICE,
                _ => self.settings.notice_duration(),
            };
            self.notify(err.to_string(), duration);
        }
        result
    }

    fn try_select_hex(&mut self, coord: HexCoord) -> GameResult<Vec<GameEvent>> {
        self.check_playing()?;
        match self.mode {
            ControllerMode::AwaitingHumanInput => {}
            ControllerMode::RunningAi => return Err(GameError::AiTurnInProgress),
            ControllerMode::Idle => return Err(GameError::NotStarted),
        }
        if !self.grid.in_bounds(&coord) {
            return Err(GameError::OutOfBounds(coord));
        }
        if self.grid.terrain(&coord).is_rock() {
            return Err(GameError::InvalidSelection(SelectionReason::Impassable));
        }

        match self.turn.phase {
            Phase::Select => self.select_unit(coord),
            Phase::Move | Phase::Attack => self.choose_destination(coord),
        }
    }

    fn check_playing(&self) -> GameResult<()> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if self.victory.is_game_over() {
            return Err(GameError::GameOver);
        }
        Ok(())
    }

    fn select_unit(&mut self, coord: HexCoord) -> GameResult<Vec<GameEvent>> {
        self.selection.target = None;
        let Some(unit) = self.grid.unit(&coord) else {
            return Ok(Vec::new());
        };
        if unit.faction != self.turn.active {
            return Err(GameError::InvalidSelection(SelectionReason::WrongFaction));
        }
        if self.turn.has_acted(&coord) {
            return Err(GameError::InvalidSelection(SelectionReason::AlreadyActed));
        }
        if unit.newly_created {
            return Err(GameError::InvalidSelection(SelectionReason::NewlyCreated));
        }

        self.selection = SelectionState {
            selected: Some(coord),
            possible_moves: movement::possible_moves(&self.grid, coord),
            possible_attacks: combat::possible_attacks(&self.grid, coord),
            target: None,
        };
        self.turn.phase = Phase::Move;
        debug!(
            %coord,
            moves = self.selection.possible_moves.len(),
            attacks = self.selection.possible_attacks.len(),
            "unit selected"
        );
        self.render();
        Ok(vec![GameEvent::UnitSelected { coord }])
    }

    fn choose_destination(&mut self, coord: HexCoord) -> GameResult<Vec<GameEvent>> {
        let Some(selected) = self.selection.selected else {
            self.turn.phase = Phase::Select;
            return self.select_unit(coord);
        };

        if coord == selected {
            self.reset_selection();
            self.render();
            return Ok(vec![GameEvent::SelectionCancelled { coord }]);
        }

        let events = if self.selection.possible_moves.contains(&coord) {
            self.perform_move(selected, coord, Actor::Human)?
        } else if self.selection.possible_attacks.contains(&coord) {
            self.selection.target = Some(coord);
            self.turn.phase = Phase::Attack;
            self.render();
            self.perform_attack(selected, coord, Actor::Human)
        } else {
            debug!(
                %selected,
                %coord,
                terrain = %self.grid.terrain(&coord),
                occupied = self.grid.unit(&coord).is_some(),
                attacks = ?self.selection.possible_attacks,
                "destination rejected"
            );
            return Err(GameError::IllegalDestination(coord));
        };

        if !self.victory.is_game_over() {
            self.reset_selection();
        }
        self.render();
        Ok(events)
    }

    fn reset_selection(&mut self) {
        self.selection.clear();
        self.turn.phase = Phase::Select;
    }

    // ==================== Actions ====================

    /// Move the unit at `from` to `to`, then capture, reinforce, merge, and check victory.
    fn perform_move(&mut self, from: HexCoord, to: HexCoord, actor: Actor) -> GameResult<Vec<GameEvent>> {
        let Some(mover) = self.grid.unit(&from).cloned() else {
            return Err(GameError::IllegalDestination(to));
        };
        let faction = mover.faction;
        let mut events = vec![GameEvent::UnitMoved {
            faction,
            unit_type: mover.unit_type,
            from,
            to,
        }];

        if self.grid.unit(&to).is_some() {
            // Moving onto a friendly unit only happens when it completes a merge
            let plan = merge::plan_merge_by_move(&self.grid, from, to)?;
            self.capture(to, faction, &mut events);
            match merge::apply_merge(&mut self.grid, plan) {
                Ok(outcome) => self.announce_merge(outcome, &mut events),
                Err(err) => self.announce_merge_failure(to, err.into(), &mut events),
            }
        } else {
            self.grid
                .move_unit(&from, &to)
                .map_err(|_| GameError::IllegalDestination(to))?;
            if actor == Actor::Human {
                self.notify(
                    format!("Moved {} to {}", mover.unit_type.name(), to),
                    self.settings.notice_duration(),
                );
            }
            self.capture(to, faction, &mut events);
            match merge::check_and_merge(&mut self.grid, to) {
                Ok(Some(outcome)) => self.announce_merge(outcome, &mut events),
                Ok(None) => {}
                Err(err) => self.announce_merge_failure(to, err.into(), &mut events),
            }
        }

        self.turn.mark_acted(to);
        info!(%faction, %from, %to, "unit moved");
        self.check_victory(&mut events);
        Ok(events)
    }

    fn capture(&mut self, coord: HexCoord, faction: Faction, events: &mut Vec<GameEvent>) {
        let previous = self.grid.get(&coord).and_then(|h| h.owner);
        let capture = territory::capture(&mut self.grid, coord, faction, &mut self.rng);
        if capture.changed_owner() {
            events.push(GameEvent::HexCaptured {
                coord,
                faction,
                previous,
            });
        }
        if let Capture::Neutral { spawned: Some(at) } = capture {
            events.push(GameEvent::UnitSpawned { coord: at, faction });
            self.notify(
                format!("{faction} captured neutral territory! New infantry deployed."),
                self.settings.notice_duration(),
            );
        }
    }

    fn announce_merge(&mut self, outcome: MergeOutcome, events: &mut Vec<GameEvent>) {
        self.notify(outcome.describe(), self.settings.notice_duration());
        events.push(GameEvent::UnitsMerged {
            center: outcome.center,
            faction: outcome.faction,
            from: outcome.from,
            to: outcome.to,
            consumed: outcome.consumed.len(),
        });
    }

    fn announce_merge_failure(&mut self, center: HexCoord, err: GameError, events: &mut Vec<GameEvent>) {
        error!(%center, error = %err, "merge failed");
        let reason = err.to_string();
        self.notify(reason.clone(), self.settings.notice_duration());
        events.push(GameEvent::MergeFailed { center, reason });
    }

    /// Resolve an attack from `from` on `to` and check victory.
    fn perform_attack(&mut self, from: HexCoord, to: HexCoord, actor: Actor) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let Some(result) = combat::resolve_attack(&mut self.grid, from, to) else {
            return events;
        };
        self.announce_attack(&result, actor);
        events.push(GameEvent::Attacked {
            from,
            to,
            damage: result.damage,
            remaining_health: result.remaining_health,
        });
        if result.defender_destroyed {
            events.push(GameEvent::UnitDestroyed {
                coord: to,
                faction: result.defender_faction,
                unit_type: result.defender_type,
            });
        }
        self.turn.mark_acted(from);
        self.check_victory(&mut events);
        events
    }

    fn announce_attack(&mut self, result: &CombatResult, actor: Actor) {
        let duration = self.settings.notice_duration();
        match actor {
            Actor::Human => {
                self.notify(format!("Dealt {} damage", result.damage), duration);
                if result.defender_destroyed {
                    self.notify(
                        format!(
                            "{}'s {} defeated",
                            result.defender_faction,
                            result.defender_type.name()
                        ),
                        duration,
                    );
                }
            }
            Actor::Ai => {
                self.notify(
                    format!(
                        "{} {} attacks {} {}, deals {} damage.",
                        result.attacker_faction,
                        result.attacker_type.name(),
                        result.defender_faction,
                        result.defender_type.name(),
                        result.damage
                    ),
                    duration,
                );
                if result.defender_destroyed {
                    self.notify(
                        format!(
                            "{} destroyed {}'s {}",
                            result.attacker_faction,
                            result.defender_faction,
                            result.defender_type.name()
                        ),
                        duration,
                    );
                }
            }
        }
    }

    fn check_victory(&mut self, events: &mut Vec<GameEvent>) {
        let report = self.victory.evaluate(&self.grid);
        for (faction, elimination) in report.eliminated {
            let text = match elimination {
                Elimination::UnitsLost => format!("All units of {faction} faction have been eliminated!"),
                Elimination::Complete => format!("{faction} faction has been completely eliminated!"),
            };
            self.notify(text, ELIMINATION_NOTICE);
            events.push(GameEvent::FactionEliminated { faction, elimination });
        }

        if let Some(outcome) = report.game_over {
            let winner = outcome.winner();
            self.mode = ControllerMode::Idle;
            self.ai_queue = None;
            self.selection.clear();
            self.turn.phase = Phase::Select;
            self.game_over_sink.game_over(winner);
            events.push(GameEvent::GameOver { winner });
        }
    }

    // ==================== Turn flow ====================

    /// End the human faction's turn.
    pub fn end_turn(&mut self) -> GameResult<TurnChange> {
        self.check_playing()?;
        match self.mode {
            ControllerMode::AwaitingHumanInput => Ok(self.advance_turn()),
            ControllerMode::RunningAi => Err(GameError::AiTurnInProgress),
            ControllerMode::Idle => Err(GameError::NotStarted),
        }
    }

    /// Pass play to the next faction.
    ///
    /// Clears the selection and the per-turn actions, and lets every newly created unit act
    /// from now on.
    fn advance_turn(&mut self) -> TurnChange {
        self.selection.clear();
        self.ai_queue = None;
        for hex in self.grid.iter_mut() {
            if let Some(unit) = hex.unit.as_mut() {
                unit.newly_created = false;
            }
        }

        let previous = self.turn.active;
        self.turn.advance();
        let next = self.turn.active;
        self.mode = self.mode_for(next);
        info!(%previous, %next, turn = self.turn.number, "turn ended");

        let handoff = match self.mode {
            ControllerMode::RunningAi => {
                self.notify(format!("{next} AI is thinking..."), AI_NOTICE);
                Handoff::Ai {
                    delay: self.settings.ai_start_delay(),
                }
            }
            _ => Handoff::Human,
        };
        self.render();

        TurnChange {
            previous,
            next,
            turn: self.turn.number,
            handoff,
        }
    }

    // ==================== Scripted factions ====================

    /// Queue the active scripted faction's eligible units. Returns how many will act.
    pub fn begin_ai_turn(&mut self) -> GameResult<usize> {
        self.check_playing()?;
        if self.mode != ControllerMode::RunningAi {
            return Err(GameError::NotAiTurn);
        }
        let queue: VecDeque<HexCoord> =
            ai::eligible_units(&self.grid, self.turn.active, |c| self.turn.has_acted(c)).collect();
        let count = queue.len();
        debug!(faction = %self.turn.active, units = count, "scripted turn begins");
        self.ai_queue = Some(queue);
        Ok(count)
    }

    /// Let the next queued unit act, or end the turn when none are left.
    pub fn step_ai(&mut self) -> GameResult<AiStep> {
        if let Some(outcome) = self.victory.outcome() {
            return Ok(AiStep::GameOver(outcome));
        }
        if self.mode != ControllerMode::RunningAi {
            self.check_playing()?;
            return Err(GameError::NotAiTurn);
        }
        if self.ai_queue.is_none() {
            self.begin_ai_turn()?;
        }

        let Some(origin) = self.next_ai_unit() else {
            return Ok(AiStep::Finished(self.advance_turn()));
        };

        let action = ai::choose_action(&self.grid, origin);
        let events = match action {
            AiAction::Attack { from, to } => self.perform_attack(from, to, Actor::Ai),
            AiAction::Advance { from, to } => self.perform_move(from, to, Actor::Ai)?,
            AiAction::Idle { at } => {
                debug!(%at, "unit holds position");
                Vec::new()
            }
        };
        self.render();
        Ok(AiStep::Acted { action, events })
    }

    /// Pop queued units until one still stands where it was and may act.
    fn next_ai_unit(&mut self) -> Option<HexCoord> {
        let active = self.turn.active;
        loop {
            let coord = self.ai_queue.as_mut()?.pop_front()?;
            let eligible = self
                .grid
                .unit(&coord)
                .is_some_and(|u| u.faction == active && !u.newly_created)
                && !self.turn.has_acted(&coord);
            if eligible {
                return Some(coord);
            }
            debug!(%coord, "queued unit no longer eligible");
        }
    }

    /// Run the whole scripted turn without pauses.
    ///
    /// Returns the turn change, or `None` if the game ended during the turn.
    pub fn run_ai_turn(&mut self) -> GameResult<Option<TurnChange>> {
        loop {
            match self.step_ai()? {
                AiStep::Acted { .. } => {}
                AiStep::Finished(change) => return Ok(Some(change)),
                AiStep::GameOver(_) => return Ok(None),
            }
        }
    }

    /// Run scripted turns until a human faction is up or the game ends.
    pub fn run_until_human(&mut self) -> GameResult<Option<GameOutcome>> {
        while self.mode == ControllerMode::RunningAi {
            if self.run_ai_turn()?.is_none() {
                break;
            }
        }
        Ok(self.victory.outcome())
    }

    // ==================== Presentation ====================

    fn notify(&mut self, text: impl Into<String>, duration: Duration) {
        let notice = Notice::new(text, duration);
        debug!(text = %notice.text, "notice");
        self.status.notify(&notice);
    }

    /// Snapshot of what a renderer would be handed right now.
    pub fn frame(&self) -> RenderFrame<'_> {
        RenderFrame {
            grid: &self.grid,
            turn: &self.turn,
            selection: &self.selection,
            mode: self.mode,
            human: self.human,
        }
    }

    fn render(&mut self) {
        let frame = RenderFrame {
            grid: &self.grid,
            turn: &self.turn,
            selection: &self.selection,
            mode: self.mode,
            human: self.human,
        };
        self.renderer.render(&frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoTerrain;
    use crate::terrain::Terrain;
    use crate::unit::{Unit, UnitType};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Notices(Rc<RefCell<Vec<String>>>);

    impl StatusSink for Notices {
        fn notify(&mut self, notice: &Notice) {
            self.0.borrow_mut().push(notice.text.clone());
        }
    }

    fn c(row: i32, col: i32) -> HexCoord {
        HexCoord::new(row, col)
    }

    /// A started session on a plain board holding exactly `units`.
    fn session_with(human: Option<Faction>, units: &[(i32, i32, UnitType, Faction)]) -> Session {
        let mut grid = Grid::new(10, 15);
        for (row, col, unit_type, faction) in units {
            grid.place_unit(c(*row, *col), Unit::new(*unit_type, *faction)).unwrap();
        }
        let mut session = Session::new(GameSettings::seeded(7)).unwrap();
        session.start_scenario(human, grid).unwrap();
        session
    }

    fn four_corners() -> Vec<(i32, i32, UnitType, Faction)> {
        vec![
            (9, 0, UnitType::Infantry, Faction::Us),
            (9, 14, UnitType::Infantry, Faction::Rok),
            (0, 0, UnitType::Infantry, Faction::Dprk),
            (0, 14, UnitType::Infantry, Faction::Pla),
        ]
    }

    #[test]
    fn test_start_places_forces_and_waits_for_human() {
        let mut session = Session::new(GameSettings::seeded(1)).unwrap();
        session.start(Some(Faction::Rok), &mut NoTerrain).unwrap();
        assert_eq!(session.turn().active, Faction::Rok);
        assert_eq!(session.mode(), ControllerMode::AwaitingHumanInput);
        assert!(session.grid().unit_counts().iter().all(|n| *n > 0));
        assert_eq!(
            session.start(Some(Faction::Rok), &mut NoTerrain),
            Err(GameError::AlreadyStarted)
        );
    }

    #[test]
    fn test_select_before_start() {
        let mut session = Session::new(GameSettings::seeded(1)).unwrap();
        assert_eq!(session.select_hex(0, 0), Err(GameError::NotStarted));
    }

    #[test]
    fn test_select_then_cancel() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        let events = session.select_hex(9, 0).unwrap();
        assert_eq!(events, vec![GameEvent::UnitSelected { coord: c(9, 0) }]);
        assert_eq!(session.turn().phase, Phase::Move);
        assert!(session.selection().possible_moves.contains(&c(8, 0)));

        let events = session.select_hex(9, 0).unwrap();
        assert_eq!(events, vec![GameEvent::SelectionCancelled { coord: c(9, 0) }]);
        assert_eq!(session.turn().phase, Phase::Select);
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_selection_rejections_notify() {
        let notices = Notices::default();
        let mut session = session_with(Some(Faction::Us), &four_corners()).with_status(notices.clone());

        assert_eq!(
            session.select_hex(0, 0),
            Err(GameError::InvalidSelection(SelectionReason::WrongFaction))
        );
        session.grid.get_mut(&c(5, 5)).unwrap().terrain = Terrain::Rock;
        assert_eq!(
            session.select_hex(5, 5),
            Err(GameError::InvalidSelection(SelectionReason::Impassable))
        );
        assert_eq!(session.select_hex(20, 0), Err(GameError::OutOfBounds(c(20, 0))));

        let texts = notices.0.borrow();
        assert_eq!(texts[0], "Cannot select units of another faction");
        assert_eq!(texts[1], "Rocks are impassable");
    }

    #[test]
    fn test_empty_hex_in_select_phase_is_ignored() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        assert_eq!(session.select_hex(5, 5), Ok(Vec::new()));
        assert_eq!(session.turn().phase, Phase::Select);
    }

    #[test]
    fn test_move_captures_and_marks_acted() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        session.select_hex(9, 0).unwrap();
        let events = session.select_hex(8, 0).unwrap();

        assert!(matches!(events[0], GameEvent::UnitMoved { .. }));
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::HexCaptured { coord, previous: None, .. } if *coord == c(8, 0)
        )));
        assert_eq!(session.grid().get(&c(8, 0)).unwrap().owner, Some(Faction::Us));
        assert!(session.turn().has_acted(&c(8, 0)));
        assert!(session.selection().is_empty());
        assert_eq!(
            session.select_hex(8, 0),
            Err(GameError::InvalidSelection(SelectionReason::AlreadyActed))
        );
    }

    #[test]
    fn test_illegal_destination_keeps_selection() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        session.select_hex(9, 0).unwrap();
        assert_eq!(session.select_hex(0, 7), Err(GameError::IllegalDestination(c(0, 7))));
        assert_eq!(session.selection().selected, Some(c(9, 0)));
        assert_eq!(session.turn().phase, Phase::Move);
    }

    #[test]
    fn test_attack_resolves_and_returns_to_select() {
        let mut units = four_corners();
        units.push((8, 0, UnitType::Tank, Faction::Dprk));
        let mut session = session_with(Some(Faction::Us), &units);
        session.select_hex(9, 0).unwrap();
        let events = session.select_hex(8, 0).unwrap();

        assert_eq!(
            events,
            vec![GameEvent::Attacked {
                from: c(9, 0),
                to: c(8, 0),
                damage: 5,
                remaining_health: 495,
            }]
        );
        assert!(session.turn().has_acted(&c(9, 0)));
        assert_eq!(session.turn().phase, Phase::Select);
    }

    #[test]
    fn test_end_turn_hands_off_to_ai() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        let change = session.end_turn().unwrap();
        assert_eq!(change.next, Faction::Rok);
        assert_eq!(
            change.handoff,
            Handoff::Ai {
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(session.select_hex(9, 0), Err(GameError::AiTurnInProgress));
        assert_eq!(session.end_turn(), Err(GameError::AiTurnInProgress));
        assert_eq!(
            change.event(),
            GameEvent::TurnEnded {
                faction: Faction::Us,
                next: Faction::Rok,
                turn: 1
            }
        );
    }

    #[test]
    fn test_end_turn_clears_newly_created() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        session.grid.place_unit(c(5, 5), Unit::spawned(UnitType::Tank, Faction::Dprk)).unwrap();
        session.end_turn().unwrap();
        assert!(!session.grid().unit(&c(5, 5)).unwrap().newly_created);
    }

    #[test]
    fn test_ai_turns_return_to_human() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        session.end_turn().unwrap();
        assert_eq!(session.run_until_human().unwrap(), None);
        assert_eq!(session.turn().active, Faction::Us);
        assert_eq!(session.turn().number, 2);
        assert_eq!(session.mode(), ControllerMode::AwaitingHumanInput);
    }

    #[test]
    fn test_step_ai_requires_ai_mode() {
        let mut session = session_with(Some(Faction::Us), &four_corners());
        assert_eq!(session.step_ai(), Err(GameError::NotAiTurn));
    }

    #[test]
    fn test_last_kill_ends_game() {
        let units = vec![
            (5, 5, UnitType::Tank, Faction::Us),
            (5, 6, UnitType::Infantry, Faction::Rok),
            (0, 0, UnitType::Infantry, Faction::Dprk),
            (0, 14, UnitType::Infantry, Faction::Pla),
        ];
        let mut session = session_with(Some(Faction::Us), &units);
        session.grid.take_unit(&c(0, 0));
        session.grid.take_unit(&c(0, 14));
        session.grid.unit_mut(&c(5, 6)).unwrap().health = 1;
        session.select_hex(5, 5).unwrap();
        let events = session.select_hex(5, 6).unwrap();

        assert!(events.contains(&GameEvent::GameOver {
            winner: Some(Faction::Us)
        }));
        assert_eq!(session.outcome(), Some(GameOutcome::Victory(Faction::Us)));
        assert_eq!(session.mode(), ControllerMode::Idle);
        assert_eq!(session.select_hex(5, 5), Err(GameError::GameOver));
        assert_eq!(session.end_turn(), Err(GameError::GameOver));
    }

    #[test]
    fn test_grid_size_must_match_settings() {
        let mut session = Session::new(GameSettings::seeded(1)).unwrap();
        assert!(matches!(
            session.start_with_grid(None, Grid::new(4, 4)),
            Err(GameError::Init(InitError::GridMismatch { .. }))
        ));
        assert!(!session.is_started());
    }

    #[test]
    fn test_scenario_requires_every_faction() {
        let mut grid = Grid::new(10, 15);
        grid.place_unit(c(1, 1), Unit::new(UnitType::Infantry, Faction::Us)).unwrap();
        let mut session = Session::new(GameSettings::seeded(1)).unwrap();
        assert_eq!(
            session.start_scenario(None, grid),
            Err(GameError::Init(InitError::NoUnitsPlaced(Faction::Rok)))
        );
    }

    #[test]
    fn test_start_with_grid_places_forces() {
        let mut session = Session::new(GameSettings::seeded(3)).unwrap();
        session.start_with_grid(None, Grid::new(10, 15)).unwrap();
        assert_eq!(session.grid().unit_total(), 20);
        assert_eq!(session.mode(), ControllerMode::RunningAi);
        assert_eq!(session.turn().active, Faction::Us);
    }
}
