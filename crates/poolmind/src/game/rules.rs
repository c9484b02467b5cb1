//! 8-ball rules state machine.
//!
//! `Break -> OpenTable -> {SolidPlayer | StripePlayer} -> EightBall -> GameOver`
//!
//! Each call to [`EightBallRules::handle_shot`] consumes the balls potted since the
//! last call and advances the state. Balls of unknown type are ignored.
//!
//! Nothing moves a game from a group state to `EightBall` automatically: the rules
//! do not see which balls are still on the table. Callers that know a group has
//! been cleared use [`EightBallRules::begin_eight_ball`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::api::event::{Event, EventKind};
use crate::api::types::{BallGroup, BallId, ColorClass, Player};

/// Phase of an 8-ball game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Break,
    OpenTable,
    /// Groups are assigned; the table was opened on solids.
    SolidPlayer,
    /// Groups are assigned; the table was opened on stripes.
    StripePlayer,
    EightBall,
    GameOver { winner: Player },
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::Break => "break",
            GameState::OpenTable => "open_table",
            GameState::SolidPlayer => "solid_player",
            GameState::StripePlayer => "stripe_player",
            GameState::EightBall => "eight_ball",
            GameState::GameOver { .. } => "game_over",
        }
    }

    pub fn winner(&self) -> Option<Player> {
        match self {
            GameState::GameOver { winner } => Some(*winner),
            _ => None,
        }
    }

    fn for_group(group: BallGroup) -> Self {
        match group {
            BallGroup::Solid => GameState::SolidPlayer,
            BallGroup::Stripe => GameState::StripePlayer,
        }
    }
}

/// Result of a single shot.
#[derive(Debug, Clone)]
pub struct ShotOutcome {
    pub events: Vec<Event>,
    pub state: GameState,
    pub current_player: Player,
}

/// Serializable view of the rules state, merged into the engine snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesSummary {
    pub game_state: String,
    pub current_player: Player,
    /// Player number -> assigned group.
    pub player_types: BTreeMap<u8, BallGroup>,
    pub game_won: bool,
    pub winner: Option<Player>,
    pub scratched: bool,
}

#[derive(Debug, Clone)]
pub struct EightBallRules {
    state: GameState,
    current_player: Player,
    groups: BTreeMap<Player, BallGroup>,
    scratched: bool,
}

impl EightBallRules {
    pub fn new() -> Self {
        Self {
            state: GameState::Break,
            current_player: Player::One,
            groups: BTreeMap::new(),
            scratched: false,
        }
    }

    /// Back to the break, player 1 shooting, no groups.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn group_of(&self, player: Player) -> Option<BallGroup> {
        self.groups.get(&player).copied()
    }

    pub fn scratched(&self) -> bool {
        self.scratched
    }

    pub fn winner(&self) -> Option<Player> {
        self.state.winner()
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::GameOver { .. })
    }

    /// Process one shot. `ball_types` must cover the potted ids; ids missing from it
    /// count as unknown.
    pub fn handle_shot(
        &mut self,
        potted: &BTreeSet<BallId>,
        ball_types: &BTreeMap<BallId, ColorClass>,
        cue_potted: bool,
    ) -> ShotOutcome {
        let typed: Vec<(BallId, ColorClass)> = potted
            .iter()
            .filter_map(|id| match ball_types.get(id) {
                Some(ColorClass::Unknown) | None => None,
                Some(color) => Some((*id, *color)),
            })
            .collect();

        self.scratched = cue_potted;

        let mut events = Vec::new();
        match self.state {
            GameState::Break => self.shot_on_break(&typed, &mut events),
            GameState::OpenTable => self.shot_on_open_table(&typed, &mut events),
            GameState::SolidPlayer | GameState::StripePlayer => {
                self.shot_on_group(&typed, &mut events)
            }
            GameState::EightBall => self.shot_on_eight(&typed, &mut events),
            GameState::GameOver { .. } => {
                log::debug!("rules: shot ignored, game is over");
            }
        }

        log::debug!(
            "rules: {} potted, scratch={} -> {} (player {})",
            typed.len(), cue_potted, self.state.name(), self.current_player
        );

        ShotOutcome {
            events,
            state: self.state,
            current_player: self.current_player,
        }
    }

    /// Move a group-phase game onto the 8-ball. Returns false in any other state.
    pub fn begin_eight_ball(&mut self) -> bool {
        match self.state {
            GameState::SolidPlayer | GameState::StripePlayer => {
                self.state = GameState::EightBall;
                true
            }
            _ => false,
        }
    }

    pub fn summary(&self) -> RulesSummary {
        RulesSummary {
            game_state: self.state.name().to_string(),
            current_player: self.current_player,
            player_types: self.groups.iter().map(|(p, g)| (p.number(), *g)).collect(),
            game_won: self.is_over(),
            winner: self.winner(),
            scratched: self.scratched,
        }
    }

    fn shot_on_break(&mut self, typed: &[(BallId, ColorClass)], events: &mut Vec<Event>) {
        if contains_eight(typed) {
            events.push(Event::new(
                EventKind::EightBallBreakLoss,
                "8-ball potted on break - game over",
            ));
            self.finish(self.current_player.opponent());
        } else if self.scratched {
            events.push(Event::new(EventKind::BreakScratch, "Scratch on break"));
            self.switch_player();
            self.state = GameState::OpenTable;
        } else if !typed.is_empty() {
            events.push(Event::new(
                EventKind::BreakMade,
                format!("{} balls potted on break", typed.len()),
            ));
            self.state = GameState::OpenTable;
        } else {
            events.push(Event::new(EventKind::BreakMiss, "No balls potted on break"));
            self.switch_player();
            self.state = GameState::OpenTable;
        }
    }

    fn shot_on_open_table(&mut self, typed: &[(BallId, ColorClass)], events: &mut Vec<Event>) {
        if typed.is_empty() || self.scratched {
            events.push(Event::new(EventKind::Miss, "No balls made or scratch"));
            self.switch_player();
            return;
        }

        // Several groups in one shot: the lowest ball id decides.
        let Some(group) = typed.iter().find_map(|(_, color)| color.group()) else {
            log::warn!("rules: open table shot potted no group ball, table stays open");
            return;
        };

        let shooter = self.current_player;
        self.groups.insert(shooter, group);
        self.groups.insert(shooter.opponent(), group.opposite());
        self.state = GameState::for_group(group);
        log::info!("rules: player {} assigned {}", shooter, group.plural());
        events.push(Event::new(
            EventKind::GroupAssigned,
            format!("Player {} assigned {}", shooter, group.plural()),
        ));
    }

    fn shot_on_group(&mut self, typed: &[(BallId, ColorClass)], events: &mut Vec<Event>) {
        let own = self.group_of(self.current_player).map(BallGroup::color);
        let own_potted = typed.iter().filter(|(_, c)| Some(*c) == own).count();
        let opponent_potted = typed
            .iter()
            .filter(|(_, c)| Some(*c) != own && *c != ColorClass::Cue)
            .count();

        if self.scratched || opponent_potted > 0 {
            events.push(Event::new(EventKind::Foul, "Scratch or opponent ball potted"));
            self.switch_player();
        } else if own_potted > 0 {
            events.push(Event::new(
                EventKind::LegalPot,
                format!("Player {} potted {} ball(s)", self.current_player, own_potted),
            ));
        } else {
            events.push(Event::new(EventKind::Miss, "No balls made"));
            self.switch_player();
        }
    }

    fn shot_on_eight(&mut self, typed: &[(BallId, ColorClass)], events: &mut Vec<Event>) {
        if contains_eight(typed) {
            if self.scratched {
                events.push(Event::new(
                    EventKind::EightBallLoss,
                    "8-ball potted with scratch - game over",
                ));
                self.finish(self.current_player.opponent());
            } else {
                events.push(Event::new(
                    EventKind::EightBallWin,
                    format!("Player {} wins!", self.current_player),
                ));
                self.finish(self.current_player);
            }
        } else if self.scratched {
            events.push(Event::new(EventKind::Scratch, "Scratch on 8-ball attempt"));
            self.switch_player();
        } else {
            events.push(Event::new(EventKind::EightBallMiss, "8-ball attempt missed"));
            self.switch_player();
        }
    }

    fn finish(&mut self, winner: Player) {
        log::info!("rules: game over, player {} wins", winner);
        self.state = GameState::GameOver { winner };
    }

    fn switch_player(&mut self) {
        self.current_player = self.current_player.opponent();
    }
}

impl Default for EightBallRules {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_eight(typed: &[(BallId, ColorClass)]) -> bool {
    typed.iter().any(|(_, c)| *c == ColorClass::Eight)
}
