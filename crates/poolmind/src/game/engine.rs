//! Game engine: turns the tracker's identity stream into pot events.
//!
//! A ball is potted when it has been absent for exactly `disappear_for_pot` frames
//! and its last recorded position lies within a pocket's tolerated capture radius.
//! Every pot from one update goes to the rules engine as a single batch.

use glam::Vec2;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::api::config::GameConfig;
use crate::api::event::{Event, EventKind, EventLog};
use crate::api::types::{BallId, ColorClass};
use crate::core::table::{Pocket, TableGeometry};
use crate::core::tracker::Tracks;
use crate::game::rules::EightBallRules;
use crate::game::state::{GameSnapshot, Score};

/// Positions kept per identity.
pub const HISTORY_LEN: usize = 120;

pub struct GameEngine {
    config: GameConfig,
    pockets: Vec<Pocket>,
    history: BTreeMap<BallId, VecDeque<Vec2>>,
    disappear_counts: BTreeMap<BallId, u32>,
    potted: BTreeSet<BallId>,
    ball_types: BTreeMap<BallId, ColorClass>,
    score: Score,
    last_shot_potted: BTreeSet<BallId>,
    shot_in_progress: bool,
    events: EventLog,
    rules: EightBallRules,
}

impl GameEngine {
    /// Engine with the six standard pockets of `table`.
    pub fn new(table: &TableGeometry, config: GameConfig) -> Self {
        let pockets = table.default_pockets(config.pocket_radius);
        Self::with_pockets(pockets, config)
    }

    /// Engine with an explicit pocket layout.
    pub fn with_pockets(pockets: Vec<Pocket>, config: GameConfig) -> Self {
        Self {
            config,
            pockets,
            history: BTreeMap::new(),
            disappear_counts: BTreeMap::new(),
            potted: BTreeSet::new(),
            ball_types: BTreeMap::new(),
            score: Score::default(),
            last_shot_potted: BTreeSet::new(),
            shot_in_progress: false,
            events: EventLog::new(),
            rules: EightBallRules::new(),
        }
    }

    /// Feed one frame of tracker output.
    pub fn update(&mut self, tracks: &Tracks) {
        if !tracks.is_empty() && !self.shot_in_progress {
            self.shot_in_progress = true;
            self.last_shot_potted.clear();
        }

        for (id, ball) in tracks {
            self.ball_types.insert(*id, ball.color);
            let history = self.history.entry(*id).or_default();
            history.push_back(ball.pos);
            while history.len() > HISTORY_LEN {
                history.pop_front();
            }
            self.disappear_counts.insert(*id, 0);
        }

        let mut new_pots = BTreeSet::new();
        let absent: Vec<BallId> = self
            .disappear_counts
            .keys()
            .filter(|id| !tracks.contains_key(id) && !self.potted.contains(id))
            .copied()
            .collect();

        for id in absent {
            let count = {
                let count = self.disappear_counts.entry(id).or_insert(0);
                *count += 1;
                *count
            };
            if count == self.config.disappear_for_pot && self.was_near_pocket(id) {
                self.pot(id);
                new_pots.insert(id);
            }
        }

        if self.config.enable_8ball_rules && !new_pots.is_empty() {
            let cue_potted = new_pots
                .iter()
                .any(|id| self.ball_types.get(id) == Some(&ColorClass::Cue));
            let outcome = self.rules.handle_shot(&new_pots, &self.ball_types, cue_potted);
            self.events.extend(outcome.events);
        }
    }

    fn pot(&mut self, id: BallId) {
        let ball_type = self.ball_type(id);
        self.potted.insert(id);
        self.last_shot_potted.insert(id);
        self.score.record(ball_type);
        log::info!("engine: {} ball {} potted", ball_type, id);

        self.events.push(
            Event::new(EventKind::Pot, format!("{} ball ID {}", ball_type, id))
                .with_ball(id)
                .with_ball_type(ball_type),
        );
        if ball_type == ColorClass::Cue {
            log::info!("engine: scratch, cue ball {} potted", id);
            self.events.push(Event::new(EventKind::Scratch, "Cue ball potted").with_ball(id));
        }
    }

    /// Whether the last recorded position of `id` is inside a pocket's tolerance.
    /// An identity with no history is never near a pocket.
    pub fn was_near_pocket(&self, id: BallId) -> bool {
        let Some(last) = self.history.get(&id).and_then(|h| h.back()) else {
            return false;
        };
        self.pockets.iter().any(|p| p.captures(*last))
    }

    pub fn state(&self) -> GameSnapshot {
        let mut active_balls = 0;
        let mut active_by_type: BTreeMap<ColorClass, usize> = BTreeMap::new();
        for id in self.history.keys().filter(|id| !self.potted.contains(id)) {
            active_balls += 1;
            *active_by_type.entry(self.ball_type(*id)).or_default() += 1;
        }
        let active = |c: ColorClass| active_by_type.get(&c).copied().unwrap_or(0);

        GameSnapshot {
            potted: self.score.potted,
            cue_potted: self.score.cue,
            solid_potted: self.score.solid,
            stripe_potted: self.score.stripe,
            eight_potted: self.score.eight,
            active_balls,
            active_cue: active(ColorClass::Cue),
            active_solid: active(ColorClass::Solid),
            active_stripe: active(ColorClass::Stripe),
            total_tracked: self.history.len(),
            rules: self.config.enable_8ball_rules.then(|| self.rules.summary()),
        }
    }

    /// Take every buffered event.
    pub fn consume_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Start a new game. Track history and disappearance counters survive so a
    /// re-rack does not disturb the vision side.
    pub fn reset_game(&mut self) {
        self.potted.clear();
        self.last_shot_potted.clear();
        self.shot_in_progress = false;
        self.score = Score::default();
        if self.config.enable_8ball_rules {
            self.rules.reset();
        }
        log::info!("engine: game reset");
        self.events.push(Event::new(EventKind::GameReset, "New game started"));
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    pub fn is_potted(&self, id: BallId) -> bool {
        self.potted.contains(&id)
    }

    pub fn potted_ids(&self) -> &BTreeSet<BallId> {
        &self.potted
    }

    pub fn disappear_count(&self, id: BallId) -> Option<u32> {
        self.disappear_counts.get(&id).copied()
    }

    pub fn history(&self, id: BallId) -> Option<&VecDeque<Vec2>> {
        self.history.get(&id)
    }

    /// Last type recorded for `id`, `Unknown` if never seen.
    pub fn ball_type(&self, id: BallId) -> ColorClass {
        self.ball_types.get(&id).copied().unwrap_or_default()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn rules(&self) -> &EightBallRules {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut EightBallRules {
        &mut self.rules
    }

    pub fn last_shot_potted(&self) -> &BTreeSet<BallId> {
        &self.last_shot_potted
    }

    pub fn shot_in_progress(&self) -> bool {
        self.shot_in_progress
    }
}
