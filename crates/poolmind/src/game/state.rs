use serde::Serialize;

use crate::api::types::ColorClass;
use crate::game::rules::RulesSummary;

/// Pot counters for the current game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub potted: u32,
    pub cue: u32,
    pub solid: u32,
    pub stripe: u32,
    pub eight: u32,
    pub unknown: u32,
}

impl Score {
    pub fn record(&mut self, color: ColorClass) {
        self.potted += 1;
        *self.slot(color) += 1;
    }

    pub fn potted_of(&self, color: ColorClass) -> u32 {
        match color {
            ColorClass::Cue => self.cue,
            ColorClass::Solid => self.solid,
            ColorClass::Stripe => self.stripe,
            ColorClass::Eight => self.eight,
            ColorClass::Unknown => self.unknown,
        }
    }

    fn slot(&mut self, color: ColorClass) -> &mut u32 {
        match color {
            ColorClass::Cue => &mut self.cue,
            ColorClass::Solid => &mut self.solid,
            ColorClass::Stripe => &mut self.stripe,
            ColorClass::Eight => &mut self.eight,
            ColorClass::Unknown => &mut self.unknown,
        }
    }
}

/// Read-only engine snapshot handed to the UI layer.
/// Serializes flat; the rules fields are present only when 8-ball rules are on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub potted: u32,
    pub cue_potted: u32,
    pub solid_potted: u32,
    pub stripe_potted: u32,
    pub eight_potted: u32,
    /// Balls seen at some point and not potted.
    pub active_balls: usize,
    pub active_cue: usize,
    pub active_solid: usize,
    pub active_stripe: usize,
    /// Every identity the engine has ever recorded.
    pub total_tracked: usize,
    #[serde(flatten)]
    pub rules: Option<RulesSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::rules::EightBallRules;

    #[test]
    fn score_records_by_type() {
        let mut score = Score::default();
        score.record(ColorClass::Cue);
        score.record(ColorClass::Solid);
        score.record(ColorClass::Solid);
        assert_eq!(score.potted, 3);
        assert_eq!(score.potted_of(ColorClass::Solid), 2);
        assert_eq!(score.potted_of(ColorClass::Cue), 1);
        assert_eq!(score.potted_of(ColorClass::Stripe), 0);
    }

    #[test]
    fn snapshot_flattens_rules() {
        let snap = GameSnapshot {
            potted: 1,
            rules: Some(EightBallRules::new().summary()),
            ..Default::default()
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["potted"], 1);
        assert_eq!(json["game_state"], "break");
        assert_eq!(json["current_player"], 1);

        let bare = serde_json::to_value(GameSnapshot::default()).unwrap();
        assert!(bare.get("game_state").is_none());
        assert_eq!(bare["total_tracked"], 0);
    }
}
