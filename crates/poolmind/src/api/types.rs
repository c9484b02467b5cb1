use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a tracked ball. Allocated from 1 upward, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallId(pub u32);

impl fmt::Display for BallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse color class reported by the ball detector.
/// `Eight` is only produced by detectors that can single out the black ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    Cue,
    Solid,
    #[serde(alias = "striped")]
    Stripe,
    Eight,
    #[default]
    Unknown,
}

impl ColorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorClass::Cue => "cue",
            ColorClass::Solid => "solid",
            ColorClass::Stripe => "stripe",
            ColorClass::Eight => "eight",
            ColorClass::Unknown => "unknown",
        }
    }

    /// The 8-ball group this color belongs to, if any.
    pub fn group(self) -> Option<BallGroup> {
        match self {
            ColorClass::Solid => Some(BallGroup::Solid),
            ColorClass::Stripe => Some(BallGroup::Stripe),
            _ => None,
        }
    }
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ball group a player is assigned once the table is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallGroup {
    Solid,
    Stripe,
}

impl BallGroup {
    pub fn opposite(self) -> Self {
        match self {
            BallGroup::Solid => BallGroup::Stripe,
            BallGroup::Stripe => BallGroup::Solid,
        }
    }

    pub fn color(self) -> ColorClass {
        match self {
            BallGroup::Solid => ColorClass::Solid,
            BallGroup::Stripe => ColorClass::Stripe,
        }
    }

    /// Plural form used in event text ("solids", "stripes").
    pub fn plural(self) -> &'static str {
        match self {
            BallGroup::Solid => "solids",
            BallGroup::Stripe => "stripes",
        }
    }
}

/// One of the two players. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Player {
    #[default]
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.number()
    }
}

impl TryFrom<u8> for Player {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(format!("player must be 1 or 2, got {}", other)),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A single unlabeled ball observation for one frame, in canonical table space.
///
/// Deserializes from `{"x": .., "y": .., "r": .., "color": ..}` or from the
/// tuple forms `[x, y, r]` and `[x, y, r, "color"]`. A missing color is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DetectionRepr", into = "DetectionFields")]
pub struct Detection {
    pub pos: Vec2,
    pub radius: f32,
    pub color: ColorClass,
}

impl Detection {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius,
            color: ColorClass::Unknown,
        }
    }

    pub fn with_color(mut self, color: ColorClass) -> Self {
        self.color = color;
        self
    }
}

#[derive(Serialize, Deserialize)]
struct DetectionFields {
    x: f32,
    y: f32,
    r: f32,
    #[serde(default)]
    color: ColorClass,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionRepr {
    Fields(DetectionFields),
    Tuple4((f32, f32, f32, ColorClass)),
    Tuple3((f32, f32, f32)),
}

impl From<DetectionRepr> for Detection {
    fn from(repr: DetectionRepr) -> Self {
        match repr {
            DetectionRepr::Fields(f) => Detection::new(f.x, f.y, f.r).with_color(f.color),
            DetectionRepr::Tuple4((x, y, r, color)) => Detection::new(x, y, r).with_color(color),
            DetectionRepr::Tuple3((x, y, r)) => Detection::new(x, y, r),
        }
    }
}

impl From<Detection> for DetectionFields {
    fn from(d: Detection) -> Self {
        Self {
            x: d.pos.x,
            y: d.pos.y,
            r: d.radius,
            color: d.color,
        }
    }
}

/// Per-frame state of a tracked ball, handed out by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub pos: Vec2,
    pub radius: f32,
    pub color: ColorClass,
}

impl BallState {
    pub fn new(x: f32, y: f32, radius: f32, color: ColorClass) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius,
            color,
        }
    }
}

impl From<Detection> for BallState {
    fn from(d: Detection) -> Self {
        Self {
            pos: d.pos,
            radius: d.radius,
            color: d.color,
        }
    }
}
