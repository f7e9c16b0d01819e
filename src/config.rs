use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::types::Player;

pub const DEFAULT_BOARD_SIZE: i32 = 8;
pub const DEFAULT_ROWS_PER_SIDE: i32 = 3;
pub const MAX_BOARD_SIZE: i32 = 64;

/// Where mandatory capture is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureRule {
    /// A piece that can capture offers only captures. Other pieces may still step.
    #[default]
    PerPiece,
    /// If any piece of the mover can capture, only capturing pieces may move.
    BoardWide,
}

/// Game setup accepted from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub rows_per_side: i32,
    pub capture_rule: CaptureRule,
    pub first_player: Player,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_SIZE,
            height: DEFAULT_BOARD_SIZE,
            rows_per_side: DEFAULT_ROWS_PER_SIDE,
            capture_rule: CaptureRule::PerPiece,
            first_player: Player::Black,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;

        if self.rows_per_side < 1 {
            return Err(EngineError::InvalidConfig(format!(
                "rows_per_side must be at least 1, got {}",
                self.rows_per_side
            )));
        }
        if self.rows_per_side > (self.height - 2) / 2 {
            return Err(EngineError::InvalidConfig(format!(
                "{} rows per side leave no gap on a board {} rows high",
                self.rows_per_side, self.height
            )));
        }

        Ok(())
    }
}

pub(crate) fn check_dimension(name: &str, value: i32) -> Result<()> {
    if !(4..=MAX_BOARD_SIZE).contains(&value) || value % 2 != 0 {
        return Err(EngineError::InvalidConfig(format!(
            "{name} must be even and between 4 and {MAX_BOARD_SIZE}, got {value}"
        )));
    }
    Ok(())
}
