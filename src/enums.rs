use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Stage numbers are 1..=4 in both games.
pub const STAGE_RANGE: RangeInclusive<i64> = 1..=4;

// =============================================================================
// Game Variant
// =============================================================================

/// Which game's stage set a level belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameVariant {
    Smb,
    LostLevels,
}

impl GameVariant {
    pub fn title(self) -> &'static str {
        match self {
            GameVariant::Smb => "Super Mario Bros.",
            GameVariant::LostLevels => "Super Mario Bros. 2 (Lost Levels)",
        }
    }

    /// Legal world range for targeting a stage of this variant.
    pub fn world_range(self) -> RangeInclusive<i64> {
        match self {
            GameVariant::Smb => 1..=8,
            GameVariant::LostLevels => 1..=12,
        }
    }

    /// World range used when building the default stage pool. Lost Levels is
    /// narrower than its nominal range because areas for worlds >= 5 cannot be
    /// resolved (see `decode_target`).
    pub fn default_worlds(self) -> RangeInclusive<i64> {
        match self {
            GameVariant::Smb => 1..=8,
            GameVariant::LostLevels => 1..=4,
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// =============================================================================
// ROM Mode
// =============================================================================

/// The ROM graphics mode loaded into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RomMode {
    Vanilla,
    Downsample,
    Pixel,
    Rectangle,
}

impl RomMode {
    pub const ALL: [RomMode; 4] = [
        RomMode::Vanilla,
        RomMode::Downsample,
        RomMode::Pixel,
        RomMode::Rectangle,
    ];

    /// Only the vanilla and downsample ROMs exist for Lost Levels.
    pub fn supports_lost_levels(self) -> bool {
        matches!(self, RomMode::Vanilla | RomMode::Downsample)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RomMode::Vanilla => "vanilla",
            RomMode::Downsample => "downsample",
            RomMode::Pixel => "pixel",
            RomMode::Rectangle => "rectangle",
        }
    }
}

impl fmt::Display for RomMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Random Mode
// =============================================================================

/// Which game(s) the random stage draw may select from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RandomMode {
    SmbOnly,
    LostLevelsOnly,
    Both,
}

impl RandomMode {
    pub fn has_smb(self) -> bool {
        matches!(self, RandomMode::SmbOnly | RandomMode::Both)
    }

    pub fn has_lost_levels(self) -> bool {
        matches!(self, RandomMode::LostLevelsOnly | RandomMode::Both)
    }

    /// Whether a variant's stages are eligible under this mode.
    pub fn permits(self, variant: GameVariant) -> bool {
        match variant {
            GameVariant::Smb => self.has_smb(),
            GameVariant::LostLevels => self.has_lost_levels(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rom_modes_for_lost_levels() {
        assert!(RomMode::Vanilla.supports_lost_levels());
        assert!(RomMode::Downsample.supports_lost_levels());
        assert!(!RomMode::Pixel.supports_lost_levels());
        assert!(!RomMode::Rectangle.supports_lost_levels());
    }

    #[test]
    fn random_mode_eligibility() {
        assert!(RandomMode::SmbOnly.permits(GameVariant::Smb));
        assert!(!RandomMode::SmbOnly.permits(GameVariant::LostLevels));
        assert!(!RandomMode::LostLevelsOnly.permits(GameVariant::Smb));
        assert!(RandomMode::LostLevelsOnly.permits(GameVariant::LostLevels));
        assert!(RandomMode::Both.permits(GameVariant::Smb));
        assert!(RandomMode::Both.permits(GameVariant::LostLevels));
    }
}
