use crate::enums::{GameVariant, STAGE_RANGE};
use crate::error::{Error, Result};

/// The engine-internal address of one sub-level screen.
///
/// `area` differs from the user-facing stage number in worlds that contain a
/// hidden bonus/underground screen, which shifts every later area index by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTarget {
    pub world: i64,
    pub stage: i64,
    pub area: i64,
}

/// Resolve a (world, stage) target into the area index the engine loads.
///
/// `None` means "no specific target" and resolves to `Ok(None)`. This table is
/// the single source of truth for the per-world area offset and must match the
/// engine's internal addressing exactly.
pub fn decode_target(target: Option<(i64, i64)>, variant: GameVariant) -> Result<Option<StageTarget>> {
    let Some((world, stage)) = target else {
        return Ok(None);
    };

    let worlds = variant.world_range();
    if !worlds.contains(&world) {
        return Err(Error::OutOfRange(format!(
            "target world must be in {{{}, ..., {}}} for {}; got: {world}",
            worlds.start(),
            worlds.end(),
            variant,
        )));
    }
    if !STAGE_RANGE.contains(&stage) {
        return Err(Error::OutOfRange(format!(
            "target stage must be in {{{}, ..., {}}}; got: {stage}",
            STAGE_RANGE.start(),
            STAGE_RANGE.end(),
        )));
    }

    let mut area = stage;
    match variant {
        GameVariant::LostLevels => {
            if matches!(world, 1 | 3) {
                if stage >= 2 {
                    area += 1;
                }
            } else if world >= 5 {
                // TODO: figure out why loading any Lost Levels world past 4
                // hangs the engine; until then these worlds are rejected.
                return Err(Error::OutOfRange(format!(
                    "Lost Levels worlds {{5, ..., 12}} are not supported; got: {world}"
                )));
            }
        }
        GameVariant::Smb => {
            if matches!(world, 1 | 2 | 4 | 7) && stage >= 2 {
                area += 1;
            }
        }
    }

    Ok(Some(StageTarget { world, stage, area }))
}
