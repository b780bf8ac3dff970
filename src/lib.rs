//! Random stage selection over pooled Super Mario Bros. / Lost Levels
//! environments.
//!
//! One single-stage NES environment is built per selectable stage and kept
//! resident; [`RandomStagesEnv`] draws which instance services each episode
//! with its own reseedable generator, so episode sequences are reproducible.

pub mod enums;
pub mod env;
pub mod error;
pub mod random_stages;
pub mod stages;
pub mod target;

pub use enums::{GameVariant, RandomMode, RomMode, STAGE_RANGE};
pub use env::{
    EnvMetadata, Info, RenderFrame, RenderMode, StageBuild, StageEnv, Step, TruncateFn,
};
pub use error::{Error, Result};
pub use random_stages::{RandomStagesConfig, RandomStagesEnv};
pub use stages::{default_stage_keys, flatten_stages, validate_stages, StageKey, StageSpec};
pub use target::{decode_target, StageTarget};
