use std::sync::Arc;

use serde_json::Value;

use crate::enums::RomMode;
use crate::error::Result;
use crate::stages::StageKey;
use crate::target::StageTarget;

/// Auxiliary diagnostic data attached to resets and steps.
pub type Info = serde_json::Map<String, Value>;

/// Decides whether an episode should be truncated, given the last reward and
/// info. Forwarded verbatim to each pooled environment at construction.
pub type TruncateFn = Arc<dyn Fn(f64, &Info) -> bool + Send + Sync>;

/// One environment transition.
#[derive(Debug, Clone)]
pub struct Step<Obs> {
    pub observation: Obs,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Render to the current display.
    Human,
    /// Return the frame as raw pixels.
    RgbArray,
}

/// A rendered frame, row-major RGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Static descriptors shared by every instance of an environment type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvMetadata {
    pub render_modes: &'static [&'static str],
    pub render_fps: u32,
    pub reward_range: (f64, f64),
    /// (height, width, channels) of the screen observation.
    pub observation_shape: (usize, usize, usize),
    pub action_count: usize,
}

/// Everything needed to build one pooled single-stage environment.
#[derive(Clone)]
pub struct StageBuild {
    pub rom_mode: RomMode,
    pub key: StageKey,
    /// Pre-resolved engine area for `key`, always `Some` for pooled builds.
    pub target: Option<StageTarget>,
    pub max_episode_steps: Option<u32>,
    pub truncate: Option<TruncateFn>,
}

/// The capability seam to one single-stage environment.
///
/// The emulator-backed implementation lives outside this crate; the random
/// stage multiplexer only ever talks through this interface, so descriptors
/// and the step/reset contract are assumed identical across all pooled
/// instances.
pub trait StageEnv {
    type Obs;
    type Act;

    fn metadata() -> EnvMetadata;

    /// Re-seed the instance's own randomness, if it has any. Returns the
    /// seeds in use, empty for the "no seed" sentinel.
    fn seed(&mut self, seed: Option<u64>) -> Vec<u64> {
        let _ = seed;
        Vec::new()
    }

    fn reset(&mut self, seed: Option<u64>, options: Option<&Value>) -> Result<(Self::Obs, Info)>;

    fn step(&mut self, action: &Self::Act) -> Result<Step<Self::Obs>>;

    fn render(&mut self, mode: RenderMode) -> Result<Option<RenderFrame>>;

    fn close(&mut self) -> Result<()>;

    /// The last screen produced by the engine.
    fn screen(&self) -> &Self::Obs;

    /// Keyboard key combinations mapped to actions, for interactive play.
    fn keys_to_action(&self) -> Vec<(Vec<char>, Self::Act)>;

    /// Human-readable names for the action space, by index.
    fn action_meanings(&self) -> Vec<String>;
}
