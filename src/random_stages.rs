use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::debug;

use crate::enums::{GameVariant, RandomMode, RomMode};
use crate::env::{EnvMetadata, Info, RenderFrame, RenderMode, StageBuild, StageEnv, Step, TruncateFn};
use crate::error::{Error, Result};
use crate::stages::{default_stage_keys, flatten_stages, validate_stages, StageKey};
use crate::target::decode_target;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone)]
pub struct RandomStagesConfig {
    /// ROM graphics mode passed through to every pooled environment.
    pub rom_mode: RomMode,
    /// Which game(s) stages are drawn from.
    pub random_mode: RandomMode,
    /// `[smb_pairs, lost_levels_pairs]` of `[world, stage]` integers. An empty
    /// collection selects the full default pool for that game.
    pub stages: Value,
    pub max_episode_steps: Option<u32>,
    pub truncate: Option<TruncateFn>,
}

impl Default for RandomStagesConfig {
    fn default() -> Self {
        Self {
            rom_mode: RomMode::Vanilla,
            random_mode: RandomMode::SmbOnly,
            stages: serde_json::json!([[], []]),
            max_episode_steps: None,
            truncate: None,
        }
    }
}

// =============================================================================
// Random Stage Multiplexer
// =============================================================================

/// An episodic environment that randomly selects a stage at each reset.
///
/// One single-stage environment is built per pooled stage at construction and
/// kept resident for the multiplexer's whole lifetime; every call between
/// resets routes to the one active instance. Dropping the multiplexer without
/// calling [`close`](Self::close) leaks whatever resources the pooled
/// instances hold open.
pub struct RandomStagesEnv<E: StageEnv> {
    random_mode: RandomMode,
    rng: SmallRng,
    envs: HashMap<StageKey, E>,
    stage_pool_keys: Vec<StageKey>,
    /// Key of the instance servicing the current episode. `None` once closed.
    active: Option<StageKey>,
}

impl<E: StageEnv> RandomStagesEnv<E> {
    /// Build the stage pool and the per-stage environment instances.
    ///
    /// The factory is called once per stage in the default cross-product of
    /// every game permitted by `config.random_mode`, receiving the build
    /// description with the engine area already resolved.
    pub fn new<F>(config: RandomStagesConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut(&StageBuild) -> Result<E>,
    {
        if config.random_mode.has_lost_levels() && !config.rom_mode.supports_lost_levels() {
            return Err(Error::InvalidArgument(format!(
                "rom mode must be vanilla or downsample to load Lost Levels stages; \
                 got: {} with {:?} stage selection",
                config.rom_mode, config.random_mode,
            )));
        }

        let spec = validate_stages(&config.stages)?;
        let mut stage_pool_keys = flatten_stages(&spec, config.random_mode);

        let mut envs = HashMap::new();
        for (variant, provided) in [
            (GameVariant::Smb, &spec.0),
            (GameVariant::LostLevels, &spec.1),
        ] {
            if !config.random_mode.permits(variant) {
                continue;
            }
            let defaults = default_stage_keys(variant);
            // An empty collection for a permitted game means a uniform draw
            // over everything that game has.
            if provided.is_empty() {
                stage_pool_keys.extend(defaults.iter().copied());
            }
            for key in defaults {
                let target = decode_target(Some((key.world, key.stage)), key.variant)?;
                let build = StageBuild {
                    rom_mode: config.rom_mode,
                    key,
                    target,
                    max_episode_steps: config.max_episode_steps,
                    truncate: config.truncate.clone(),
                };
                envs.insert(key, factory(&build)?);
            }
        }

        let Some(&first) = stage_pool_keys.first() else {
            return Err(Error::InvalidArgument(
                "the selectable stage pool is empty; name at least one stage or pass an \
                 empty collection to use the default pools"
                    .to_string(),
            ));
        };
        if !envs.contains_key(&first) {
            return Err(key_not_found(first, &envs));
        }

        debug!(
            selectable = stage_pool_keys.len(),
            pooled = envs.len(),
            "built random stage pool"
        );
        Ok(Self {
            random_mode: config.random_mode,
            rng: SmallRng::from_os_rng(),
            envs,
            stage_pool_keys,
            active: Some(first),
        })
    }

    /// Static descriptors, identical across all pooled instances.
    pub fn metadata() -> EnvMetadata {
        E::metadata()
    }

    pub fn random_mode(&self) -> RandomMode {
        self.random_mode
    }

    /// The persistent key list random draws come from. Per-reset overrides
    /// never show up here.
    pub fn stage_pool(&self) -> &[StageKey] {
        &self.stage_pool_keys
    }

    /// Every stage with a resident environment instance, sorted.
    pub fn pooled_stages(&self) -> Vec<StageKey> {
        let mut keys: Vec<StageKey> = self.envs.keys().copied().collect();
        keys.sort();
        keys
    }

    /// The stage servicing the current episode, `None` once closed.
    pub fn active_stage(&self) -> Option<StageKey> {
        self.active
    }

    /// Re-seed the draw generator. Returns the seeds in use, empty when no
    /// seed was given (the generator is left untouched in that case). Fails
    /// with `IllegalState` once the multiplexer is closed.
    pub fn seed(&mut self, seed: Option<u64>) -> Result<Vec<u64>> {
        if self.active.is_none() {
            return Err(Error::IllegalState(
                "seed called on a closed environment".to_string(),
            ));
        }
        Ok(match seed {
            None => Vec::new(),
            Some(value) => {
                self.rng = SmallRng::seed_from_u64(value);
                vec![value]
            }
        })
    }

    /// Draw a stage, make its instance active, and reset it.
    ///
    /// `options` may carry a `"stages"` key of the same shape as the
    /// construction spec; the draw then comes from that transient list
    /// instead of the persistent pool, for this reset only.
    pub fn reset(&mut self, seed: Option<u64>, options: Option<&Value>) -> Result<(E::Obs, Info)> {
        if self.active.is_none() {
            return Err(Error::IllegalState(
                "reset called on a closed environment".to_string(),
            ));
        }
        self.seed(seed)?;

        let chosen = match options.and_then(|opts| opts.get("stages")) {
            Some(stages) => {
                let spec = validate_stages(stages)?;
                let keys = flatten_stages(&spec, self.random_mode);
                if keys.is_empty() {
                    return Err(Error::InvalidArgument(
                        "the `stages` override must name at least one stage eligible \
                         under the selection mode"
                            .to_string(),
                    ));
                }
                keys[self.rng.random_range(0..keys.len())]
            }
            None => self.stage_pool_keys[self.rng.random_range(0..self.stage_pool_keys.len())],
        };

        if !self.envs.contains_key(&chosen) {
            return Err(key_not_found(chosen, &self.envs));
        }
        debug!(stage = %chosen, "selected stage for next episode");
        self.active = Some(chosen);
        self.active_env()?.reset(seed, options)
    }

    pub fn step(&mut self, action: &E::Act) -> Result<Step<E::Obs>> {
        self.active_env()?.step(action)
    }

    pub fn render(&mut self, mode: RenderMode) -> Result<Option<RenderFrame>> {
        self.active_env()?.render(mode)
    }

    /// The active instance's last screen.
    pub fn screen(&self) -> Result<&E::Obs> {
        Ok(self.active_env_ref()?.screen())
    }

    pub fn keys_to_action(&self) -> Result<Vec<(Vec<char>, E::Act)>> {
        Ok(self.active_env_ref()?.keys_to_action())
    }

    pub fn action_meanings(&self) -> Result<Vec<String>> {
        Ok(self.active_env_ref()?.action_meanings())
    }

    /// Close every pooled instance and retire this multiplexer.
    ///
    /// Per-instance close failures do not stop the rest from closing; they
    /// are collected and surfaced in the returned error. Any further call,
    /// including a second `close`, fails with `IllegalState`.
    pub fn close(&mut self) -> Result<()> {
        if self.active.is_none() {
            return Err(Error::IllegalState(
                "the environment pool has already been closed".to_string(),
            ));
        }
        self.active = None;

        let mut failures = Vec::new();
        for (key, env) in &mut self.envs {
            if let Err(err) = env.close() {
                failures.push((*key, err.to_string()));
            }
        }
        debug!(failed = failures.len(), "closed stage pool");
        if failures.is_empty() {
            Ok(())
        } else {
            failures.sort();
            Err(Error::Close { failures })
        }
    }

    fn active_env(&mut self) -> Result<&mut E> {
        let key = self.active_key()?;
        self.envs
            .get_mut(&key)
            .ok_or_else(|| Error::IllegalState(format!("active stage {key} is not pooled")))
    }

    fn active_env_ref(&self) -> Result<&E> {
        let key = self.active_key()?;
        self.envs
            .get(&key)
            .ok_or_else(|| Error::IllegalState(format!("active stage {key} is not pooled")))
    }

    fn active_key(&self) -> Result<StageKey> {
        self.active.ok_or_else(|| {
            Error::IllegalState("the environment pool has been closed".to_string())
        })
    }
}

fn key_not_found<E>(requested: StageKey, envs: &HashMap<StageKey, E>) -> Error {
    let mut valid: Vec<StageKey> = envs.keys().copied().collect();
    valid.sort();
    Error::KeyNotFound { requested, valid }
}

// =============================================================================
// Tests
// =============================================================================
