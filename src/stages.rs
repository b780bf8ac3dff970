use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enums::{GameVariant, RandomMode, STAGE_RANGE};
use crate::error::{Error, Result};

/// Identity of one selectable level. Keys index the environment pool and are
/// the unit of random draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageKey {
    pub variant: GameVariant,
    pub world: i64,
    pub stage: i64,
}

impl StageKey {
    pub fn new(variant: GameVariant, world: i64, stage: i64) -> Self {
        Self { variant, world, stage }
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.world, self.stage, self.variant)
    }
}

/// A validated stage spec: one collection of (world, stage) pairs per game,
/// SMB first. An empty collection means "use the full default range".
pub type StageSpec = (Vec<(i64, i64)>, Vec<(i64, i64)>);

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Validate and normalize the dynamic `stages` value.
///
/// The expected shape is `[smb_pairs, lost_levels_pairs]` where each side is a
/// collection of `[world, stage]` integer pairs. Every check fails with a
/// message naming the offending element, since the value typically arrives
/// from loosely-typed reset options.
pub fn validate_stages(stages: &Value) -> Result<StageSpec> {
    let Value::Array(groups) = stages else {
        return Err(Error::InvalidArgument(format!(
            "`stages` must be a sequence of two collections of (world, stage) pairs; got type: {}",
            value_type(stages),
        )));
    };
    if groups.len() != 2 {
        return Err(Error::InvalidArgument(format!(
            "`stages` must contain exactly two collections (one per game); got: {} elements",
            groups.len(),
        )));
    }

    let mut spec: StageSpec = (Vec::new(), Vec::new());
    for (i, group) in groups.iter().enumerate() {
        let Value::Array(pairs) = group else {
            return Err(Error::InvalidArgument(format!(
                "element {i} of `stages` must be a collection of pairs; got type: {}",
                value_type(group),
            )));
        };

        let out = if i == 0 { &mut spec.0 } else { &mut spec.1 };
        for (j, pair) in pairs.iter().enumerate() {
            let Value::Array(members) = pair else {
                return Err(Error::InvalidArgument(format!(
                    "element {j} in stage group {i} must be a pair of two integers; \
                     got: {pair} of type {}",
                    value_type(pair),
                )));
            };
            if members.len() != 2 {
                return Err(Error::InvalidArgument(format!(
                    "pair {j} in stage group {i} must contain exactly two integers; \
                     got length: {} (value: {pair})",
                    members.len(),
                )));
            }
            let ints: Option<Vec<i64>> = members.iter().map(Value::as_i64).collect();
            let Some(ints) = ints else {
                return Err(Error::InvalidArgument(format!(
                    "both members of pair {j} in stage group {i} must be integers; got: {pair}"
                )));
            };
            out.push((ints[0], ints[1]));
        }
    }
    Ok(spec)
}

/// Flatten a validated spec into the ordered key list eligible for random
/// draw. SMB keys come first, each half in input order. Duplicates are kept
/// on purpose: a stage listed twice is drawn twice as often.
pub fn flatten_stages(spec: &StageSpec, mode: RandomMode) -> Vec<StageKey> {
    let mut keys = Vec::new();
    if mode.has_smb() {
        keys.extend(
            spec.0
                .iter()
                .map(|&(world, stage)| StageKey::new(GameVariant::Smb, world, stage)),
        );
    }
    if mode.has_lost_levels() {
        keys.extend(
            spec.1
                .iter()
                .map(|&(world, stage)| StageKey::new(GameVariant::LostLevels, world, stage)),
        );
    }
    keys
}

/// The full default cross-product of a variant's worlds and stages.
pub fn default_stage_keys(variant: GameVariant) -> Vec<StageKey> {
    let mut keys = Vec::new();
    for world in variant.default_worlds() {
        for stage in STAGE_RANGE {
            keys.push(StageKey::new(variant, world, stage));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_spec() {
        assert_eq!(validate_stages(&json!([[], []])).unwrap(), (vec![], vec![]));
    }

    #[test]
    fn accepts_well_typed_pairs() {
        let spec = validate_stages(&json!([[[1, 1], [2, 3]], [[4, 4]]])).unwrap();
        assert_eq!(spec.0, vec![(1, 1), (2, 3)]);
        assert_eq!(spec.1, vec![(4, 4)]);
    }

    #[test]
    fn rejects_non_sequence_spec() {
        let err = validate_stages(&json!("nope")).unwrap_err();
        assert!(err.to_string().contains("got type: string"), "got: {err}");
    }

    #[test]
    fn rejects_wrong_arity_spec() {
        let err = validate_stages(&json!([[], [], []])).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("got: 3 elements"), "got: {err}");
    }

    #[test]
    fn rejects_non_collection_group() {
        let err = validate_stages(&json!([7, []])).unwrap_err();
        assert!(err.to_string().contains("element 0 of `stages`"), "got: {err}");
    }

    #[test]
    fn rejects_non_pair_member() {
        let err = validate_stages(&json!([[[1, 2], "1-2"], []])).unwrap_err();
        assert!(err.to_string().contains("element 1 in stage group 0"), "got: {err}");
    }

    #[test]
    fn rejects_wrong_length_pair() {
        let err = validate_stages(&json!([[], [[1, 2, 3]]])).unwrap_err();
        assert!(err.to_string().contains("pair 0 in stage group 1"), "got: {err}");
        assert!(err.to_string().contains("got length: 3"), "got: {err}");
    }

    #[test]
    fn rejects_float_pair() {
        let err = validate_stages(&json!([[[1.5, 2.0]], []])).unwrap_err();
        assert!(
            err.to_string().contains("pair 0 in stage group 0 must be integers"),
            "got: {err}"
        );
    }

    #[test]
    fn flatten_keeps_order_and_duplicates() {
        let spec: StageSpec = (vec![(1, 1), (2, 2), (1, 1)], vec![(3, 3)]);
        let keys = flatten_stages(&spec, RandomMode::Both);
        assert_eq!(keys.len(), 4);
        assert_eq!(keys[0], StageKey::new(GameVariant::Smb, 1, 1));
        assert_eq!(keys[1], StageKey::new(GameVariant::Smb, 2, 2));
        assert_eq!(keys[2], StageKey::new(GameVariant::Smb, 1, 1));
        assert_eq!(keys[3], StageKey::new(GameVariant::LostLevels, 3, 3));
    }

    #[test]
    fn flatten_filters_by_mode() {
        let spec: StageSpec = (vec![(1, 1)], vec![(2, 2)]);
        let smb_only = flatten_stages(&spec, RandomMode::SmbOnly);
        assert_eq!(smb_only, vec![StageKey::new(GameVariant::Smb, 1, 1)]);
        let ll_only = flatten_stages(&spec, RandomMode::LostLevelsOnly);
        assert_eq!(ll_only, vec![StageKey::new(GameVariant::LostLevels, 2, 2)]);
    }

    #[test]
    fn default_keys_cover_the_cross_product() {
        let smb = default_stage_keys(GameVariant::Smb);
        assert_eq!(smb.len(), 32);
        let ll = default_stage_keys(GameVariant::LostLevels);
        assert_eq!(ll.len(), 16);
        assert!(ll.iter().all(|k| k.world <= 4));
    }
}
