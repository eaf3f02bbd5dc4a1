//! Blockstate definition parsing.
//!
//! Blockstates define how block properties map to model variants.
//! There are two forms, "variants" and "multipart"; a file may use both.

use crate::types::{ModelState, Quadrant, ResourceLocation};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// A blockstate definition from blockstates/*.json.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawBlockModelDefinition")]
pub struct BlockModelDefinition {
    /// Variant key (`"facing=north,half=top"`) to models.
    pub variants: Option<BTreeMap<String, VariantList>>,
    /// Conditional parts, unioned per state.
    pub multipart: Option<Vec<MultipartSelector>>,
}

#[derive(Deserialize)]
struct RawBlockModelDefinition {
    variants: Option<BTreeMap<String, VariantList>>,
    multipart: Option<Vec<MultipartSelector>>,
}

impl TryFrom<RawBlockModelDefinition> for BlockModelDefinition {
    type Error = String;

    fn try_from(raw: RawBlockModelDefinition) -> Result<Self, Self::Error> {
        if raw.variants.is_none() && raw.multipart.is_none() {
            return Err("Neither 'variants' nor 'multipart' found".to_string());
        }
        Ok(BlockModelDefinition {
            variants: raw.variants,
            multipart: raw.multipart,
        })
    }
}


/// A model reference with orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawVariant")]
pub struct Variant {
    /// Model resource location (e.g., "minecraft:block/stone").
    pub model: ResourceLocation,
    pub x: Quadrant,
    pub y: Quadrant,
    pub z: Quadrant,
    /// If true, UV coordinates don't rotate with the block.
    pub uvlock: bool,
    /// Weight for random selection, at least 1.
    pub weight: u32,
}

#[derive(Deserialize)]
struct RawVariant {
    model: ResourceLocation,
    #[serde(default)]
    x: Quadrant,
    #[serde(default)]
    y: Quadrant,
    #[serde(default)]
    z: Quadrant,
    #[serde(default)]
    uvlock: bool,
    #[serde(default = "default_weight")]
    weight: i64,
}

fn default_weight() -> i64 {
    1
}

impl TryFrom<RawVariant> for Variant {
    type Error = String;

    fn try_from(raw: RawVariant) -> Result<Self, Self::Error> {
        if raw.weight < 1 || raw.weight > u32::MAX as i64 {
            return Err(format!("Invalid weight {}, must be at least 1", raw.weight));
        }
        Ok(Variant {
            model: raw.model,
            x: raw.x,
            y: raw.y,
            z: raw.z,
            uvlock: raw.uvlock,
            weight: raw.weight as u32,
        })
    }
}

impl Variant {
    pub fn new(model: ResourceLocation) -> Self {
        Self {
            model,
            x: Quadrant::R0,
            y: Quadrant::R0,
            z: Quadrant::R0,
            uvlock: false,
            weight: 1,
        }
    }

    pub fn model_state(&self) -> ModelState {
        ModelState {
            x: self.x,
            y: self.y,
            z: self.z,
            uvlock: self.uvlock,
        }
    }
}

/// One variant or a weighted list of variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantList(Vec<Variant>);

impl VariantList {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self(variants)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Variant> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for VariantList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Single(Variant),
            Multiple(Vec<Variant>),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Single(variant) => Ok(VariantList(vec![variant])),
            Raw::Multiple(variants) if variants.is_empty() => {
                Err(serde::de::Error::custom("Empty variant list"))
            }
            Raw::Multiple(variants) => Ok(VariantList(variants)),
        }
    }
}

/// A multipart entry: apply `apply` when `when` holds (always, if absent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct MultipartSelector {
    #[serde(default)]
    pub when: Option<Condition>,
    pub apply: VariantList,
}

/// Multipart condition tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Any of the sub-conditions.
    Or(Vec<Condition>),
    /// All of the sub-conditions.
    And(Vec<Condition>),
    /// Every property must match its value list, e.g. `"north|south"` or `"!none"`.
    Terms(BTreeMap<String, String>),
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Condition::from_json(value).map_err(serde::de::Error::custom)
    }
}

impl Condition {
    fn from_json(value: Value) -> Result<Self, String> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(format!("Expected condition object, got {}", other)),
        };

        if map.len() == 1 {
            for key in ["OR", "AND"] {
                if let Some(Value::Array(items)) = map.get(key) {
                    let children = items
                        .iter()
                        .cloned()
                        .map(Condition::from_json)
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(if key == "OR" {
                        Condition::Or(children)
                    } else {
                        Condition::And(children)
                    });
                }
            }
        }

        let mut terms = BTreeMap::new();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => return Err(format!("Invalid value for property '{}': {}", name, other)),
            };
            terms.insert(name, value);
        }
        Ok(Condition::Terms(terms))
    }
}
