//! Texture slot resolution along a model's parent chain.

use crate::atlas::Material;
use crate::types::ResourceLocation;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// What a texture slot is bound to in one model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContents {
    /// A concrete texture.
    Value(Material),
    /// Another slot name (written `#name` in JSON).
    Reference(String),
}

/// The `textures` object of a single model file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSlots {
    entries: HashMap<String, SlotContents>,
}

impl TextureSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: SlotContents) {
        self.entries.insert(name.into(), contents);
    }

    /// Bind `name` to a texture, or to another slot when `value` starts with `#`.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        if let Some(contents) = parse_slot_value(value) {
            self.insert(name, contents);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&SlotContents> {
        self.entries.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SlotContents)> {
        self.entries.iter()
    }
}

fn parse_slot_value(value: &str) -> Option<SlotContents> {
    match value.strip_prefix('#') {
        Some(reference) => Some(SlotContents::Reference(reference.to_string())),
        None => ResourceLocation::parse(value).map(|texture| SlotContents::Value(Material::new(texture))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSlot {
    Plain(String),
    Full {
        sprite: String,
        #[serde(default)]
        force_translucent: bool,
    },
}

impl<'de> Deserialize<'de> for TextureSlots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, RawSlot>::deserialize(deserializer)?;
        let mut slots = TextureSlots::new();
        for (name, value) in raw {
            let (value, force_translucent) = match value {
                RawSlot::Plain(value) => (value, false),
                RawSlot::Full {
                    sprite,
                    force_translucent,
                } => (sprite, force_translucent),
            };
            let contents = match parse_slot_value(&value) {
                Some(SlotContents::Value(material)) => {
                    SlotContents::Value(material.with_force_translucent(force_translucent))
                }
                Some(reference) => reference,
                None => {
                    return Err(serde::de::Error::custom(format!(
                        "invalid texture '{}' for slot '{}'",
                        value, name
                    )))
                }
            };
            slots.insert(name, contents);
        }
        Ok(slots)
    }
}

/// Concrete slot bindings after resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTextures {
    values: HashMap<String, Material>,
}

impl ResolvedTextures {
    pub fn get(&self, name: &str) -> Option<&Material> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, material: Material) {
        self.values.insert(name.into(), material);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Collects slot maps along a parent chain and flattens them.
///
/// Entries are held most-specific first: the model itself, then its parent,
/// then the grandparent.
#[derive(Debug, Default)]
pub struct TextureSlotResolver {
    entries: Vec<TextureSlots>,
}

impl TextureSlotResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a less specific (parent) slot map.
    pub fn add_last(&mut self, slots: TextureSlots) -> &mut Self {
        self.entries.push(slots);
        self
    }

    /// Add a more specific (child) slot map.
    pub fn add_first(&mut self, slots: TextureSlots) -> &mut Self {
        self.entries.insert(0, slots);
        self
    }

    /// Flatten all entries into concrete bindings.
    ///
    /// References that never reach a concrete texture (dangling or cyclic)
    /// are logged against `model` and left out.
    pub fn resolve(&self, model: &dyn fmt::Display) -> ResolvedTextures {
        let mut resolved: HashMap<String, Material> = HashMap::new();
        let mut unresolved: HashMap<String, String> = HashMap::new();

        for slots in self.entries.iter().rev() {
            for (name, contents) in slots.iter() {
                match contents {
                    SlotContents::Value(material) => {
                        unresolved.remove(name);
                        resolved.insert(name.clone(), material.clone());
                    }
                    SlotContents::Reference(target) => {
                        resolved.remove(name);
                        unresolved.insert(name.clone(), target.clone());
                    }
                }
            }
        }

        // Each pass resolves at least one reference or stops.
        while !unresolved.is_empty() {
            let ready: Vec<(String, Material)> = unresolved
                .iter()
                .filter_map(|(name, target)| {
                    resolved.get(target).map(|m| (name.clone(), m.clone()))
                })
                .collect();
            if ready.is_empty() {
                break;
            }
            for (name, material) in ready {
                unresolved.remove(&name);
                resolved.insert(name, material);
            }
        }

        if !unresolved.is_empty() {
            let mut names: Vec<String> = unresolved
                .iter()
                .map(|(name, target)| format!("{} -> #{}", name, target))
                .collect();
            names.sort();
            log::warn!(
                "Unresolved texture references in {}: {}",
                model,
                names.join(", ")
            );
        }

        ResolvedTextures { values: resolved }
    }
}
