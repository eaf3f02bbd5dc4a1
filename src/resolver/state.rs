//! Block state definitions and predicates over them.

use crate::error::{BakeError, Result};
use crate::resource_pack::{BlockModelDefinition, Condition};
use crate::types::ResourceLocation;
use std::collections::BTreeMap;
use std::fmt;

/// A block property and its ordered value domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    name: String,
    values: Vec<String>,
}

impl Property {
    pub fn new<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ["true", "false"])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// The properties of one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDefinition {
    owner: ResourceLocation,
    /// Sorted by name.
    properties: Vec<Property>,
}

impl StateDefinition {
    pub fn new(owner: ResourceLocation, mut properties: Vec<Property>) -> Self {
        properties.sort_by(|a, b| a.name.cmp(&b.name));
        properties.dedup_by(|a, b| a.name == b.name);
        Self { owner, properties }
    }

    pub fn owner(&self) -> &ResourceLocation {
        &self.owner
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Every combination of property values, last property varying fastest.
    pub fn possible_states(&self) -> Vec<BlockState> {
        let mut states = vec![BlockState {
            owner: self.owner.clone(),
            values: Vec::with_capacity(self.properties.len()),
        }];
        for property in &self.properties {
            states = states
                .into_iter()
                .flat_map(|state| {
                    property.values.iter().map(move |value| {
                        let mut next = state.clone();
                        next.values.push((property.name.clone(), value.clone()));
                        next
                    })
                })
                .collect();
        }
        states
    }

    /// Derive property domains from the keys and conditions of a blockstate file.
    ///
    /// Used when no external definition of the block's properties exists.
    /// Domains only containing `true`/`false` are completed to both booleans.
    pub fn infer(owner: ResourceLocation, definition: &BlockModelDefinition) -> Self {
        let mut domains: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut add = |name: &str, value: &str| {
            if name.is_empty() || value.is_empty() {
                return;
            }
            let values = domains.entry(name.to_string()).or_default();
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        };

        for key in definition.variants.iter().flat_map(|v| v.keys()) {
            for term in key.split(',').filter(|t| !t.is_empty()) {
                if let Some((name, value)) = term.split_once('=') {
                    add(name, value);
                }
            }
        }

        let mut pending: Vec<&Condition> = definition
            .multipart
            .iter()
            .flatten()
            .filter_map(|selector| selector.when.as_ref())
            .collect();
        while let Some(condition) = pending.pop() {
            match condition {
                Condition::Or(children) | Condition::And(children) => pending.extend(children),
                Condition::Terms(terms) => {
                    for (name, value) in terms {
                        let value = value.strip_prefix('!').unwrap_or(value.as_str());
                        for v in value.split('|') {
                            add(name, v);
                        }
                    }
                }
            }
        }

        let properties = domains
            .into_iter()
            .map(|(name, mut values)| {
                if values.iter().all(|v| v == "true" || v == "false") {
                    return Property::boolean(name);
                }
                if values.iter().all(|v| v.parse::<i64>().is_ok()) {
                    values.sort_by_key(|v| v.parse::<i64>().unwrap_or_default());
                }
                Property::new(name, values)
            })
            .collect();
        Self::new(owner, properties)
    }

    /// Find a state by `name=value` pairs. Unlisted properties take their first value.
    pub fn state_with(&self, values: &[(&str, &str)]) -> Result<BlockState> {
        for (name, value) in values {
            let property = self.property(name).ok_or_else(|| self.unknown_property(name))?;
            if !property.contains(value) {
                return Err(self.unknown_value(name, value));
            }
        }
        let values = self
            .properties
            .iter()
            .map(|p| {
                let value = values
                    .iter()
                    .find(|(name, _)| *name == p.name)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| p.values.first().cloned().unwrap_or_default());
                (p.name.clone(), value)
            })
            .collect();
        Ok(BlockState {
            owner: self.owner.clone(),
            values,
        })
    }

    fn unknown_property(&self, name: &str) -> BakeError {
        BakeError::UnknownProperty {
            block: self.owner.to_string(),
            property: name.to_string(),
        }
    }

    fn unknown_value(&self, name: &str, value: &str) -> BakeError {
        BakeError::UnknownValue {
            block: self.owner.to_string(),
            property: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Check a `name=value` term against this definition.
    fn term(&self, name: &str, values: Vec<String>, negate: bool) -> Result<StatePredicate> {
        let property = self.property(name).ok_or_else(|| self.unknown_property(name))?;
        if let Some(bad) = values.iter().find(|v| !property.contains(v)) {
            return Err(self.unknown_value(name, bad));
        }
        Ok(StatePredicate::Matches {
            property: name.to_string(),
            values,
            negate,
        })
    }
}

/// A concrete combination of property values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockState {
    owner: ResourceLocation,
    values: Vec<(String, String)>,
}

impl BlockState {
    pub fn owner(&self) -> &ResourceLocation {
        &self.owner
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn values(&self) -> &[(String, String)] {
        &self.values
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.owner)?;
        if !self.values.is_empty() {
            let pairs: Vec<String> = self
                .values
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            write!(f, "[{}]", pairs.join(","))?;
        }
        Ok(())
    }
}

/// A test over block states, validated against a [`StateDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatePredicate {
    Always,
    /// The property's value is (or with `negate`, is not) one of `values`.
    Matches {
        property: String,
        values: Vec<String>,
        negate: bool,
    },
    All(Vec<StatePredicate>),
    Any(Vec<StatePredicate>),
}

impl StatePredicate {
    /// Parse a variant key such as `facing=north,half=top`. The empty key matches every state.
    pub fn from_variant_key(definition: &StateDefinition, key: &str) -> Result<Self> {
        let mut terms = Vec::new();
        for term in key.split(',').filter(|t| !t.is_empty()) {
            let (name, value) = term
                .split_once('=')
                .ok_or_else(|| definition.unknown_property(term))?;
            terms.push(definition.term(name, vec![value.to_string()], false)?);
        }
        Ok(match terms.len() {
            0 => StatePredicate::Always,
            1 => terms.remove(0),
            _ => StatePredicate::All(terms),
        })
    }

    pub fn test(&self, state: &BlockState) -> bool {
        match self {
            StatePredicate::Always => true,
            StatePredicate::Matches {
                property,
                values,
                negate,
            } => {
                let matched = state
                    .get(property)
                    .map_or(false, |value| values.iter().any(|v| v == value));
                matched != *negate
            }
            StatePredicate::All(children) => children.iter().all(|c| c.test(state)),
            StatePredicate::Any(children) => children.iter().any(|c| c.test(state)),
        }
    }
}

impl Condition {
    /// Validate this condition against a block's properties.
    ///
    /// Terms accept `a|b` alternatives and a leading `!` to negate the list.
    pub fn instantiate(&self, definition: &StateDefinition) -> Result<StatePredicate> {
        match self {
            Condition::Or(children) => Ok(StatePredicate::Any(
                children
                    .iter()
                    .map(|c| c.instantiate(definition))
                    .collect::<Result<_>>()?,
            )),
            Condition::And(children) => Ok(StatePredicate::All(
                children
                    .iter()
                    .map(|c| c.instantiate(definition))
                    .collect::<Result<_>>()?,
            )),
            Condition::Terms(terms) => {
                let mut predicates = Vec::with_capacity(terms.len());
                for (name, value) in terms {
                    let (negate, value) = match value.strip_prefix('!') {
                        Some(rest) => (true, rest),
                        None => (false, value.as_str()),
                    };
                    let values = value.split('|').map(str::to_string).collect();
                    predicates.push(definition.term(name, values, negate)?);
                }
                Ok(match predicates.len() {
                    0 => StatePredicate::Always,
                    1 => predicates.remove(0),
                    _ => StatePredicate::All(predicates),
                })
            }
        }
    }
}
