//! Block model parsing.
//!
//! Block models define the 3D geometry of blocks using cuboid elements.

use crate::resolver::TextureSlots;
use crate::types::{Direction, ElementRotation, Quadrant, ResourceLocation};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};

/// A parsed block or item model from models/*.json.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockModel {
    /// Parent model to inherit from.
    #[serde(default)]
    pub parent: Option<ResourceLocation>,

    /// Whether to use ambient occlusion. Unset means inherit.
    #[serde(default, rename = "ambientocclusion")]
    pub ambient_occlusion: Option<bool>,

    /// Lighting used when drawn in a GUI slot. Unset means inherit.
    #[serde(default)]
    pub gui_light: Option<GuiLight>,

    /// Texture variable definitions.
    #[serde(default)]
    pub textures: TextureSlots,

    /// Model elements (cuboids). `None` inherits the parent's elements.
    #[serde(default)]
    pub elements: Option<Vec<ModelElement>>,

    /// Display transforms per context.
    #[serde(default, deserialize_with = "deserialize_display")]
    pub display: HashMap<DisplayContext, ItemTransform>,
}

impl BlockModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }
}

/// GUI lighting mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuiLight {
    Front,
    #[default]
    Side,
}

/// Where an item model is being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayContext {
    ThirdpersonRighthand,
    ThirdpersonLefthand,
    FirstpersonRighthand,
    FirstpersonLefthand,
    Gui,
    Head,
    Ground,
    Fixed,
}

impl DisplayContext {
    pub const ALL: [DisplayContext; 8] = [
        DisplayContext::ThirdpersonRighthand,
        DisplayContext::ThirdpersonLefthand,
        DisplayContext::FirstpersonRighthand,
        DisplayContext::FirstpersonLefthand,
        DisplayContext::Gui,
        DisplayContext::Head,
        DisplayContext::Ground,
        DisplayContext::Fixed,
    ];

    fn from_name(name: &str) -> Option<Self> {
        DisplayContext::ALL
            .into_iter()
            .find(|context| context.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DisplayContext::ThirdpersonRighthand => "thirdperson_righthand",
            DisplayContext::ThirdpersonLefthand => "thirdperson_lefthand",
            DisplayContext::FirstpersonRighthand => "firstperson_righthand",
            DisplayContext::FirstpersonLefthand => "firstperson_lefthand",
            DisplayContext::Gui => "gui",
            DisplayContext::Head => "head",
            DisplayContext::Ground => "ground",
            DisplayContext::Fixed => "fixed",
        }
    }
}

/// Unknown display contexts are ignored.
fn deserialize_display<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<HashMap<DisplayContext, ItemTransform>, D::Error> {
    let raw = HashMap::<String, ItemTransform>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, transform)| {
            DisplayContext::from_name(&name).map(|context| (context, transform))
        })
        .collect())
}

/// Rotation, translation and scale applied when displaying an item.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "RawItemTransform")]
pub struct ItemTransform {
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    /// Translation in blocks.
    pub translation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for ItemTransform {
    fn default() -> Self {
        Self {
            rotation: [0.0; 3],
            translation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

#[derive(Deserialize)]
struct RawItemTransform {
    #[serde(default)]
    rotation: [f32; 3],
    #[serde(default)]
    translation: [f32; 3],
    #[serde(default = "unit_scale")]
    scale: [f32; 3],
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

impl From<RawItemTransform> for ItemTransform {
    fn from(raw: RawItemTransform) -> Self {
        Self {
            rotation: raw.rotation,
            translation: raw.translation.map(|t| t.clamp(-80.0, 80.0) / 16.0),
            scale: raw.scale.map(|s| s.clamp(-4.0, 4.0)),
        }
    }
}

/// A cuboid element within a model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawModelElement")]
pub struct ModelElement {
    /// Minimum corner (0-16 range).
    pub from: [f32; 3],
    /// Maximum corner (0-16 range).
    pub to: [f32; 3],
    /// Optional rotation.
    pub rotation: Option<ElementRotation>,
    /// Whether this element receives shade.
    pub shade: bool,
    /// Block light emitted by this element's faces (0-15).
    pub light_emission: u8,
    /// Face definitions, at least one.
    pub faces: BTreeMap<Direction, ModelFace>,
}

#[derive(Deserialize)]
struct RawModelElement {
    from: [f32; 3],
    to: [f32; 3],
    #[serde(default)]
    rotation: Option<ElementRotation>,
    #[serde(default)]
    rescale: Option<bool>,
    #[serde(default = "default_shade")]
    shade: bool,
    #[serde(default)]
    light_emission: i32,
    #[serde(default)]
    faces: BTreeMap<Direction, ModelFace>,
}

fn default_shade() -> bool {
    true
}

const MIN_COORD: f32 = -16.0;
const MAX_COORD: f32 = 32.0;

fn check_bounds(name: &str, corner: &[f32; 3]) -> Result<(), String> {
    if corner
        .iter()
        .any(|c| !c.is_finite() || *c < MIN_COORD || *c > MAX_COORD)
    {
        return Err(format!(
            "'{}' specifier exceeds the allowed boundaries: {:?}",
            name, corner
        ));
    }
    Ok(())
}

impl TryFrom<RawModelElement> for ModelElement {
    type Error = String;

    fn try_from(raw: RawModelElement) -> Result<Self, Self::Error> {
        check_bounds("from", &raw.from)?;
        check_bounds("to", &raw.to)?;
        if raw.faces.is_empty() {
            return Err("expected between 1 and 6 unique faces, got 0".to_string());
        }
        if !(0..=15).contains(&raw.light_emission) {
            return Err(format!(
                "light_emission must be between 0 and 15, got {}",
                raw.light_emission
            ));
        }
        let rotation = match (raw.rotation, raw.rescale) {
            (Some(rotation), Some(rescale)) => Some(rotation.with_rescale(rescale)),
            (rotation, _) => rotation,
        };
        Ok(ModelElement {
            from: raw.from,
            to: raw.to,
            rotation,
            shade: raw.shade,
            light_emission: raw.light_emission as u8,
            faces: raw.faces,
        })
    }
}

/// A face of a model element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelFace {
    /// UV coordinates [u1, v1, u2, v2] in 0-16 range.
    #[serde(default)]
    pub uv: Option<[f32; 4]>,
    /// Texture reference (e.g., "#side" or "block/stone").
    pub texture: String,
    /// Face direction for culling (if adjacent block is opaque, hide this face).
    #[serde(default)]
    pub cullface: Option<Direction>,
    /// UV rotation.
    #[serde(default)]
    pub rotation: Quadrant,
    /// Tint index for biome coloring (-1 = no tint).
    #[serde(default = "default_tint_index")]
    pub tintindex: i32,
}

fn default_tint_index() -> i32 {
    -1
}

impl ModelFace {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            uv: None,
            texture: texture.into(),
            cullface: None,
            rotation: Quadrant::R0,
            tintindex: -1,
        }
    }

    pub fn with_cullface(mut self, cullface: Direction) -> Self {
        self.cullface = Some(cullface);
        self
    }

    pub fn with_uv(mut self, uv: [f32; 4]) -> Self {
        self.uv = Some(uv);
        self
    }
}
