//! Error types for the model baker.

use thiserror::Error;

/// Result type alias using BakeError.
pub type Result<T> = std::result::Result<T, BakeError>;

/// Main error type for loading and baking models.
#[derive(Error, Debug)]
pub enum BakeError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid resource pack structure.
    #[error("Invalid resource pack: {0}")]
    InvalidResourcePack(String),

    /// A model file parsed but violates a model invariant.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// A blockstate file parsed but violates a blockstate invariant.
    #[error("Invalid blockstate: {0}")]
    InvalidBlockstate(String),

    /// A selector names a property the block does not have.
    #[error("Unknown property '{property}' on '{block}'")]
    UnknownProperty { block: String, property: String },

    /// A selector names a value outside the property's domain.
    #[error("Unknown value '{value}' for property '{property}' on '{block}'")]
    UnknownValue {
        block: String,
        property: String,
        value: String,
    },

    /// Two different variant keys matched the same block state.
    #[error("Overlapping definition on state: {0}")]
    OverlappingDefinition(String),

    /// A referenced model does not exist in the pack.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The parent chain of a model loops back on itself.
    #[error("Found cycle in model parents: {0}")]
    ParentCycle(String),

    /// Winding normalization found no vertex at a required corner.
    #[error("Can't find vertex to swap for {direction} corner {corner}")]
    WindingMismatch { direction: String, corner: usize },

    /// A baked block model uses sprites from outside the block atlas.
    #[error("Model uses sprites outside of the supported atlas: {0}")]
    ForeignAtlas(String),
}
