//! Resource pack loading from ZIP files and directories.

use super::texture::{load_texture_from_bytes, parse_mcmeta, AnimationMeta};
use super::{BlockModel, BlockModelDefinition, ResourcePack};
use crate::error::{BakeError, Result};
use crate::types::ResourceLocation;
use std::io::Read;
use std::path::Path;

/// Load a resource pack from a file path.
///
/// Supports both ZIP files and directories.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ResourcePack> {
    let path = path.as_ref();

    if path.is_dir() {
        load_from_directory(path)
    } else {
        let data = std::fs::read(path)?;
        load_from_bytes(&data)
    }
}

/// Load a resource pack from bytes (ZIP data).
pub fn load_from_bytes(data: &[u8]) -> Result<ResourcePack> {
    let cursor = std::io::Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut loader = PackLoader::default();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let file_path = file.name().to_string();
        if let Some((namespace, asset_type, asset_path)) = parse_asset_path(&file_path) {
            if !PackLoader::wants(asset_type, asset_path) {
                continue;
            }
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            loader.add_file(namespace, asset_type, asset_path, &contents);
        }
    }

    Ok(loader.finish())
}

/// Load a resource pack from a directory.
fn load_from_directory(path: &Path) -> Result<ResourcePack> {
    let assets_path = path.join("assets");
    if !assets_path.is_dir() {
        return Err(BakeError::InvalidResourcePack(
            "No assets directory found".to_string(),
        ));
    }

    let mut loader = PackLoader::default();
    for namespace_entry in std::fs::read_dir(&assets_path)? {
        let namespace_entry = namespace_entry?;
        if !namespace_entry.file_type()?.is_dir() {
            continue;
        }
        let namespace = namespace_entry.file_name().to_string_lossy().to_string();

        for asset_type in ["blockstates", "models", "textures"] {
            let base = namespace_entry.path().join(asset_type);
            if base.is_dir() {
                walk_files(&base, &base, &mut |relative, full| {
                    if PackLoader::wants(asset_type, relative) {
                        let contents = std::fs::read(full)?;
                        loader.add_file(&namespace, asset_type, relative, &contents);
                    }
                    Ok(())
                })?;
            }
        }
    }

    Ok(loader.finish())
}

/// Call `handler` with the `/`-separated relative path of every file under `dir`.
fn walk_files<F>(base: &Path, dir: &Path, handler: &mut F) -> Result<()>
where
    F: FnMut(&str, &Path) -> Result<()>,
{
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            walk_files(base, &path, handler)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            let relative = relative.to_string_lossy().replace('\\', "/");
            handler(&relative, &path)?;
        }
    }
    Ok(())
}

/// Parse an asset path from a ZIP file.
/// Returns (namespace, asset_type, asset_path) if valid.
fn parse_asset_path(file_path: &str) -> Option<(&str, &str, &str)> {
    // Expected format: assets/{namespace}/{type}/{path}
    let parts: Vec<&str> = file_path.splitn(4, '/').collect();

    if parts.len() >= 4 && parts[0] == "assets" {
        Some((parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

/// Accumulates parsed assets. Malformed files are logged and skipped.
#[derive(Default)]
struct PackLoader {
    pack: ResourcePack,
    // Archive order is arbitrary, metadata may come before its PNG.
    pending_mcmeta: Vec<(ResourceLocation, AnimationMeta)>,
}

impl PackLoader {
    fn wants(asset_type: &str, asset_path: &str) -> bool {
        match asset_type {
            "blockstates" | "models" => asset_path.ends_with(".json"),
            "textures" => asset_path.ends_with(".png") || asset_path.ends_with(".png.mcmeta"),
            _ => false,
        }
    }

    fn add_file(&mut self, namespace: &str, asset_type: &str, asset_path: &str, contents: &[u8]) {
        match asset_type {
            "blockstates" => {
                let location = location(namespace, asset_path, ".json");
                match serde_json::from_slice::<BlockModelDefinition>(contents) {
                    Ok(definition) => self.pack.add_blockstate(location, definition),
                    Err(e) => log::warn!(
                        "{}",
                        BakeError::InvalidBlockstate(format!("{}: {}", location, e))
                    ),
                }
            }
            "models" => {
                let location = location(namespace, asset_path, ".json");
                match serde_json::from_slice::<BlockModel>(contents) {
                    Ok(model) => self.pack.add_model(location, model),
                    Err(e) => log::warn!("{}", BakeError::InvalidModel(format!("{}: {}", location, e))),
                }
            }
            "textures" if asset_path.ends_with(".png.mcmeta") => {
                let location = location(namespace, asset_path, ".png.mcmeta");
                match std::str::from_utf8(contents).ok().and_then(parse_mcmeta) {
                    Some(meta) => self.pending_mcmeta.push((location, meta)),
                    None => log::debug!("No animation in metadata for {}", location),
                }
            }
            "textures" => {
                let location = location(namespace, asset_path, ".png");
                match load_texture_from_bytes(contents) {
                    Ok(texture) => self.pack.add_texture(location, texture),
                    Err(e) => log::warn!("Failed to load texture {}: {}", location, e),
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> ResourcePack {
        for (location, meta) in std::mem::take(&mut self.pending_mcmeta) {
            if !self.pack.apply_mcmeta(&location, meta) {
                log::warn!("Animation metadata without texture: {}", location);
            }
        }
        log::debug!(
            "Loaded {} blockstates, {} models, {} textures",
            self.pack.blockstate_count(),
            self.pack.model_count(),
            self.pack.texture_count()
        );
        self.pack
    }
}

fn location(namespace: &str, asset_path: &str, extension: &str) -> ResourceLocation {
    ResourceLocation::new(namespace, asset_path.trim_end_matches(extension))
}
