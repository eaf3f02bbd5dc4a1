//! Block Model Baker CLI
//!
//! Bake Minecraft block and item models from a resource pack and report the result.

use block_model_baker::baker::instantiate_roots;
use block_model_baker::{
    bake_blocks, load_resource_pack, BakeConfig, Direction, ModelBaker, ModelState,
    QuadCollection, Quadrant, ResourceLocation, SpriteAtlas, StateDefinition,
};
use clap::{Parser, Subcommand};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "block-model-baker")]
#[command(author, version, about = "Bake Minecraft block and item models into quads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Worker threads used when baking every block
    #[arg(long, global = true)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake a single model (e.g., "block/stone" or "item/stick")
    Model {
        /// Model name
        #[arg(short, long)]
        model: String,

        /// Path to resource pack (ZIP or directory)
        #[arg(short = 'r', long = "pack")]
        resource_pack: PathBuf,

        /// Rotation about the X axis in degrees
        #[arg(short, long, default_value = "0", value_parser = parse_quadrant)]
        x: Quadrant,

        /// Rotation about the Y axis in degrees
        #[arg(short, long, default_value = "0", value_parser = parse_quadrant)]
        y: Quadrant,

        /// Keep textures aligned to the world grid
        #[arg(long)]
        uvlock: bool,
    },

    /// Bake one block state
    Block {
        /// Block name (e.g., "minecraft:oak_fence" or "oak_fence")
        #[arg(short, long)]
        block: String,

        /// Block properties as key=value pairs (e.g., "facing=north")
        #[arg(short, long, value_parser = parse_property)]
        property: Vec<(String, String)>,

        /// Path to resource pack (ZIP or directory)
        #[arg(short = 'r', long = "pack")]
        resource_pack: PathBuf,

        /// Position seed for weighted variants
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Bake every block state in a pack and print statistics
    All {
        /// Path to resource pack (ZIP or directory)
        #[arg(short = 'r', long = "pack")]
        resource_pack: PathBuf,

        /// Keep models that draw from atlases other than the block atlas
        #[arg(long)]
        allow_foreign_sprites: bool,
    },

    /// Show information about a resource pack
    Info {
        /// Path to resource pack (ZIP or directory)
        #[arg(short = 'r', long = "pack")]
        resource_pack: PathBuf,
    },
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid property format: '{}'. Use key=value", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

fn parse_quadrant(s: &str) -> Result<Quadrant, String> {
    s.parse::<i32>()
        .ok()
        .and_then(Quadrant::from_degrees)
        .ok_or_else(|| format!("Invalid rotation '{}'. Use 0, 90, 180 or 270", s))
}

fn parse_location(name: &str) -> Result<ResourceLocation, Box<dyn std::error::Error>> {
    ResourceLocation::parse(name).ok_or_else(|| format!("Invalid resource location '{}'", name).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match cli.workers {
        Some(workers) => BakeConfig::default().with_workers(workers),
        None => BakeConfig::default(),
    };

    match cli.command {
        Commands::Model {
            model,
            resource_pack,
            x,
            y,
            uvlock,
        } => {
            bake_single_model(&model, &resource_pack, ModelState::new(x, y, uvlock))?;
        }
        Commands::Block {
            block,
            property,
            resource_pack,
            seed,
        } => {
            bake_single_state(&block, &property, &resource_pack, seed)?;
        }
        Commands::All {
            resource_pack,
            allow_foreign_sprites,
        } => {
            let config = config.with_reject_foreign_sprites(!allow_foreign_sprites);
            bake_all(&resource_pack, &config)?;
        }
        Commands::Info { resource_pack } => {
            show_pack_info(&resource_pack)?;
        }
    }

    Ok(())
}

fn bake_single_model(
    model: &str,
    resource_pack_path: &PathBuf,
    state: ModelState,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading resource pack from {:?}...", resource_pack_path);
    let pack = load_resource_pack(resource_pack_path)?;
    let sprites = Arc::new(SpriteAtlas::from_pack(&pack));
    println!("  Found {} sprites", sprites.sprite_count());

    let location = parse_location(model)?;
    let baker = ModelBaker::new(&pack, sprites);
    let item = baker.bake_item_model(&location);
    if item.is_missing {
        println!("Model {} not found, baked the missing model", location);
    }

    let part = baker.bake_part(&location, state);
    println!("Baked {} with {:?}", location, state);
    println!("  Ambient occlusion: {}", part.ambient_occlusion);
    println!("  GUI light: {:?}", item.gui_light);
    println!("  Particle: {}", part.particle.name());
    print_quads(&part.quads);

    Ok(())
}

fn bake_single_state(
    block: &str,
    properties: &[(String, String)],
    resource_pack_path: &PathBuf,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading resource pack from {:?}...", resource_pack_path);
    let pack = load_resource_pack(resource_pack_path)?;
    let sprites = Arc::new(SpriteAtlas::from_pack(&pack));

    let block = parse_location(block)?;
    let definition = pack
        .get_blockstate(&block)
        .ok_or_else(|| format!("No blockstate definition for {}", block))?;
    let states = StateDefinition::infer(block.clone(), definition);
    let values: Vec<(&str, &str)> = properties
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let wanted = states.state_with(&values)?;

    let baker = ModelBaker::new(&pack, sprites);
    let root = instantiate_roots(&states, definition)?
        .into_iter()
        .find(|(state, _)| *state == wanted)
        .and_then(|(_, root)| root);
    let model = match root {
        Some(root) => baker.bake_root(&root),
        None => {
            println!("No model matches {}, using the missing model", wanted);
            baker.missing()
        }
    };

    println!("Baked {}", wanted);
    let parts = model.collect_parts(seed);
    for (i, part) in parts.iter().enumerate() {
        println!("  Part {}: particle {}", i, part.particle.name());
        print_quads(&part.quads);
    }

    Ok(())
}

fn bake_all(
    resource_pack_path: &PathBuf,
    config: &BakeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading resource pack from {:?}...", resource_pack_path);
    let pack = load_resource_pack(resource_pack_path)?;
    println!("  Found {} blockstates", pack.blockstate_count());
    let sprites = Arc::new(SpriteAtlas::from_pack(&pack));

    println!("Baking with {} workers...", config.workers);
    let result = bake_blocks(&pack, sprites, &HashMap::new(), config);

    println!("  States: {}", result.models.len());
    println!("  Unique roots baked: {}", result.baked_roots);
    println!("  Rejected roots: {}", result.rejected_roots);
    if !result.failed_blocks.is_empty() {
        println!("  Failed blocks:");
        for block in &result.failed_blocks {
            println!("    {}", block);
        }
    }

    Ok(())
}

fn show_pack_info(resource_pack_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading resource pack from {:?}...", resource_pack_path);
    let pack = load_resource_pack(resource_pack_path)?;

    println!("\nResource Pack Info:");
    println!("  Namespaces: {}", pack.namespaces().join(", "));
    println!("  Blockstates: {}", pack.blockstate_count());
    println!("  Models: {}", pack.model_count());
    println!("  Textures: {}", pack.texture_count());

    Ok(())
}

fn print_quads(quads: &QuadCollection) {
    let tinted = quads.all().filter(|quad| quad.is_tinted()).count();
    println!("    Quads: {} ({} tinted)", quads.len(), tinted);
    let buckets = std::iter::once(None).chain(Direction::ALL.into_iter().map(Some));
    for bucket in buckets {
        let quads = quads.quads(bucket);
        if quads.is_empty() {
            continue;
        }
        let mut by_facing: BTreeMap<String, usize> = BTreeMap::new();
        for quad in quads {
            *by_facing.entry(format!("{:?}", quad.direction)).or_default() += 1;
        }
        let label = bucket.map_or_else(|| "unculled".to_string(), |d| format!("{:?}", d));
        println!("      {}: {:?}", label, by_facing);
    }
}
