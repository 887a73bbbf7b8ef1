//! CLI utility for baking tile caches and simulating window streaming

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

use tilestream::{group_centroid, CacheSnapshot, TileCache, TileStreamingManager};
use tilestream_common::TileCoord;
use tilestream_mesh::{NavMesh, NavMeshParams, PlanarSource};

/// A CLI utility for baking navigation-mesh tile caches and streaming them
/// through a sliding window
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bake every tile payload of a procedural grid into a snapshot file
    Bake {
        /// Output snapshot file (.json for JSON, anything else for binary)
        #[clap(long, value_parser)]
        output: PathBuf,

        /// Tiles per grid side
        #[clap(long, default_value = "16")]
        grid_size: i32,

        /// Tile edge length in world units
        #[clap(long, default_value = "10.0")]
        tile_size: f32,

        /// Number of obstructed tiles to scatter across the grid
        #[clap(long, default_value = "8")]
        obstacles: usize,

        /// Seed for obstacle placement
        #[clap(long, default_value = "42")]
        seed: u64,
    },

    /// Walk agents across a grid and report streaming traffic per tick
    Simulate {
        /// Baked snapshot to stream from (omit to generate a fresh grid)
        #[clap(long, value_parser)]
        snapshot: Option<PathBuf>,

        /// Streaming radius in tiles
        #[clap(long, default_value = "2")]
        radius: i32,

        /// Number of window updates along the walk
        #[clap(long, default_value = "32")]
        ticks: u32,

        /// Agents sharing one window, centered on their centroid
        #[clap(long, default_value = "1")]
        agents: usize,

        /// Tiles per grid side when no snapshot is given
        #[clap(long, default_value = "16")]
        grid_size: i32,

        /// Tile edge length when no snapshot is given
        #[clap(long, default_value = "10.0")]
        tile_size: f32,

        /// Number of obstructed tiles when no snapshot is given
        #[clap(long, default_value = "8")]
        obstacles: usize,

        /// Seed for obstacle placement when no snapshot is given
        #[clap(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match args.command {
        Commands::Bake {
            output,
            grid_size,
            tile_size,
            obstacles,
            seed,
        } => bake_cache(&output, grid_size, tile_size, obstacles, seed),
        Commands::Simulate {
            snapshot,
            radius,
            ticks,
            agents,
            grid_size,
            tile_size,
            obstacles,
            seed,
        } => simulate(
            snapshot.as_deref(),
            radius,
            ticks,
            agents,
            grid_size,
            tile_size,
            obstacles,
            seed,
        ),
    }
}

/// Build a fully meshed grid with a few seed-placed obstructed tiles
fn build_demo_mesh(
    grid_size: i32,
    tile_size: f32,
    obstacles: usize,
    seed: u64,
) -> Result<NavMesh<PlanarSource>> {
    if grid_size <= 0 {
        return Err(anyhow!("grid size must be positive, got {grid_size}"));
    }

    let params = NavMeshParams {
        origin: [0.0, 0.0, 0.0],
        tile_size,
        height: 2.0,
        num_tiles_x: grid_size,
        num_tiles_z: grid_size,
        max_tiles: grid_size * grid_size,
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut source = PlanarSource::new();
    for _ in 0..obstacles {
        let coord = TileCoord::new(rng.gen_range(0..grid_size), rng.gen_range(0..grid_size));
        log::debug!("obstructing tile {coord}");
        source.add_obstruction(params.tile_bounds(coord));
    }

    let mut mesh = NavMesh::new(params, source)
        .map_err(|e| anyhow!("Failed to create mesh: {e}"))?;
    mesh.build().map_err(|e| anyhow!("Failed to build mesh: {e}"))?;
    Ok(mesh)
}

/// Load a snapshot, choosing the format from the file extension
fn load_snapshot(path: &Path) -> Result<CacheSnapshot> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => CacheSnapshot::load_from_json(path),
        _ => CacheSnapshot::load_from_binary(path),
    }
    .map_err(|e| anyhow!("Failed to load snapshot: {e}"))
}

/// Bake every tile payload into a compressed snapshot file
fn bake_cache(
    output: &Path,
    grid_size: i32,
    tile_size: f32,
    obstacles: usize,
    seed: u64,
) -> Result<()> {
    println!("Building {grid_size}x{grid_size} grid ({obstacles} obstructed tiles, seed {seed})...");

    let mesh = build_demo_mesh(grid_size, tile_size, obstacles, seed)?;
    println!(
        "Mesh built: {} of {} tiles present",
        mesh.get_tile_count(),
        grid_size * grid_size
    );

    let cache = TileCache::capture(&mesh)
        .map_err(|e| anyhow!("Failed to capture tile cache: {e}"))?;
    let snapshot = cache
        .to_snapshot(mesh.get_params().clone())
        .map_err(|e| anyhow!("Failed to build snapshot: {e}"))?;

    match output.extension().and_then(|e| e.to_str()) {
        Some("json") => snapshot.save_to_json(output),
        _ => snapshot.save_to_binary(output),
    }
    .map_err(|e| anyhow!("Failed to save snapshot: {e}"))?;

    println!(
        "Saved {} payloads ({} bytes compressed) to {}",
        cache.len(),
        cache.compressed_size(),
        output.display()
    );
    Ok(())
}

/// Stream a window along the grid diagonal and report tile traffic
#[allow(clippy::too_many_arguments)]
fn simulate(
    snapshot: Option<&Path>,
    radius: i32,
    ticks: u32,
    agents: usize,
    grid_size: i32,
    tile_size: f32,
    obstacles: usize,
    seed: u64,
) -> Result<()> {
    if agents == 0 {
        return Err(anyhow!("at least one agent is required"));
    }

    let mut streaming = TileStreamingManager::new(radius)
        .map_err(|e| anyhow!("Failed to create streaming manager: {e}"))?;

    let mut mesh = match snapshot {
        Some(path) => {
            println!("Loading snapshot from {}...", path.display());
            let snapshot = load_snapshot(path)?;
            println!(
                "Snapshot: {}x{} grid, {} payloads",
                snapshot.params.num_tiles_x,
                snapshot.params.num_tiles_z,
                snapshot.tiles.len()
            );

            let cache = snapshot
                .to_cache()
                .map_err(|e| anyhow!("Failed to rebuild tile cache: {e}"))?;
            let mut mesh = NavMesh::new(snapshot.params, PlanarSource::new())
                .map_err(|e| anyhow!("Failed to create mesh: {e}"))?;
            streaming
                .enable_streaming_from_cache(&mut mesh, cache)
                .map_err(|e| anyhow!("Failed to enable streaming: {e}"))?;
            mesh
        }
        None => {
            println!(
                "Building {grid_size}x{grid_size} grid ({obstacles} obstructed tiles, seed {seed})..."
            );
            let mut mesh = build_demo_mesh(grid_size, tile_size, obstacles, seed)?;
            streaming
                .enable_streaming(&mut mesh)
                .map_err(|e| anyhow!("Failed to enable streaming: {e}"))?;
            mesh
        }
    };

    let (nx, nz) = mesh.get_num_tiles();
    println!(
        "Streaming radius {radius} ({} tile window) across {nx}x{nz} grid with {agents} agent(s)",
        streaming.max_active_tiles()
    );

    // Walk the leader between the first and last tile centers.
    let first = mesh.get_params().tile_center(TileCoord::new(0, 0));
    let last = mesh.get_params().tile_center(TileCoord::new(nx - 1, nz - 1));
    let spread = if agents == 1 {
        0.0
    } else {
        mesh.get_params().tile_size * 0.75
    };

    for tick in 0..ticks {
        let t = if ticks > 1 {
            tick as f32 / (ticks - 1) as f32
        } else {
            0.0
        };
        let leader = first.lerp(last, t);

        let positions: Vec<Vec3> = (0..agents)
            .map(|i| {
                let angle = i as f32 / agents as f32 * std::f32::consts::TAU;
                leader + Vec3::new(angle.cos(), 0.0, angle.sin()) * spread
            })
            .collect();
        let center =
            group_centroid(&positions).ok_or_else(|| anyhow!("empty agent group"))?;

        let update = streaming
            .update_window(&mut mesh, center)
            .map_err(|e| anyhow!("Failed to update window: {e}"))?;

        if !update.is_noop() {
            println!(
                "tick {tick:3}: +{} -{} tiles, {} resident",
                update.added.len(),
                update.removed.len(),
                mesh.get_tile_count()
            );
        }
    }

    let stats = streaming.get_stats();
    println!(
        "\nProcessed {} updates: {} tiles in, {} tiles out, {} resident at end",
        stats.updates, stats.tiles_added, stats.tiles_removed, stats.active_tiles
    );

    streaming
        .disable_streaming(&mut mesh)
        .map_err(|e| anyhow!("Failed to disable streaming: {e}"))?;
    println!(
        "Streaming disabled: mesh rebuilt with {} tiles",
        mesh.get_tile_count()
    );

    Ok(())
}
