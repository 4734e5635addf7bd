//! Offline puzzle generator for Grav.
//!
//! Generates random levels, keeps the ones the solver can crack within
//! budget, scores them, and packs the difficulty-sorted pool into tiered
//! bundle files for the game runtime.

mod config;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use grav_core::{
    sort_pool, Bundle, BundleTier, DifficultyWeights, GenParams, Generator, PuzzleEntry, Rng,
    Solver, BUNDLE_SIZE, SOLVER_DEFAULT_DEPTH, SOLVER_DEFAULT_MAX_STATES,
};

use config::{Config, ConfigError};

const DEFAULT_CONFIG_PATH: &str = "puzzlegen.cfg";
const DEFAULT_NUM_PUZZLES: i64 = 100;
const DEFAULT_OUTPUT_DIR: &str = "bundles";
const DEFAULT_TIER_NAME: &str = "medium";
const DEFAULT_MAX_ATTEMPTS: i64 = 1000;

/// Command-line options. Zero or absent values fall back to the config
/// file, then to hardcoded defaults.
#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    config_path: String,
    /// Whether `-c` was given, which makes a missing file an error.
    config_path_explicit: bool,
    num_puzzles: i64,
    tier_name: Option<String>,
    seed: i64,
    output_dir: Option<String>,
    verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG_PATH.to_string(),
            config_path_explicit: false,
            num_puzzles: 0,
            tier_name: None,
            seed: 0,
            output_dir: None,
            verbose: false,
        }
    }
}

fn print_usage() {
    println!("Usage: puzzlegen [options]");
    println!("  -c <path>    Config file (default: {DEFAULT_CONFIG_PATH})");
    println!("  -n <count>   Number of puzzles to generate");
    println!("  -t <tier>    Bundle tier: easy|medium|hard|expert");
    println!("  -s <seed>    RNG seed (0 = random)");
    println!("  -o <dir>     Output directory");
    println!("  -v           Verbose output");
}

/// Parse argv. Unknown flags print the usage block and are skipped.
fn parse_args(args: &[String]) -> CliArgs {
    let mut cli = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-c" if i + 1 < args.len() => {
                cli.config_path = args[i + 1].clone();
                cli.config_path_explicit = true;
                i += 2;
            }
            "-n" if i + 1 < args.len() => {
                cli.num_puzzles = args[i + 1].parse().unwrap_or(0);
                i += 2;
            }
            "-t" if i + 1 < args.len() => {
                cli.tier_name = Some(args[i + 1].clone());
                i += 2;
            }
            "-s" if i + 1 < args.len() => {
                cli.seed = args[i + 1].parse().unwrap_or(0);
                i += 2;
            }
            "-o" if i + 1 < args.len() => {
                cli.output_dir = Some(args[i + 1].clone());
                i += 2;
            }
            "-v" => {
                cli.verbose = true;
                i += 1;
            }
            _ => {
                print_usage();
                i += 1;
            }
        }
    }
    cli
}

/// Load the config file. A missing file at the default path is an empty
/// config; a missing explicitly-requested file is an error.
fn load_config(cli: &CliArgs) -> Result<Config> {
    match Config::load(&cli.config_path) {
        Ok(cfg) => Ok(cfg),
        Err(ConfigError::Io(err))
            if err.kind() == ErrorKind::NotFound && !cli.config_path_explicit =>
        {
            Ok(Config::default())
        }
        Err(err) => Err(err).with_context(|| format!("failed to load config {}", cli.config_path)),
    }
}

fn gen_params_from_config(cfg: &Config) -> GenParams {
    let mut params = GenParams::default();
    if let Some((lo, hi)) = cfg.range("grid_width") {
        params.width_min = lo;
        params.width_max = hi;
    }
    if let Some((lo, hi)) = cfg.range("grid_height") {
        params.height_min = lo;
        params.height_max = hi;
    }
    if let Some((lo, hi)) = cfg.range("num_gems") {
        params.gems_min = lo;
        params.gems_max = hi;
    }
    if let Some((lo, hi)) = cfg.range("num_crates") {
        params.crates_min = lo;
        params.crates_max = hi;
    }
    if let Some((lo, hi)) = cfg.range("num_colors") {
        params.colors_min = lo;
        params.colors_max = hi;
    }
    if let Some((lo, hi)) = cfg.range("wall_density") {
        params.wall_density_min = lo;
        params.wall_density_max = hi;
    }
    params
}

fn weights_from_config(cfg: &Config) -> DifficultyWeights {
    let mut weights = DifficultyWeights::default();
    if let Some(value) = cfg.int("weight_moves") {
        weights.moves = value as f32 / 100.0;
    }
    if let Some(value) = cfg.int("weight_gems") {
        weights.gems = value as f32 / 100.0;
    }
    if let Some(value) = cfg.int("weight_colors") {
        weights.colors = value as f32 / 100.0;
    }
    if let Some(value) = cfg.int("weight_density") {
        weights.density = value as f32 / 100.0;
    }
    weights
}

/// Tier bands live in the config as percent ranges, e.g.
/// `bundle_tier_hard = [55,80]`.
fn tier_from_config(cfg: &Config, tier_name: &str) -> BundleTier {
    let mut tier = BundleTier::default();
    if let Some((lo, hi)) = cfg.range(&format!("bundle_tier_{tier_name}")) {
        tier.min_difficulty = lo as f32 / 100.0;
        tier.max_difficulty = hi as f32 / 100.0;
    }
    tier
}

fn resolve_seed(cli_seed: i64, cfg: &Config) -> i64 {
    if cli_seed != 0 {
        return cli_seed;
    }
    match cfg.int("seed") {
        Some(seed) if seed != 0 => seed,
        _ => grav_core::rng::entropy_seed() as i64,
    }
}

fn run(cli: &CliArgs) -> Result<ExitCode> {
    let cfg = load_config(cli)?;

    let num_puzzles = if cli.num_puzzles != 0 {
        cli.num_puzzles
    } else {
        cfg.int("num_puzzles").unwrap_or(DEFAULT_NUM_PUZZLES)
    };
    let seed = resolve_seed(cli.seed, &cfg);
    let tier_name = cli
        .tier_name
        .clone()
        .or_else(|| cfg.string("bundle_tier").map(str::to_string))
        .unwrap_or_else(|| DEFAULT_TIER_NAME.to_string());
    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| cfg.string("output_dir").map(str::to_string))
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    let max_attempts = cfg.int("max_attempts").unwrap_or(DEFAULT_MAX_ATTEMPTS);
    let max_solve_moves = cfg
        .int("max_solve_moves")
        .unwrap_or(SOLVER_DEFAULT_DEPTH as i64);
    let max_visited = cfg
        .int("max_visited_states")
        .unwrap_or(SOLVER_DEFAULT_MAX_STATES as i64);

    println!("puzzlegen: seed={seed} puzzles={num_puzzles} tier={tier_name} output={output_dir}");

    let gen_params = gen_params_from_config(&cfg);
    let weights = weights_from_config(&cfg);
    let tier = tier_from_config(&cfg, &tier_name);

    let mut generator = Generator::new(gen_params, Rng::seeded(seed as u64));
    let solver = Solver::new(max_solve_moves as usize, max_visited as usize);

    let mut pool: Vec<PuzzleEntry> = Vec::new();
    let mut attempts = 0i64;
    while (pool.len() as i64) < num_puzzles && attempts < max_attempts {
        attempts += 1;

        let Some(level) = generator.generate() else {
            continue;
        };
        let solve = solver.solve(&level);
        if !solve.solvable {
            continue;
        }
        let difficulty = weights.score(&level, &solve, max_solve_moves as i32);

        if cli.verbose {
            println!(
                "  [{}/{}] solvable in {} moves, difficulty={:.4} (explored {} states)",
                pool.len() + 1,
                num_puzzles,
                solve.optimal_moves,
                difficulty,
                solve.states_explored
            );
        }

        pool.push(PuzzleEntry {
            level,
            solve,
            difficulty,
        });
    }

    println!(
        "Generated {}/{} solvable puzzles in {} attempts",
        pool.len(),
        num_puzzles,
        attempts
    );

    if pool.len() < BUNDLE_SIZE {
        bail!(
            "not enough puzzles for a bundle (need at least {BUNDLE_SIZE}, got {})",
            pool.len()
        );
    }

    sort_pool(&mut pool);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {output_dir}"))?;

    let mut bundles_written = 0usize;
    let mut offset = 0usize;
    loop {
        let Some(bundle) = Bundle::assemble(&pool[offset..], &tier) else {
            break;
        };

        let bin_path =
            Path::new(&output_dir).join(format!("bundle_{tier_name}_{bundles_written:03}.bin"));
        let meta_path =
            Path::new(&output_dir).join(format!("bundle_{tier_name}_{bundles_written:03}.txt"));

        match bundle.write(&bin_path, &meta_path) {
            Ok(()) => {
                println!(
                    "Wrote bundle: {} (difficulties: {:.2} -> {:.2})",
                    bin_path.display(),
                    bundle.difficulty_scores[0],
                    bundle.difficulty_scores[BUNDLE_SIZE - 1]
                );
                bundles_written += 1;
            }
            Err(err) => {
                eprintln!("puzzlegen: failed to write {}: {err}", bin_path.display());
            }
        }

        offset += BUNDLE_SIZE;
        if offset + BUNDLE_SIZE > pool.len() {
            break;
        }
    }

    println!("Summary: {bundles_written} bundles written to {output_dir}/");

    if bundles_written == 0 {
        bail!("no bundle fit the {tier_name} tier");
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_args(&args);
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("puzzlegen: {err:#}");
            ExitCode::FAILURE
        }
    }
}
