//! End-to-end pipeline tests: generate, solve, score, sort, bundle.

use grav_core::{
    sort_pool, Bundle, BundleTier, DifficultyWeights, GenParams, Generator, Level, PuzzleEntry,
    Rng, SimState, Solver, LEVEL_FILE_SIZE,
};

const MAX_SOLVE_MOVES: usize = 8;

fn pipeline_params() -> GenParams {
    GenParams {
        width_min: 5,
        width_max: 7,
        height_min: 5,
        height_max: 7,
        gems_min: 2,
        gems_max: 6,
        crates_min: 0,
        crates_max: 2,
        colors_min: 1,
        colors_max: 2,
        wall_density_min: 0,
        wall_density_max: 20,
    }
}

fn build_pool(seed: u64, target: usize) -> Vec<PuzzleEntry> {
    let mut generator = Generator::new(pipeline_params(), Rng::seeded(seed));
    let solver = Solver::new(MAX_SOLVE_MOVES, 50_000);
    let weights = DifficultyWeights::default();

    let mut pool = Vec::new();
    let mut attempts = 0;
    while pool.len() < target && attempts < 3000 {
        attempts += 1;
        let Some(level) = generator.generate() else {
            continue;
        };
        let solve = solver.solve(&level);
        if !solve.solvable {
            continue;
        }
        let difficulty = weights.score(&level, &solve, MAX_SOLVE_MOVES as i32);
        pool.push(PuzzleEntry {
            level,
            solve,
            difficulty,
        });
    }
    pool
}

#[test]
fn pool_entries_are_solvable_and_scored() {
    let pool = build_pool(2024, 10);
    assert!(pool.len() >= 5, "only {} solvable puzzles", pool.len());

    for entry in &pool {
        assert!(entry.solve.solvable);
        assert!(entry.solve.optimal_moves as usize <= MAX_SOLVE_MOVES);
        assert!((0.0..=1.0).contains(&entry.difficulty));

        // The reported solution must actually solve the level.
        let mut state = SimState::new(&entry.level);
        for &dir in &entry.solve.solution {
            state.apply_move(&entry.level, dir);
        }
        assert!(state.is_solved());
        assert_eq!(entry.solve.solution.len() as i32, entry.solve.optimal_moves);
    }
}

#[test]
fn seeded_runs_are_bitwise_identical() {
    let mut first = build_pool(777, 10);
    let mut second = build_pool(777, 10);
    assert_eq!(first.len(), second.len());

    sort_pool(&mut first);
    sort_pool(&mut second);

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.level.encode(), b.level.encode());
        assert_eq!(a.difficulty.to_bits(), b.difficulty.to_bits());
        assert_eq!(a.solve.optimal_moves, b.solve.optimal_moves);
        assert_eq!(a.solve.solution, b.solve.solution);
    }
}

#[test]
fn bundle_round_trips_through_files() {
    let mut pool = build_pool(4242, 12);
    assert!(pool.len() >= 5, "only {} solvable puzzles", pool.len());
    sort_pool(&mut pool);

    let tier = BundleTier {
        min_difficulty: 0.0,
        max_difficulty: 1.0,
    };
    let bundle = Bundle::assemble(&pool, &tier).expect("full band assembles");

    for slot in 1..bundle.difficulty_scores.len() {
        assert!(bundle.difficulty_scores[slot] >= bundle.difficulty_scores[slot - 1]);
    }

    let dir = std::env::temp_dir();
    let bin_path = dir.join("grav_pipeline_bundle.bin");
    let meta_path = dir.join("grav_pipeline_bundle.txt");
    bundle.write(&bin_path, &meta_path).unwrap();

    let data = std::fs::read(&bin_path).unwrap();
    let meta = std::fs::read_to_string(&meta_path).unwrap();
    std::fs::remove_file(&bin_path).unwrap();
    std::fs::remove_file(&meta_path).unwrap();

    assert_eq!(data.len(), 5 * LEVEL_FILE_SIZE);
    for (chunk, level) in data.chunks(LEVEL_FILE_SIZE).zip(&bundle.levels) {
        assert_eq!(&Level::decode(chunk).unwrap(), level);
    }
    assert!(meta.starts_with("# Bundle metadata\n"));
    assert_eq!(meta.lines().count(), 6);
}
