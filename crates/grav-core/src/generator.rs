//! Random level generator.
//!
//! Samples board dimensions, walls and element placements from a seeded
//! stream, rejecting boards that cannot hold their elements or that would
//! pop gems before the first move. Rejections are expected; callers retry
//! under an attempts budget.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::level::{Direction, GemColor, Level, Pos, MAP_MAX_CELLS};
use crate::rng::Rng;

/// Inclusive sampling ranges for one generation attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenParams {
    pub width_min: i32,
    pub width_max: i32,
    pub height_min: i32,
    pub height_max: i32,
    pub gems_min: i32,
    pub gems_max: i32,
    pub crates_min: i32,
    pub crates_max: i32,
    pub colors_min: i32,
    pub colors_max: i32,
    /// Interior wall density, percent of interior cells.
    pub wall_density_min: i32,
    pub wall_density_max: i32,
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            width_min: 6,
            width_max: 10,
            height_min: 6,
            height_max: 10,
            gems_min: 4,
            gems_max: 12,
            crates_min: 0,
            crates_max: 4,
            colors_min: 2,
            colors_max: 3,
            wall_density_min: 15,
            wall_density_max: 35,
        }
    }
}

/// Random level generator over a seeded stream.
pub struct Generator {
    params: GenParams,
    rng: Rng,
}

impl Generator {
    pub fn new(params: GenParams, rng: Rng) -> Generator {
        Generator { params, rng }
    }

    /// Default parameters with a fixed seed, for reproducible runs.
    pub fn with_seed(seed: u64) -> Generator {
        Generator::new(GenParams::default(), Rng::seeded(seed))
    }

    /// One generation attempt.
    ///
    /// Returns `None` when the sampled board rejects: too few open cells for
    /// the sampled element counts, or two same-color gems starting adjacent
    /// (they would pop before the first move).
    pub fn generate(&mut self) -> Option<Level> {
        let p = self.params;
        let width = self.sample_range(p.width_min, p.width_max);
        let height = self.sample_range(p.height_min, p.height_max);
        let num_colors = self.sample_range(p.colors_min, p.colors_max);
        let num_gems = self.sample_range(p.gems_min, p.gems_max) as usize;
        let num_crates = self.sample_range(p.crates_min, p.crates_max) as usize;
        let start_gravity = Direction::ALL[self.rng.next_below(4) as usize];

        let mut level = Level::with_border(width, height, start_gravity);

        // Interior walls by density; duplicate picks just land on the same
        // cell, so the effective density can come in under the target.
        let interior_cells = (width - 2) * (height - 2);
        let density = self.sample_range(p.wall_density_min, p.wall_density_max);
        let num_walls = interior_cells * density / 100;
        for _ in 0..num_walls {
            let x = self.rng.next_in(1, (width - 1) as u32) as i32;
            let y = self.rng.next_in(1, (height - 1) as u32) as i32;
            level.set_solid(Pos::new(x, y), true);
        }

        let mut open: ArrayVec<Pos, MAP_MAX_CELLS> = ArrayVec::new();
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let pos = Pos::new(x, y);
                if !level.is_solid(pos) {
                    open.push(pos);
                }
            }
        }

        if open.len() < num_gems + num_crates {
            return None;
        }

        self.rng.shuffle(&mut open);

        for (i, &pos) in open.iter().take(num_gems).enumerate() {
            level.add_gem(pos, GemColor::ALL[i % num_colors as usize]);
        }

        {
            let gems = level.gem_starts();
            let colors = level.gem_colors();
            for i in 0..gems.len() {
                for j in i + 1..gems.len() {
                    if colors[i] == colors[j] && gems[i].manhattan(gems[j]) == 1 {
                        return None;
                    }
                }
            }
        }

        for &pos in open.iter().skip(num_gems).take(num_crates) {
            level.add_crate(pos);
        }

        Some(level)
    }

    /// Uniform sample from an inclusive range.
    fn sample_range(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.next_in(lo as u32, hi as u32 + 1) as i32
    }
}
