//! Bundle assembly over a difficulty-sorted puzzle pool.
//!
//! A bundle is five levels of escalating difficulty picked from a tier band,
//! written as one 540-byte binary plus a human-readable metadata sidecar.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::level::{Level, LEVEL_FILE_SIZE};
use crate::solver::SolveResult;

/// Number of levels per bundle.
pub const BUNDLE_SIZE: usize = 5;

/// Difficulty band admitted into a bundle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BundleTier {
    pub min_difficulty: f32,
    pub max_difficulty: f32,
}

impl Default for BundleTier {
    /// The medium band.
    fn default() -> Self {
        Self {
            min_difficulty: 0.25,
            max_difficulty: 0.60,
        }
    }
}

/// One generated, solved and scored puzzle in the pool.
#[derive(Debug, Clone)]
pub struct PuzzleEntry {
    pub level: Level,
    pub solve: SolveResult,
    pub difficulty: f32,
}

/// Five levels in ascending difficulty with their scores and solve lengths.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub levels: [Level; BUNDLE_SIZE],
    pub difficulty_scores: [f32; BUNDLE_SIZE],
    pub optimal_moves: [i32; BUNDLE_SIZE],
}

/// Stable ascending sort by difficulty.
pub fn sort_pool(pool: &mut [PuzzleEntry]) {
    pool.sort_by(|a, b| a.difficulty.total_cmp(&b.difficulty));
}

impl Bundle {
    /// Pick five puzzles from the tier band of a difficulty-sorted pool.
    ///
    /// The band spans the first entry at or above the tier minimum through
    /// the last entry at or below the maximum. Slots sit at evenly spaced
    /// indices across the band, so difficulty never decreases within the
    /// bundle. Returns `None` when the band is missing or holds fewer than
    /// [`BUNDLE_SIZE`] puzzles.
    pub fn assemble(sorted_pool: &[PuzzleEntry], tier: &BundleTier) -> Option<Bundle> {
        let mut tier_start = None;
        let mut tier_end = None;
        for (i, entry) in sorted_pool.iter().enumerate() {
            if tier_start.is_none() && entry.difficulty >= tier.min_difficulty {
                tier_start = Some(i);
            }
            if entry.difficulty <= tier.max_difficulty {
                tier_end = Some(i);
            }
        }
        let (start, end) = (tier_start?, tier_end?);
        if end < start || end - start + 1 < BUNDLE_SIZE {
            return None;
        }
        let range = end - start + 1;

        let mut levels = [sorted_pool[start].level; BUNDLE_SIZE];
        let mut difficulty_scores = [0.0f32; BUNDLE_SIZE];
        let mut optimal_moves = [0i32; BUNDLE_SIZE];
        for slot in 0..BUNDLE_SIZE {
            let index = start + slot * (range - 1) / (BUNDLE_SIZE - 1);
            levels[slot] = sorted_pool[index].level;
            difficulty_scores[slot] = sorted_pool[index].difficulty;
            optimal_moves[slot] = sorted_pool[index].solve.optimal_moves;
        }

        Some(Bundle {
            levels,
            difficulty_scores,
            optimal_moves,
        })
    }

    /// Write the binary records and the metadata sidecar.
    pub fn write(&self, bin_path: impl AsRef<Path>, meta_path: impl AsRef<Path>) -> io::Result<()> {
        let mut data = Vec::with_capacity(BUNDLE_SIZE * LEVEL_FILE_SIZE);
        for level in &self.levels {
            data.extend_from_slice(&level.encode());
        }
        fs::write(bin_path, &data)?;

        let mut meta = String::from("# Bundle metadata\n");
        for i in 0..BUNDLE_SIZE {
            let _ = writeln!(
                meta,
                "level_{}: difficulty={:.4} optimal_moves={}",
                i, self.difficulty_scores[i], self.optimal_moves[i]
            );
        }
        fs::write(meta_path, meta)
    }
}
