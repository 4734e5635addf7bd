//! Breadth-first optimal solver.
//!
//! Explores tilts from the initial state, deduplicating states through an
//! order-independent FNV-1a fingerprint. Hash equality is treated as state
//! equality; the `max_states` budget bounds the practical collision impact.

use std::collections::{HashSet, VecDeque};

use arrayvec::ArrayVec;

use crate::level::{Direction, GemColor, Level, Pos, ELEMENTS_MAX};
use crate::sim::SimState;

/// Upper bound on the length of a returned move list.
pub const SOLVER_MAX_MOVES: usize = 64;
/// Default search depth cap.
pub const SOLVER_DEFAULT_DEPTH: usize = 15;
/// Default visited-set budget.
pub const SOLVER_DEFAULT_MAX_STATES: usize = 2_000_000;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

struct Fnv64(u64);

impl Fnv64 {
    fn new() -> Fnv64 {
        Fnv64(FNV_OFFSET)
    }

    fn write_u8(&mut self, byte: u8) {
        self.0 ^= byte as u64;
        self.0 = self.0.wrapping_mul(FNV_PRIME);
    }

    fn write_i32(&mut self, value: i32) {
        for byte in value.to_le_bytes() {
            self.write_u8(byte);
        }
    }

    fn finish(self) -> u64 {
        self.0
    }
}

/// Canonical fingerprint of a sim state.
///
/// Crate positions and active gems are sorted by row-major cell order before
/// hashing, so two operationally identical states hash equal regardless of
/// internal array order.
pub fn state_hash(state: &SimState) -> u64 {
    let mut hasher = Fnv64::new();

    let mut crates: ArrayVec<Pos, ELEMENTS_MAX> = state.crates().iter().copied().collect();
    crates.sort_by_key(|pos| pos.scan_key());
    for pos in &crates {
        hasher.write_i32(pos.x);
        hasher.write_i32(pos.y);
    }

    let mut gems: ArrayVec<(Pos, GemColor), ELEMENTS_MAX> = state
        .gems()
        .iter()
        .zip(state.gem_colors())
        .enumerate()
        .filter(|&(i, _)| state.gem_is_active(i))
        .map(|(_, (&pos, &color))| (pos, color))
        .collect();
    gems.sort_by_key(|(pos, _)| pos.scan_key());
    for &(pos, color) in &gems {
        hasher.write_i32(pos.x);
        hasher.write_i32(pos.y);
        hasher.write_u8(color as u8);
    }

    hasher.write_i32(state.gems_active() as i32);
    hasher.write_u8(state.current_gravity() as u8);
    hasher.finish()
}

/// Outcome of one solver run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveResult {
    pub solvable: bool,
    /// Length of the shortest solution, when solvable.
    pub optimal_moves: i32,
    /// Number of states dequeued during the search.
    pub states_explored: i32,
    /// One shortest move sequence, when solvable.
    pub solution: ArrayVec<Direction, SOLVER_MAX_MOVES>,
}

struct SolverNode {
    state: SimState,
    moves: ArrayVec<Direction, SOLVER_MAX_MOVES>,
}

/// Budgeted breadth-first solver.
#[derive(Debug, Clone, Copy)]
pub struct Solver {
    pub max_depth: usize,
    pub max_states: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SOLVER_DEFAULT_DEPTH, SOLVER_DEFAULT_MAX_STATES)
    }
}

impl Solver {
    pub fn new(max_depth: usize, max_states: usize) -> Solver {
        Solver {
            max_depth: max_depth.min(SOLVER_MAX_MOVES),
            max_states,
        }
    }

    /// Search for a shortest solution from the level's initial state.
    ///
    /// Every node expands the three directions other than its own gravity.
    /// Returns `solvable = false` once the visited set reaches `max_states`
    /// or the frontier empties without finding a solved state.
    pub fn solve(&self, level: &Level) -> SolveResult {
        let mut result = SolveResult::default();

        let start = SimState::new(level);
        if start.is_solved() {
            result.solvable = true;
            result.states_explored = 1;
            return result;
        }

        let mut visited: HashSet<u64> = HashSet::new();
        let mut frontier: VecDeque<SolverNode> = VecDeque::new();
        visited.insert(state_hash(&start));
        frontier.push_back(SolverNode {
            state: start,
            moves: ArrayVec::new(),
        });

        loop {
            if visited.len() >= self.max_states {
                break;
            }
            let Some(node) = frontier.pop_front() else {
                break;
            };
            result.states_explored += 1;

            if node.moves.len() >= self.max_depth {
                continue;
            }

            for dir in Direction::ALL {
                if dir == node.state.current_gravity() {
                    continue;
                }

                let mut next = node.state.clone();
                next.apply_move(level, dir);

                if !visited.insert(state_hash(&next)) {
                    continue;
                }

                let mut moves = node.moves.clone();
                moves.push(dir);

                if next.is_solved() {
                    result.solvable = true;
                    result.optimal_moves = moves.len() as i32;
                    result.states_explored += 1;
                    result.solution = moves;
                    return result;
                }

                frontier.push_back(SolverNode { state: next, moves });
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::GemColor;

    /// Replay a returned solution through the simulator.
    fn replay_solves(level: &Level, solution: &[Direction]) -> bool {
        let mut state = SimState::new(level);
        for &dir in solution {
            state.apply_move(level, dir);
        }
        state.is_solved()
    }

    #[test]
    fn test_adjacent_pair_solves_in_one_move() {
        let mut level = Level::with_border(4, 4, Direction::Down);
        level.add_gem(Pos::new(1, 1), GemColor::Red);
        level.add_gem(Pos::new(1, 2), GemColor::Red);

        let result = Solver::default().solve(&level);
        assert!(result.solvable);
        assert_eq!(result.optimal_moves, 1);
        assert_eq!(result.solution.len(), 1);
        assert!(replay_solves(&level, &result.solution));
    }

    #[test]
    fn test_separated_pair_needs_two_moves() {
        // A wall between the two reds blocks every one-move line-up; dropping
        // them to the floor and then tilting sideways joins them.
        let mut level = Level::with_border(5, 5, Direction::Up);
        level.set_solid(Pos::new(2, 1), true);
        level.add_gem(Pos::new(1, 1), GemColor::Red);
        level.add_gem(Pos::new(3, 1), GemColor::Red);

        let result = Solver::default().solve(&level);
        assert!(result.solvable);
        assert_eq!(result.optimal_moves, 2);
        assert!(replay_solves(&level, &result.solution));
    }

    #[test]
    fn test_mismatched_colors_unsolvable() {
        let mut level = Level::with_border(5, 5, Direction::Down);
        level.add_gem(Pos::new(1, 1), GemColor::Red);
        level.add_gem(Pos::new(3, 1), GemColor::Blue);

        let result = Solver::default().solve(&level);
        assert!(!result.solvable);
        assert!(result.states_explored > 0);
    }

    #[test]
    fn test_already_solved_level() {
        let level = Level::with_border(4, 4, Direction::Down);
        let result = Solver::default().solve(&level);
        assert!(result.solvable);
        assert_eq!(result.optimal_moves, 0);
        assert_eq!(result.states_explored, 1);
        assert!(result.solution.is_empty());
    }

    #[test]
    fn test_never_plays_current_gravity_first() {
        let mut level = Level::with_border(4, 4, Direction::Down);
        level.add_gem(Pos::new(1, 1), GemColor::Red);
        level.add_gem(Pos::new(1, 2), GemColor::Red);

        let result = Solver::default().solve(&level);
        assert!(result.solvable);
        assert_ne!(result.solution[0], Direction::Down);
    }

    #[test]
    fn test_depth_budget_reports_unsolvable() {
        let mut level = Level::with_border(5, 5, Direction::Up);
        level.set_solid(Pos::new(2, 1), true);
        level.add_gem(Pos::new(1, 1), GemColor::Red);
        level.add_gem(Pos::new(3, 1), GemColor::Red);

        let result = Solver::new(1, SOLVER_DEFAULT_MAX_STATES).solve(&level);
        assert!(!result.solvable);
    }

    #[test]
    fn test_state_budget_reports_unsolvable() {
        let mut level = Level::with_border(5, 5, Direction::Up);
        level.set_solid(Pos::new(2, 1), true);
        level.add_gem(Pos::new(1, 1), GemColor::Red);
        level.add_gem(Pos::new(3, 1), GemColor::Red);

        let result = Solver::new(SOLVER_DEFAULT_DEPTH, 1).solve(&level);
        assert!(!result.solvable);
    }

    #[test]
    fn test_hash_ignores_internal_order() {
        let gems = [
            (Pos::new(1, 1), GemColor::Red),
            (Pos::new(3, 2), GemColor::Green),
            (Pos::new(2, 4), GemColor::Blue),
        ];
        let crates = [Pos::new(4, 4), Pos::new(2, 2)];

        let forward = SimState::from_parts(&crates, &gems, 0b111, Direction::Down);
        let reversed_gems = [gems[2], gems[1], gems[0]];
        let reversed_crates = [crates[1], crates[0]];
        let backward =
            SimState::from_parts(&reversed_crates, &reversed_gems, 0b111, Direction::Down);

        assert_eq!(state_hash(&forward), state_hash(&backward));
    }

    #[test]
    fn test_hash_depends_on_gravity_and_mask() {
        let gems = [(Pos::new(1, 1), GemColor::Red), (Pos::new(3, 3), GemColor::Red)];
        let a = SimState::from_parts(&[], &gems, 0b11, Direction::Down);
        let b = SimState::from_parts(&[], &gems, 0b11, Direction::Left);
        let c = SimState::from_parts(&[], &gems, 0b01, Direction::Down);
        assert_ne!(state_hash(&a), state_hash(&b));
        assert_ne!(state_hash(&a), state_hash(&c));
    }

    #[test]
    fn test_hash_distinguishes_positions() {
        let a = SimState::from_parts(
            &[],
            &[(Pos::new(1, 1), GemColor::Red)],
            0b1,
            Direction::Down,
        );
        let b = SimState::from_parts(
            &[],
            &[(Pos::new(2, 1), GemColor::Red)],
            0b1,
            Direction::Down,
        );
        assert_ne!(state_hash(&a), state_hash(&b));
    }
}
