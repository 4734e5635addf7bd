//! Gravity-cascade simulator.
//!
//! A move tilts the whole board: every element falls along the new gravity
//! until it rests, then connected same-color gems pop and the survivors
//! settle again, repeating until a sweep produces no eliminations.

use arrayvec::ArrayVec;

use crate::level::{Direction, GemColor, Level, Pos, ELEMENTS_MAX};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Crate,
    Gem,
}

/// Mutable play state, created from a [`Level`] by [`SimState::new`].
///
/// Plain value type of a few hundred bytes; cloning one is how the solver
/// creates search children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimState {
    crates: ArrayVec<Pos, ELEMENTS_MAX>,
    gems: ArrayVec<Pos, ELEMENTS_MAX>,
    gem_colors: ArrayVec<GemColor, ELEMENTS_MAX>,
    gems_active: u32,
    current_gravity: Direction,
}

impl SimState {
    /// Copy the level's starting layout into a fresh play state.
    pub fn new(level: &Level) -> SimState {
        let mut crates = ArrayVec::new();
        crates.extend(level.crate_starts().iter().copied());
        let mut gems = ArrayVec::new();
        gems.extend(level.gem_starts().iter().copied());
        let mut gem_colors = ArrayVec::new();
        gem_colors.extend(level.gem_colors().iter().copied());

        let gems_active = if level.num_gems() == 0 {
            0
        } else {
            u32::MAX >> (32 - level.num_gems())
        };

        SimState {
            crates,
            gems,
            gem_colors,
            gems_active,
            current_gravity: level.start_gravity,
        }
    }

    /// Bitmask of gems that have not been eliminated.
    pub fn gems_active(&self) -> u32 {
        self.gems_active
    }

    /// The last-applied gravity direction.
    pub fn current_gravity(&self) -> Direction {
        self.current_gravity
    }

    pub fn crates(&self) -> &[Pos] {
        &self.crates
    }

    pub fn gems(&self) -> &[Pos] {
        &self.gems
    }

    pub fn gem_colors(&self) -> &[GemColor] {
        &self.gem_colors
    }

    pub fn gem_is_active(&self, index: usize) -> bool {
        (self.gems_active >> index) & 1 != 0
    }

    /// A state is solved once every gem has been eliminated.
    pub fn is_solved(&self) -> bool {
        self.gems_active == 0
    }

    /// Apply one player tilt in direction `gravity`: a full gravity sweep,
    /// then eliminate/settle iterations until no more gems pop.
    pub fn apply_move(&mut self, level: &Level, gravity: Direction) {
        self.sweep(level, gravity);
        while self.eliminate_matches() {
            self.sweep(level, self.current_gravity);
        }
    }

    fn position(&self, kind: ElementKind, index: usize) -> Pos {
        match kind {
            ElementKind::Crate => self.crates[index],
            ElementKind::Gem => self.gems[index],
        }
    }

    /// Whether any crate or active gem currently occupies `pos`.
    fn element_at(&self, pos: Pos) -> bool {
        if self.crates.iter().any(|&c| c == pos) {
            return true;
        }
        self.gems
            .iter()
            .enumerate()
            .any(|(i, &g)| self.gem_is_active(i) && g == pos)
    }

    /// Let every element fall along `gravity` until it rests.
    ///
    /// Elements furthest along the gravity direction settle first; later
    /// elements see the already-settled ones as obstacles. The sort is
    /// stable, so equal-distance elements keep crate-then-gem index order
    /// and sweeps are deterministic.
    fn sweep(&mut self, level: &Level, gravity: Direction) {
        self.current_gravity = gravity;
        let dir = gravity.unit();

        let mut order: ArrayVec<(ElementKind, usize), { ELEMENTS_MAX * 2 }> = ArrayVec::new();
        for i in 0..self.crates.len() {
            order.push((ElementKind::Crate, i));
        }
        for i in 0..self.gems.len() {
            if self.gem_is_active(i) {
                order.push((ElementKind::Gem, i));
            }
        }
        order.sort_by_key(|&(kind, i)| std::cmp::Reverse(self.position(kind, i).dot(dir)));

        for &(kind, i) in &order {
            let mut next = self.position(kind, i).step(gravity);
            while !level.is_solid(next) && !self.element_at(next) {
                next = next.step(gravity);
            }
            let rest = next.step(gravity.opposite());
            match kind {
                ElementKind::Crate => self.crates[i] = rest,
                ElementKind::Gem => self.gems[i] = rest,
            }
        }
    }

    /// Clear every 4-connected same-color group of two or more active gems.
    /// Returns whether anything was eliminated.
    fn eliminate_matches(&mut self) -> bool {
        let mut any_matched = false;
        let mut visited = [false; ELEMENTS_MAX];

        for start in 0..self.gems.len() {
            if !self.gem_is_active(start) || visited[start] {
                continue;
            }

            // Flood fill the component containing `start`.
            let mut component: ArrayVec<usize, ELEMENTS_MAX> = ArrayVec::new();
            visited[start] = true;
            component.push(start);
            let mut head = 0;
            while head < component.len() {
                let current = component[head];
                head += 1;
                let pos = self.gems[current];
                for dir in Direction::ALL {
                    let neighbor = pos.step(dir);
                    for j in 0..self.gems.len() {
                        if !self.gem_is_active(j) || visited[j] {
                            continue;
                        }
                        if self.gems[j] == neighbor && self.gem_colors[j] == self.gem_colors[current]
                        {
                            visited[j] = true;
                            component.push(j);
                        }
                    }
                }
            }

            if component.len() >= 2 {
                any_matched = true;
                for &index in &component {
                    self.gems_active &= !(1u32 << index);
                }
            }
        }

        any_matched
    }

    /// Test-only constructor from raw parts, for states whose internal
    /// element order differs from any level's.
    #[cfg(test)]
    pub(crate) fn from_parts(
        crates: &[Pos],
        gems: &[(Pos, GemColor)],
        gems_active: u32,
        current_gravity: Direction,
    ) -> SimState {
        let mut state = SimState {
            crates: ArrayVec::new(),
            gems: ArrayVec::new(),
            gem_colors: ArrayVec::new(),
            gems_active,
            current_gravity,
        };
        state.crates.extend(crates.iter().copied());
        for &(pos, color) in gems {
            state.gems.push(pos);
            state.gem_colors.push(color);
        }
        state
    }
}
