//! Static level definition and its binary codec.
//!
//! A level is a fixed-capacity 16x16 board: a solid-cell bitset, crate and
//! gem start positions, gem colors and the initial gravity. On disk a level
//! is exactly [`LEVEL_FILE_SIZE`] bytes:
//!
//! | offset | size | field                                      |
//! |--------|------|--------------------------------------------|
//! | 0      | 1    | `(width << 4) \| (height & 0x0F)`          |
//! | 1      | 1    | start gravity (0..3)                       |
//! | 2      | 1    | crate count                                |
//! | 3      | 1    | gem count                                  |
//! | 4      | 8    | gem colors, 2 bits per gem, LSB = gem 0    |
//! | 12     | 32   | crate starts, one packed byte each         |
//! | 44     | 32   | gem starts, one packed byte each           |
//! | 76     | 32   | solid bitset, bit `k` = cell `k`           |
//!
//! Positions pack as `(x << 4) | y`. Unused element slots are written as
//! zero and ignored on read. Multi-byte fields are little-endian.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Maximum number of crates, and separately of gems, per level.
pub const ELEMENTS_MAX: usize = 32;
/// Cell capacity of the board (16x16).
pub const MAP_MAX_CELLS: usize = 256;
/// Exact on-disk size of one level record.
pub const LEVEL_FILE_SIZE: usize = 108;

const SOLID_BYTES: usize = MAP_MAX_CELLS / 8;

/// Gravity direction. Discriminants match the file format byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All four directions in encoding order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit vector of the direction.
    pub fn unit(self) -> Pos {
        match self {
            Direction::Up => Pos::new(0, -1),
            Direction::Right => Pos::new(1, 0),
            Direction::Down => Pos::new(0, 1),
            Direction::Left => Pos::new(-1, 0),
        }
    }

    /// The opposing direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Decode a format byte. Any value above 3 is invalid.
    pub fn from_byte(byte: u8) -> Option<Direction> {
        match byte {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Gem color. Discriminants match the 2-bit on-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GemColor {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl GemColor {
    /// All colors in encoding order.
    pub const ALL: [GemColor; 3] = [GemColor::Red, GemColor::Green, GemColor::Blue];

    fn from_bits(bits: u8) -> Option<GemColor> {
        match bits {
            0 => Some(GemColor::Red),
            1 => Some(GemColor::Green),
            2 => Some(GemColor::Blue),
            _ => None,
        }
    }
}

/// Grid cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Pos {
        Pos { x, y }
    }

    /// The adjacent cell one step along `dir`.
    pub fn step(self, dir: Direction) -> Pos {
        let unit = dir.unit();
        Pos::new(self.x + unit.x, self.y + unit.y)
    }

    pub fn dot(self, other: Pos) -> i32 {
        self.x * other.x + self.y * other.y
    }

    pub fn manhattan(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Row-major ordering key over the 16-wide capacity grid.
    pub(crate) fn scan_key(self) -> i32 {
        self.y * 16 + self.x
    }
}

fn pack_pos(pos: Pos) -> u8 {
    ((pos.x as u8) << 4) | (pos.y as u8 & 0x0F)
}

fn unpack_pos(byte: u8) -> Pos {
    Pos::new((byte >> 4) as i32, (byte & 0x0F) as i32)
}

/// Result type for level decoding and file I/O.
pub type LevelResult<T> = Result<T, LevelError>;

/// Errors produced while decoding or loading a level.
#[derive(Debug)]
pub enum LevelError {
    /// The byte buffer or file is not exactly [`LEVEL_FILE_SIZE`] bytes.
    InvalidLength(usize),
    /// The gravity byte at offset 1 is not a valid direction.
    InvalidGravity(u8),
    /// A gem color field holds an encoding outside the palette.
    InvalidColor(u8),
    /// An element count exceeds [`ELEMENTS_MAX`].
    TooManyElements(usize),
    /// Underlying filesystem error.
    Io(io::Error),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => {
                write!(f, "level record must be {LEVEL_FILE_SIZE} bytes, got {len}")
            }
            Self::InvalidGravity(byte) => write!(f, "invalid gravity byte {byte}"),
            Self::InvalidColor(bits) => write!(f, "invalid gem color encoding {bits}"),
            Self::TooManyElements(count) => {
                write!(f, "element count {count} exceeds capacity {ELEMENTS_MAX}")
            }
            Self::Io(err) => write!(f, "level file I/O: {err}"),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LevelError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

/// Static puzzle definition: grid, walls, element starts, colors, gravity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub width: i32,
    pub height: i32,
    pub start_gravity: Direction,
    num_crates: usize,
    num_gems: usize,
    solid: [u8; SOLID_BYTES],
    crate_starts: [Pos; ELEMENTS_MAX],
    gem_starts: [Pos; ELEMENTS_MAX],
    gem_colors: [GemColor; ELEMENTS_MAX],
}

impl Level {
    /// An all-open board with no elements.
    pub fn empty(width: i32, height: i32, start_gravity: Direction) -> Level {
        Level {
            width,
            height,
            start_gravity,
            num_crates: 0,
            num_gems: 0,
            solid: [0; SOLID_BYTES],
            crate_starts: [Pos::new(0, 0); ELEMENTS_MAX],
            gem_starts: [Pos::new(0, 0); ELEMENTS_MAX],
            gem_colors: [GemColor::Red; ELEMENTS_MAX],
        }
    }

    /// An empty board whose outermost ring of cells is solid.
    ///
    /// Elements can never travel out of a bordered grid, so every playable
    /// level carries one.
    pub fn with_border(width: i32, height: i32, start_gravity: Direction) -> Level {
        let mut level = Level::empty(width, height, start_gravity);
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    level.set_solid(Pos::new(x, y), true);
                }
            }
        }
        level
    }

    pub fn num_crates(&self) -> usize {
        self.num_crates
    }

    pub fn num_gems(&self) -> usize {
        self.num_gems
    }

    /// Crate start positions.
    pub fn crate_starts(&self) -> &[Pos] {
        &self.crate_starts[..self.num_crates]
    }

    /// Gem start positions.
    pub fn gem_starts(&self) -> &[Pos] {
        &self.gem_starts[..self.num_gems]
    }

    /// Gem colors, parallel to [`Level::gem_starts`].
    pub fn gem_colors(&self) -> &[GemColor] {
        &self.gem_colors[..self.num_gems]
    }

    /// Append a crate start. Exceeding [`ELEMENTS_MAX`] is a programming bug.
    pub fn add_crate(&mut self, pos: Pos) {
        self.crate_starts[self.num_crates] = pos;
        self.num_crates += 1;
    }

    /// Append a gem start with its color.
    pub fn add_gem(&mut self, pos: Pos, color: GemColor) {
        self.gem_starts[self.num_gems] = pos;
        self.gem_colors[self.num_gems] = color;
        self.num_gems += 1;
    }

    fn cell_index(&self, pos: Pos) -> usize {
        debug_assert!(pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height);
        (pos.y * self.width + pos.x) as usize
    }

    /// Whether the cell is an impassable wall.
    pub fn is_solid(&self, pos: Pos) -> bool {
        let idx = self.cell_index(pos);
        (self.solid[idx / 8] >> (idx % 8)) & 1 != 0
    }

    pub fn set_solid(&mut self, pos: Pos, solid: bool) {
        let idx = self.cell_index(pos);
        if solid {
            self.solid[idx / 8] |= 1 << (idx % 8);
        } else {
            self.solid[idx / 8] &= !(1 << (idx % 8));
        }
    }

    /// Encode into the fixed 108-byte record.
    pub fn encode(&self) -> [u8; LEVEL_FILE_SIZE] {
        let mut data = [0u8; LEVEL_FILE_SIZE];
        data[0] = ((self.width as u8) << 4) | (self.height as u8 & 0x0F);
        data[1] = self.start_gravity as u8;
        data[2] = self.num_crates as u8;
        data[3] = self.num_gems as u8;

        let mut colors: u64 = 0;
        for i in 0..self.num_gems {
            colors |= ((self.gem_colors[i] as u64) & 0b11) << (2 * i);
        }
        data[4..12].copy_from_slice(&colors.to_le_bytes());

        for i in 0..self.num_crates {
            data[12 + i] = pack_pos(self.crate_starts[i]);
        }
        for i in 0..self.num_gems {
            data[44 + i] = pack_pos(self.gem_starts[i]);
        }
        data[76..108].copy_from_slice(&self.solid);
        data
    }

    /// Decode a 108-byte record. Rejects wrong lengths, an out-of-range
    /// gravity byte, element counts past capacity and unknown color bits.
    pub fn decode(data: &[u8]) -> LevelResult<Level> {
        if data.len() != LEVEL_FILE_SIZE {
            return Err(LevelError::InvalidLength(data.len()));
        }

        let width = (data[0] >> 4) as i32;
        let height = (data[0] & 0x0F) as i32;
        let start_gravity =
            Direction::from_byte(data[1]).ok_or(LevelError::InvalidGravity(data[1]))?;
        let num_crates = data[2] as usize;
        let num_gems = data[3] as usize;
        if num_crates > ELEMENTS_MAX {
            return Err(LevelError::TooManyElements(num_crates));
        }
        if num_gems > ELEMENTS_MAX {
            return Err(LevelError::TooManyElements(num_gems));
        }

        let mut level = Level::empty(width, height, start_gravity);

        let mut color_bytes = [0u8; 8];
        color_bytes.copy_from_slice(&data[4..12]);
        let colors = u64::from_le_bytes(color_bytes);

        for i in 0..num_crates {
            level.add_crate(unpack_pos(data[12 + i]));
        }
        for i in 0..num_gems {
            let bits = ((colors >> (2 * i)) & 0b11) as u8;
            let color = GemColor::from_bits(bits).ok_or(LevelError::InvalidColor(bits))?;
            level.add_gem(unpack_pos(data[44 + i]), color);
        }

        level.solid.copy_from_slice(&data[76..108]);
        Ok(level)
    }

    /// Read a single level file.
    pub fn load(path: impl AsRef<Path>) -> LevelResult<Level> {
        let data = fs::read(path)?;
        Level::decode(&data)
    }

    /// Write a single level file.
    pub fn save(&self, path: impl AsRef<Path>) -> LevelResult<()> {
        fs::write(path, self.encode())?;
        Ok(())
    }
}
