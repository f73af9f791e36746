//! Module grid construction.
//!
//! Three corners carry concentric finder markers; every other module (the
//! bottom-right corner included) is decided by a linear congruential step
//! over the identifier seed and the module's row-major offset.

use std::array;

use crate::seed::seed_hash;

/// Number of modules along each side of the grid.
pub const MODULE_COUNT: usize = 21;

/// Side length of each corner finder marker, in modules.
pub const FINDER_SIZE: usize = 7;

const FAR_EDGE: usize = MODULE_COUNT - FINDER_SIZE;

const LCG_MULTIPLIER: i64 = 9301;
const LCG_INCREMENT: i64 = 49297;
const LCG_MODULUS: i64 = 233_280;
// Exactly half of the modulus; a module is dark only above it.
const LCG_THRESHOLD: i64 = 116_640;

type Rows = [[bool; MODULE_COUNT]; MODULE_COUNT];

/// Immutable 21×21 grid of dark (`true`) and light (`false`) modules.
///
/// ## Invariants
/// - The top-left, top-right and bottom-left 7×7 corners always hold a
///   finder marker: dark outer ring, light middle ring, dark 3×3 core.
/// - All other modules depend only on the seed and their position.
///
/// # Examples
/// ```
/// use cps_pattern::{MODULE_COUNT, ModuleGrid};
///
/// let grid = ModuleGrid::for_identifier("CPS00000000");
/// assert_eq!(grid.is_dark(3, 3), Some(true));
/// assert_eq!(grid.is_dark(1, 3), Some(false));
/// assert_eq!(grid.is_dark(MODULE_COUNT, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleGrid {
    seed: i32,
    rows: Rows,
}

impl ModuleGrid {
    /// Build the grid for an identifier.
    #[must_use]
    pub fn for_identifier(identifier: &str) -> Self {
        Self::from_seed(seed_hash(identifier))
    }

    /// Build the grid for an already folded seed.
    #[must_use]
    pub fn from_seed(seed: i32) -> Self {
        let rows = array::from_fn(|row| array::from_fn(|col| module_at(seed, row, col)));
        Self { seed, rows }
    }

    /// Seed the grid was derived from.
    #[must_use]
    pub const fn seed(&self) -> i32 {
        self.seed
    }

    /// Return whether the module at `(row, col)` is dark.
    ///
    /// Returns `None` when either coordinate lies outside the grid.
    #[must_use]
    pub fn is_dark(&self, row: usize, col: usize) -> Option<bool> {
        self.rows.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Iterate over the grid rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool; MODULE_COUNT]> {
        self.rows.iter()
    }

    /// Iterate over dark module coordinates in row-major order.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, dark)| **dark)
                .map(move |(col, _)| (row, col))
        })
    }

    /// Number of dark modules in the grid.
    #[must_use]
    pub fn dark_count(&self) -> usize {
        self.dark_modules().count()
    }

    /// Return whether `(row, col)` falls inside one of the three finder corners.
    #[must_use]
    pub const fn is_finder_module(row: usize, col: usize) -> bool {
        finder_local(row, col).is_some()
    }
}

fn module_at(seed: i32, row: usize, col: usize) -> bool {
    match finder_local(row, col) {
        Some((local_row, local_col)) => finder_module(local_row, local_col),
        None => data_module(seed, row, col),
    }
}

/// Translate grid coordinates into finder-local coordinates.
const fn finder_local(row: usize, col: usize) -> Option<(usize, usize)> {
    let top = row < FINDER_SIZE;
    let left = col < FINDER_SIZE;
    let bottom = row >= FAR_EDGE && row < MODULE_COUNT;
    let right = col >= FAR_EDGE && col < MODULE_COUNT;
    match (top, left, bottom, right) {
        (true, true, _, _) => Some((row, col)),
        (true, _, _, true) => Some((row, col - FAR_EDGE)),
        (_, true, true, _) => Some((row - FAR_EDGE, col)),
        _ => None,
    }
}

const fn finder_module(row: usize, col: usize) -> bool {
    let outer = FINDER_SIZE - 1;
    let inner = FINDER_SIZE - 2;
    if row == 0 || row == outer || col == 0 || col == outer {
        true
    } else {
        !(row == 1 || row == inner || col == 1 || col == inner)
    }
}

fn data_module(seed: i32, row: usize, col: usize) -> bool {
    #[expect(
        clippy::cast_possible_wrap,
        reason = "row-major offsets stay below MODULE_COUNT squared"
    )]
    let offset = (row * MODULE_COUNT + col) as i64;
    let local_seed = i64::from(seed) + offset;
    let value = (local_seed * LCG_MULTIPLIER + LCG_INCREMENT).rem_euclid(LCG_MODULUS);
    value > LCG_THRESHOLD
}
