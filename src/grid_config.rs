use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use crate::error::GridError;
use crate::MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the grid's `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Characters that mark a fillable cell in a template. Everything else is a block.
const FILLABLE_CHARS: [char; 2] = ['_', '.'];

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Across,
    Down,
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// The static description of a slot: where it is, how long it is, and which cells it shares with
/// other slots.
#[derive(Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

impl Debug for SlotConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotConfig")
            .field("id", &self.id)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .field("crossings", &self.crossings)
            .finish()
    }
}

impl SlotConfig {
    /// Ids of the slots crossing this one, in the order of this slot's cells.
    pub fn neighbors(&self) -> impl Iterator<Item=SlotId> + '_ {
        self.crossings.iter().flatten().map(|crossing| crossing.other_slot_id)
    }

    /// The number of slots crossing this one.
    pub fn degree(&self) -> usize {
        self.crossings.iter().flatten().count()
    }

    /// Coords of each cell in this slot.
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        cell_coords(self.start_cell, self.length, self.direction)
    }
}

fn cell_coords(start_cell: GridCoord, length: usize, direction: Direction) -> Vec<GridCoord> {
    (0..length).map(|cell_idx| {
        match direction {
            Direction::Across => (start_cell.0, start_cell.1 + cell_idx),
            Direction::Down => (start_cell.0 + cell_idx, start_cell.1),
        }
    }).collect()
}

/// An across or down entry in the input to `GridConfig::from_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEntry {
    pub loc: GridCoord,
    pub len: usize,
    pub dir: Direction,
}

/// Immutable description of a puzzle: its cells, its slots, and the overlaps between them. Nothing
/// in here changes while solving.
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// Row-major flags for each cell; `true` means the cell can hold a letter.
    pub fillable: Vec<Vec<bool>>,

    pub slot_configs: Vec<SlotConfig>,
}

impl Debug for GridConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slot_configs", &self.slot_configs)
            .finish()
    }
}

impl GridConfig {
    /// Build a grid config from a text template, with `_` or `.` representing fillable cells and
    /// any other character (conventionally `#`, but spaces too) representing blocks. Only the line
    /// terminators and empty lines at the very start or end of the template are ignored.
    pub fn from_template(template: &str) -> Result<GridConfig, GridError> {
        let mut rows: Vec<Vec<char>> = template.lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line).chars().collect())
            .collect();

        // `lines` already drops a single trailing newline; anything else empty at the ends is
        // padding, while an empty line in the middle is a ragged row.
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        let leading_empty = rows.iter().take_while(|row| row.is_empty()).count();
        rows.drain(..leading_empty);

        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if let Some((row, found)) = rows.iter()
            .map(|row| row.len())
            .enumerate()
            .find(|&(_, found)| found != width)
        {
            return Err(GridError::RaggedRow { row, expected: width, found });
        }

        let fillable: Vec<Vec<bool>> = rows.iter().map(|row| {
            row.iter().map(|c| FILLABLE_CHARS.contains(c)).collect()
        }).collect();

        let height = fillable.len();
        let mut entries: Vec<GridEntry> = vec![];

        // Across entries row by row, then down entries column by column.
        for row in 0..height {
            push_runs(&mut entries, (0..width).map(|col| ((row, col), fillable[row][col])), Direction::Across);
        }
        for col in 0..width {
            push_runs(&mut entries, (0..height).map(|row| ((row, col), fillable[row][col])), Direction::Down);
        }

        GridConfig::build(width, height, fillable, &entries)
    }

    /// Build a grid config from an explicit list of entries. The grid's size is the bounding box of
    /// the entries, and only cells covered by an entry are fillable.
    pub fn from_entries(entries: &[GridEntry]) -> Result<GridConfig, GridError> {
        let coords: Vec<GridCoord> = entries.iter()
            .flat_map(|entry| cell_coords(entry.loc, entry.len, entry.dir))
            .collect();

        let height = coords.iter().map(|&(row, _)| row + 1).max().unwrap_or(0);
        let width = coords.iter().map(|&(_, col)| col + 1).max().unwrap_or(0);

        let mut fillable = vec![vec![false; width]; height];
        for (row, col) in coords {
            fillable[row][col] = true;
        }

        GridConfig::build(width, height, fillable, entries)
    }

    fn build(
        width: usize,
        height: usize,
        fillable: Vec<Vec<bool>>,
        entries: &[GridEntry],
    ) -> Result<GridConfig, GridError> {
        // Build a map from cell location to (entry index, cell index within entry), which we can
        // then use to calculate crossings.
        let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(usize, usize); 2]>> = HashMap::new();

        for (entry_idx, entry) in entries.iter().enumerate() {
            for (cell_idx, loc) in cell_coords(entry.loc, entry.len, entry.dir).into_iter().enumerate() {
                let cell_entries = entries_by_loc.entry(loc).or_default();

                let clashes = cell_entries.len() >= 2 || cell_entries.iter()
                    .any(|&(other_idx, _)| entries[other_idx].dir == entry.dir);
                if clashes {
                    return Err(GridError::OverlappingEntries { row: loc.0, col: loc.1 });
                }

                cell_entries.push((entry_idx, cell_idx));
            }
        }

        let slot_configs = entries.iter().enumerate().map(|(entry_idx, entry)| {
            let crossings = cell_coords(entry.loc, entry.len, entry.dir).iter().map(|loc| {
                entries_by_loc[loc].iter()
                    .find(|&&(other_idx, _)| other_idx != entry_idx)
                    .map(|&(other_slot_id, other_slot_cell)| Crossing { other_slot_id, other_slot_cell })
            }).collect();

            SlotConfig {
                id: entry_idx,
                start_cell: entry.loc,
                direction: entry.dir,
                length: entry.len,
                crossings,
            }
        }).collect();

        Ok(GridConfig { width, height, fillable, slot_configs })
    }

    pub fn slot_count(&self) -> usize {
        self.slot_configs.len()
    }

    /// If slots `x` and `y` cross, return the index of the shared cell within each of them.
    pub fn overlap(&self, x: SlotId, y: SlotId) -> Option<(usize, usize)> {
        self.slot_configs[x].crossings.iter().enumerate().find_map(|(cell_idx, crossing)| {
            crossing
                .filter(|crossing| crossing.other_slot_id == y)
                .map(|crossing| (cell_idx, crossing.other_slot_cell))
        })
    }

    /// Every ordered pair of crossing slots, grouped by the first slot.
    pub fn arcs(&self) -> Vec<(SlotId, SlotId)> {
        self.slot_configs.iter()
            .flat_map(|slot_config| slot_config.neighbors().map(move |other| (slot_config.id, other)))
            .collect()
    }
}

/// Strip the indentation and surrounding blank lines from a template written inline in a test.
#[cfg(test)]
pub(crate) fn unindent(template: &str) -> String {
    template.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append an entry for each maximal run (of at least two cells) of fillable cells in a line.
fn push_runs<I>(entries: &mut Vec<GridEntry>, line: I, dir: Direction)
    where
        I: Iterator<Item=(GridCoord, bool)>
{
    let mut run: Option<(GridCoord, usize)> = None;

    for (loc, is_fillable) in line {
        run = match (run, is_fillable) {
            (Some((start, len)), true) => Some((start, len + 1)),
            (None, true) => Some((loc, 1)),
            (Some((start, len)), false) => {
                if len > 1 {
                    entries.push(GridEntry { loc: start, len, dir });
                }
                None
            }
            (None, false) => None,
        };
    }

    if let Some((start, len)) = run {
        if len > 1 {
            entries.push(GridEntry { loc: start, len, dir });
        }
    }
}
