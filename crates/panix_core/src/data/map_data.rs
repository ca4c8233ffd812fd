//! Static map layout.

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;

/// Layout cell marking the starting base.
pub const START_CELL: &str = "start";

/// Layout cell without a resource.
pub const EMPTY_CELL: &str = "empty";

/// Map layout authored in offset (row, column) form.
///
/// Each cell is a tile type id (`"iron"`, `"silicon"`, `"energy"`,
/// `"empty"`) or `"start"` for the starting base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    /// Columns per row.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Row-major layout, `layout[row][col]`.
    pub layout: Vec<Vec<String>>,
}

const DEFAULT_LAYOUT: [[&str; 10]; 10] = [
    ["empty", "empty", "iron", "empty", "empty", "energy", "empty", "empty", "silicon", "empty"],
    ["empty", "iron", "empty", "empty", "silicon", "empty", "energy", "empty", "empty", "empty"],
    ["iron", "empty", "empty", "silicon", "empty", "empty", "empty", "iron", "empty", "energy"],
    ["empty", "empty", "energy", "empty", "empty", "start", "empty", "empty", "silicon", "empty"],
    ["empty", "silicon", "empty", "empty", "iron", "empty", "iron", "empty", "empty", "empty"],
    ["energy", "empty", "empty", "iron", "empty", "empty", "empty", "energy", "empty", "silicon"],
    ["empty", "empty", "silicon", "empty", "empty", "energy", "empty", "empty", "iron", "empty"],
    ["empty", "iron", "empty", "empty", "silicon", "empty", "empty", "empty", "empty", "energy"],
    ["silicon", "empty", "energy", "empty", "empty", "iron", "empty", "empty", "empty", "empty"],
    ["empty", "empty", "empty", "iron", "empty", "empty", "silicon", "empty", "energy", "empty"],
];

impl Default for MapData {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            layout: DEFAULT_LAYOUT
                .iter()
                .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
                .collect(),
        }
    }
}

impl MapData {
    /// A single-row map holding only the starting base.
    #[must_use]
    pub fn starting_only() -> Self {
        Self {
            width: 1,
            height: 1,
            layout: vec![vec![START_CELL.to_string()]],
        }
    }

    /// Cell at offset position, `None` outside the authored rows.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.layout
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
    }

    /// Axial coordinate of the first `"start"` cell in row-major order.
    #[must_use]
    pub fn start_cell(&self) -> Option<HexCoord> {
        self.cells()
            .find(|(_, cell)| *cell == START_CELL)
            .map(|(coord, _)| coord)
    }

    /// Every cell inside `width` x `height` with its axial coordinate.
    pub fn cells(&self) -> impl Iterator<Item = (HexCoord, &str)> + '_ {
        (0..self.height as usize).flat_map(move |row| {
            (0..self.width as usize).filter_map(move |col| {
                self.cell(row, col)
                    .map(|cell| (HexCoord::from_offset(row as i32, col as i32), cell))
            })
        })
    }

    /// Structural problems with the layout.
    #[must_use]
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.layout.len() != self.height as usize {
            problems.push(format!(
                "Layout has {} rows, expected {}",
                self.layout.len(),
                self.height
            ));
        }
        for (row, cells) in self.layout.iter().enumerate() {
            if cells.len() != self.width as usize {
                problems.push(format!(
                    "Layout row {row} has {} cells, expected {}",
                    cells.len(),
                    self.width
                ));
            }
        }
        match self.count_cells(START_CELL) {
            1 => {}
            0 => problems.push("Layout has no starting tile".to_string()),
            n => problems.push(format!("Layout has {n} starting tiles, expected 1")),
        }
        problems
    }

    /// Count cells of the given type.
    #[must_use]
    pub fn count_cells(&self, cell: &str) -> usize {
        self.layout
            .iter()
            .flat_map(|row| row.iter())
            .filter(|c| *c == cell)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_shape() {
        let map = MapData::default();
        assert_eq!(map.layout.len(), map.height as usize);
        assert!(map.layout.iter().all(|row| row.len() == map.width as usize));
        assert_eq!(map.count_cells(START_CELL), 1);
    }

    #[test]
    fn test_start_cell_axial() {
        let map = MapData::default();
        // Row 3, column 5.
        assert_eq!(map.start_cell(), Some(HexCoord::new(5, 1)));
        assert!(map.problems().is_empty());
    }

    #[test]
    fn test_problems_reported() {
        let mut map = MapData::default();
        map.layout[3][5] = EMPTY_CELL.to_string();
        map.layout[0].pop();
        let problems = map.problems();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("no starting tile")));
    }

    #[test]
    fn test_cell_out_of_range() {
        let map = MapData::default();
        assert_eq!(map.cell(10, 0), None);
        assert_eq!(map.cell(0, 10), None);
    }
}
