//! In-memory sheet model: cell values, merges and region styles.
//!
//! Values and styles are written in separate passes. Styling a region never
//! touches values, never creates cells, and applying the same profile twice
//! leaves the sheet unchanged.

use std::collections::BTreeMap;

use super::style::StyleProfile;

/// A rectangular, inclusive cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl Region {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    /// A region covering columns `first_col..=last_col` of a single row.
    pub fn row(row: u32, first_col: u16, last_col: u16) -> Self {
        Self::new(row, first_col, row, last_col)
    }

    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// True when the region is exactly one cell.
    pub fn is_single_cell(&self) -> bool {
        self.first_row == self.last_row && self.first_col == self.last_col
    }
}

/// A populated cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: String,
    pub style: Option<StyleProfile>,
}

/// A single named worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: Vec<Region>,
    column_widths: BTreeMap<u16, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a value, keeping any style already on the cell.
    pub fn write(&mut self, row: u32, col: u16, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.cells.get_mut(&(row, col)) {
            Some(cell) => cell.value = value,
            None => {
                self.cells.insert((row, col), Cell { value, style: None });
            }
        }
        self
    }

    /// Write a sequence of values into a row starting at `first_col`.
    pub fn write_row<I, S>(&mut self, row: u32, first_col: u16, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (offset, value) in values.into_iter().enumerate() {
            self.write(row, first_col + offset as u16, value);
        }
        self
    }

    /// Record a merged range; the anchor is its top-left cell.
    pub fn merge(&mut self, region: Region) -> &mut Self {
        if !self.merges.contains(&region) {
            self.merges.push(region);
        }
        self
    }

    /// Apply a style profile to every populated cell of a region.
    ///
    /// Returns the number of cells styled.
    pub fn apply_style(&mut self, region: Region, profile: &StyleProfile) -> usize {
        let mut styled = 0;
        for ((row, col), cell) in self.cells.iter_mut() {
            if region.contains(*row, *col) {
                cell.style = Some(profile.clone());
                styled += 1;
            }
        }
        styled
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) -> &mut Self {
        self.column_widths.insert(col, width);
        self
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&str> {
        self.cell(row, col).map(|cell| cell.value.as_str())
    }

    pub fn style(&self, row: u32, col: u16) -> Option<&StyleProfile> {
        self.cell(row, col).and_then(|cell| cell.style.as_ref())
    }

    /// Populated cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u16, &Cell)> {
        self.cells.iter().map(|((row, col), cell)| (*row, *col, cell))
    }

    /// Values of a row, from column 0 up to its last populated column.
    pub fn row_values(&self, row: u32) -> Vec<&str> {
        let last = self
            .cells
            .range((row, 0)..=(row, u16::MAX))
            .map(|((_, col), _)| *col)
            .last();

        match last {
            Some(last) => (0..=last)
                .map(|col| self.value(row, col).unwrap_or(""))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn merges(&self) -> &[Region] {
        &self.merges
    }

    /// The merged range anchored at a cell, if any.
    pub fn merge_at(&self, row: u32, col: u16) -> Option<&Region> {
        self.merges
            .iter()
            .find(|m| m.first_row == row && m.first_col == col)
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(col, width)| (*col, *width))
    }

    /// Number of rows up to the last populated one.
    pub fn row_count(&self) -> u32 {
        self.cells
            .keys()
            .map(|(row, _)| row + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of columns up to the last populated one.
    pub fn column_count(&self) -> u16 {
        self.cells
            .keys()
            .map(|(_, col)| col + 1)
            .max()
            .unwrap_or(0)
    }
}
