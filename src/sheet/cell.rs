use std::fmt;

/// A single cell value as read from a tabular source.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// A cell is present when it carries any value; empty text counts as absent.
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Text(s) => !s.is_empty(),
            _ => true,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

/// One physical row. `index` is absolute from the top of the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetRow {
    pub index: u32,
    pub cells: Vec<Cell>,
}

impl SheetRow {
    pub fn new(index: u32, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    /// Present cells with their column index.
    pub fn present_cells(&self) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_present())
            .map(|(col, cell)| (col as u32, cell))
    }

    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(Cell::is_present)
    }
}

/// The first sheet of a tabular source, rows in physical order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Build a sheet whose rows start at index 0.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| SheetRow::new(i as u32, cells))
                .collect(),
        }
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&Cell> {
        self.rows
            .iter()
            .find(|r| r.index == row)
            .and_then(|r| r.cells.get(column as usize))
    }

    /// Write a cell, creating the row and padding columns as needed.
    pub fn set(&mut self, row: u32, column: u32, value: Cell) {
        let pos = match self.rows.binary_search_by_key(&row, |r| r.index) {
            Ok(pos) => pos,
            Err(pos) => {
                self.rows.insert(pos, SheetRow::new(row, Vec::new()));
                pos
            }
        };
        let cells = &mut self.rows[pos].cells;
        let col = column as usize;
        if cells.len() <= col {
            cells.resize(col + 1, Cell::Empty);
        }
        cells[col] = value;
    }

    /// Rows as a dense grid, filling gaps between physical rows with empty rows.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let Some(last) = self.rows.last() else {
            return Vec::new();
        };
        let width = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        let mut grid = vec![vec![String::new(); width]; last.index as usize + 1];
        for row in &self.rows {
            for (col, cell) in row.cells.iter().enumerate() {
                grid[row.index as usize][col] = cell.to_string();
            }
        }
        grid
    }
}
