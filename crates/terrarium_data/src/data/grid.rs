use serde::{Deserialize, Serialize};

/// Offsets of the 8 surrounding cells, scanned row by row from the top-left.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Offsets of the 4 edge-sharing cells: left, right, up, down.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A dense row-major 2D grid. The shape is fixed at construction.
///
/// Cells are addressed as `(x, y)` with `x` the column. Signed accessors take
/// `i32` coordinates so neighbour arithmetic never wraps; anything outside the
/// grid reads as `None`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub width: u16,
    pub height: u16,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(width: u16, height: u16, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width as usize * height as usize],
        }
    }

    /// Replace every cell with `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    /// Build a grid from row-major cells. Returns `None` on a length mismatch.
    pub fn from_cells(width: u16, height: u16, cells: Vec<T>) -> Option<Self> {
        (cells.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: u16, height: u16, mut f: impl FnMut(u16, u16) -> T) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    #[inline(always)]
    pub fn index(&self, x: u16, y: u16) -> usize {
        (y as usize * self.width as usize) + x as usize
    }

    #[inline(always)]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x as u16, y as u16)])
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        if self.in_bounds(x, y) {
            let idx = self.index(x as u16, y as u16);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Write `value` at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if let Some(cell) = self.get_mut(x, y) {
            *cell = value;
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Iterate over `(x, y, &cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &T)> {
        let w = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| ((idx % w) as u16, (idx / w) as u16, cell))
    }

    /// In-bounds 8-connected neighbours of `(x, y)` in [`NEIGHBORS_8`] order.
    pub fn neighbors_8(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32, &T)> + '_ {
        NEIGHBORS_8.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            self.get(nx, ny).map(|cell| (nx, ny, cell))
        })
    }

    /// In-bounds 4-connected neighbours of `(x, y)` in [`NEIGHBORS_4`] order.
    pub fn neighbors_4(&self, x: i32, y: i32) -> impl Iterator<Item = (i32, i32, &T)> + '_ {
        NEIGHBORS_4.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            self.get(nx, ny).map(|cell| (nx, ny, cell))
        })
    }
}

impl<T: Copy + Default> Grid<T> {
    /// Read a cell, or `T::default()` outside the grid.
    #[inline]
    pub fn value_or_default(&self, x: i32, y: i32) -> T {
        self.get(x, y).copied().unwrap_or_default()
    }
}
