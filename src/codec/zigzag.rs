// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/minimpeg

//! Zigzag traversal of an 8×8 coefficient block.
//!
//! [`ZigzagScan`] is the stepping state machine used by the entropy coder:
//! it starts at (0, 0) and walks the anti-diagonals, flipping direction at
//! the block edges. Both encoder and decoder drive the same machine, so the
//! order is reproduced bit-for-bit.

/// Diagonal direction of the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Moving up-right: row decreases, column increases.
    Ascending,
    /// Moving down-left: row increases, column decreases.
    Descending,
}

/// Scan position plus direction. `row` and `col` are always in 0..8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZigzagScan {
    row: usize,
    col: usize,
    direction: Direction,
}

impl Default for ZigzagScan {
    fn default() -> Self {
        Self::new()
    }
}

impl ZigzagScan {
    pub const fn new() -> Self {
        Self { row: 0, col: 0, direction: Direction::Ascending }
    }

    pub const fn row(&self) -> usize {
        self.row
    }

    pub const fn col(&self) -> usize {
        self.col
    }

    /// Natural (row-major) index of the current position.
    pub const fn natural_index(&self) -> usize {
        self.row * 8 + self.col
    }

    /// Advance to the next position.
    ///
    /// Stepping past the 64th cell is harmless: the machine keeps walking
    /// the edge but never leaves the grid.
    pub fn step(&mut self) {
        *self = self.next();
    }

    fn next(self) -> Self {
        let Self { mut row, mut col, mut direction } = self;
        match direction {
            Direction::Ascending => {
                if row == 0 || col == 7 {
                    direction = Direction::Descending;
                    if col == 7 {
                        row = if row < 7 { row + 1 } else { 7 };
                    } else {
                        col += 1;
                    }
                } else {
                    row -= 1;
                    col += 1;
                }
            }
            Direction::Descending => {
                if col == 0 || row == 7 {
                    direction = Direction::Ascending;
                    if row == 7 {
                        col = if col < 7 { col + 1 } else { 7 };
                    } else {
                        row += 1;
                    }
                } else {
                    col -= 1;
                    row += 1;
                }
            }
        }
        Self { row, col, direction }
    }
}
