//! Chart panel layout on a draggable grid
//!
//! Panels sit on a 12-column grid with vertical compaction: every panel floats
//! up until it touches the panel above it. Moving a panel pins it at the drop
//! position, pushes overlapping panels down, then compacts again.

use crate::frame::SampleField;

/// Number of grid columns
pub const GRID_COLUMNS: u32 = 12;

/// Line colors, reused cyclically when a chart has more lines
pub const PALETTE: [Rgb; 3] = [
    Rgb(0x88, 0x84, 0xd8),
    Rgb(0x82, 0xca, 0x9d),
    Rgb(0xcc, 0xcc, 0x00),
];

/// Color for the `index`-th line of a chart
pub fn line_color(index: usize) -> Rgb {
    PALETTE[index % PALETTE.len()]
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A chart panel: title plus the sample fields it plots
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub fields: &'static [SampleField],
}

/// The five dashboard panels
pub const PANELS: [PanelSpec; 5] = [
    PanelSpec {
        key: "g0",
        title: "Gyro",
        fields: &[SampleField::GyroX, SampleField::GyroY, SampleField::GyroZ],
    },
    PanelSpec {
        key: "g1",
        title: "Acc",
        fields: &[SampleField::AccelX, SampleField::AccelY, SampleField::AccelZ],
    },
    PanelSpec {
        key: "g2",
        title: "Temperature",
        fields: &[SampleField::Temperature],
    },
    PanelSpec {
        key: "g3",
        title: "GyroAngle",
        fields: &[
            SampleField::GyroAngleX,
            SampleField::GyroAngleY,
            SampleField::GyroAngleZ,
        ],
    },
    PanelSpec {
        key: "g4",
        title: "Angle",
        fields: &[SampleField::AngleX, SampleField::AngleY, SampleField::AngleZ],
    },
];

/// Look up a panel by key
pub fn panel(key: &str) -> Option<&'static PanelSpec> {
    PANELS.iter().find(|p| p.key == key)
}

/// Rectangle in grid units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl GridCell {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn overlaps(&self, other: &GridCell) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    fn bottom(&self) -> u32 {
        self.y + self.h
    }
}

/// Grid position of one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutItem {
    pub key: &'static str,
    pub cell: GridCell,
}

/// Initial placement of [`PANELS`], before compaction
pub const DEFAULT_CELLS: [LayoutItem; 5] = [
    LayoutItem { key: "g0", cell: GridCell::new(0, 0, 8, 2) },
    LayoutItem { key: "g1", cell: GridCell::new(8, 0, 4, 2) },
    LayoutItem { key: "g2", cell: GridCell::new(0, 4, 4, 2) },
    LayoutItem { key: "g3", cell: GridCell::new(4, 8, 4, 2) },
    LayoutItem { key: "g4", cell: GridCell::new(8, 8, 4, 2) },
];

/// Compacted, non-overlapping panel placement
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    columns: u32,
    items: Vec<LayoutItem>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(GRID_COLUMNS, DEFAULT_CELLS.to_vec())
    }
}

impl GridLayout {
    /// Build a layout, clamping cells to the grid and compacting
    pub fn new(columns: u32, items: Vec<LayoutItem>) -> Self {
        let columns = columns.max(1);
        let mut layout = Self { columns, items };
        for item in &mut layout.items {
            item.cell = clamp(item.cell, columns);
        }
        layout.compact(None);
        layout
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn items(&self) -> &[LayoutItem] {
        &self.items
    }

    pub fn cell(&self, key: &str) -> Option<GridCell> {
        self.items.iter().find(|i| i.key == key).map(|i| i.cell)
    }

    /// Number of rows in use
    pub fn rows(&self) -> u32 {
        self.items.iter().map(|i| i.cell.bottom()).max().unwrap_or(0)
    }

    /// Drop a panel at grid position (`x`, `y`)
    ///
    /// Returns `false` if no panel has that key or nothing changed.
    pub fn move_item(&mut self, key: &str, x: u32, y: u32) -> bool {
        let Some(index) = self.items.iter().position(|i| i.key == key) else {
            return false;
        };

        let before = self.items.clone();
        let mut cell = self.items[index].cell;
        cell.x = x;
        cell.y = y;
        self.items[index].cell = clamp(cell, self.columns);

        self.compact(Some(index));
        self.compact(None);
        self.items != before
    }

    /// Float panels up in (y, x) order, pushing down past any collision
    ///
    /// A pinned panel is placed first and keeps its position for this pass.
    fn compact(&mut self, pinned: Option<usize>) {
        let mut order: Vec<usize> = (0..self.items.len())
            .filter(|&i| Some(i) != pinned)
            .collect();
        order.sort_by_key(|&i| (self.items[i].cell.y, self.items[i].cell.x));

        let mut placed: Vec<GridCell> = pinned.map(|i| self.items[i].cell).into_iter().collect();

        for i in order {
            let mut cell = self.items[i].cell;

            if pinned.is_none() {
                while cell.y > 0 {
                    let up = GridCell { y: cell.y - 1, ..cell };
                    if placed.iter().any(|p| p.overlaps(&up)) {
                        break;
                    }
                    cell = up;
                }
            }

            while let Some(hit) = placed.iter().find(|p| p.overlaps(&cell)) {
                cell.y = hit.bottom();
            }

            placed.push(cell);
            self.items[i].cell = cell;
        }
    }
}

fn clamp(mut cell: GridCell, columns: u32) -> GridCell {
    cell.w = cell.w.clamp(1, columns);
    cell.h = cell.h.max(1);
    cell.x = cell.x.min(columns - cell.w);
    cell
}
