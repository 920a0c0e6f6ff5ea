use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::GridError;
use crate::room_graph::structs::RoomId;
use crate::template::TileKind;
use crate::view::ViewBounds;

/// A cell of the unbounded world grid. `y` grows the same way template rows do.
///
/// Ordered row-major (`y` first, then `x`) so sorted collections walk the
/// world the same way templates are scanned.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Default)]
pub struct WorldXY {
    pub x: i32,
    pub y: i32,
}

impl WorldXY {
    pub const ORIGIN: WorldXY = WorldXY { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The four orthogonal neighbors: up, down, left, right.
    #[inline]
    pub fn neighbors(self) -> [WorldXY; 4] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }

    /// The cell containing a world-space position when each cell is `tile_size` wide.
    pub fn from_world_position(position: [f32; 2], tile_size: f32) -> Self {
        Self::new(
            (position[0] / tile_size).floor() as i32,
            (position[1] / tile_size).floor() as i32,
        )
    }

    /// World-space position of this cell's corner.
    pub fn to_world_position(self, tile_size: f32) -> [f32; 2] {
        [self.x as f32 * tile_size, self.y as f32 * tile_size]
    }

    pub(crate) fn distance_squared_to(self, point: (f64, f64)) -> f64 {
        let dx = self.x as f64 - point.0;
        let dy = self.y as f64 - point.1;
        dx * dx + dy * dy
    }
}

impl Ord for WorldXY {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for WorldXY {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for WorldXY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({};{})", self.x, self.y)
    }
}

impl From<(i32, i32)> for WorldXY {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// What occupies a claimed world cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldCell {
    pub tile: TileKind,
    /// Lookup only: the room owns its coordinates, the grid remembers who claimed them.
    pub room: RoomId,
}

/// Sparse map of every claimed cell. Cells are never released and never change owner.
#[derive(Debug, Default)]
pub struct WorldGrid {
    cells: HashMap<WorldXY, WorldCell>,
    doors: BTreeSet<WorldXY>,
}

impl WorldGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, xy: WorldXY) -> Option<&WorldCell> {
        self.cells.get(&xy)
    }

    /// The tile at `xy`, `TileKind::None` when unclaimed.
    #[inline]
    pub fn tile_at(&self, xy: WorldXY) -> TileKind {
        self.cells.get(&xy).map_or(TileKind::None, |cell| cell.tile)
    }

    #[inline]
    pub fn owner(&self, xy: WorldXY) -> Option<RoomId> {
        self.cells.get(&xy).map(|cell| cell.room)
    }

    #[inline]
    pub fn is_claimed(&self, xy: WorldXY) -> bool {
        self.cells.contains_key(&xy)
    }

    pub fn claim(&mut self, xy: WorldXY, tile: TileKind, room: RoomId) -> Result<(), GridError> {
        if self.cells.contains_key(&xy) {
            return Err(GridError::AlreadyClaimed(xy));
        }
        self.cells.insert(xy, WorldCell { tile, room });
        if tile == TileKind::Door {
            self.doors.insert(xy);
        }
        Ok(())
    }

    /// Turns a door into something else. Only doors may change kind, so this
    /// happens at most once per cell. Returns the owning room.
    pub fn reclassify(&mut self, xy: WorldXY, tile: TileKind) -> Result<RoomId, GridError> {
        let cell = self.cells.get_mut(&xy).ok_or(GridError::Unclaimed(xy))?;
        if cell.tile != TileKind::Door {
            return Err(GridError::NotADoor(xy));
        }
        cell.tile = tile;
        if tile != TileKind::Door {
            self.doors.remove(&xy);
        }
        Ok(cell.room)
    }

    /// Every cell currently tagged as a door, row-major.
    pub fn door_cells(&self) -> impl Iterator<Item = WorldXY> + '_ {
        self.doors.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorldXY, &WorldCell)> {
        self.cells.iter().map(|(xy, cell)| (*xy, cell))
    }

    /// A printable view of the cells inside `bounds`.
    pub fn ascii(&self, bounds: ViewBounds) -> AsciiWindow<'_> {
        AsciiWindow { grid: self, bounds }
    }
}

/// Renders a rectangle of the world one character per cell, one line per row.
pub struct AsciiWindow<'a> {
    grid: &'a WorldGrid,
    bounds: ViewBounds,
}

impl fmt::Display for AsciiWindow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in self.bounds.min.y..=self.bounds.max.y {
            let row: String = (self.bounds.min.x..=self.bounds.max.x)
                .map(|x| self.grid.tile_at(WorldXY::new(x, y)).to_string())
                .collect();
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}
