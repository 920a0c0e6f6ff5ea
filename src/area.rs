use std::collections::BTreeMap;
use std::fmt;

use crate::room_graph::structs::RoomId;
use crate::world::WorldXY;

/// Coordinate of an area in the coarse area grid.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct AreaXY {
    pub x: i32,
    pub y: i32,
}

impl AreaXY {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The area holding `xy` when areas are `area_size` cells on a side.
    /// Floors toward negative infinity, so cell `-1` lives in area `-1`.
    #[inline]
    pub fn containing(xy: WorldXY, area_size: i32) -> Self {
        Self::new(xy.x.div_euclid(area_size), xy.y.div_euclid(area_size))
    }

    /// The 3x3 block of areas centered on this one, row-major.
    pub fn block(self) -> impl Iterator<Item = AreaXY> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| AreaXY::new(self.x + dx, self.y + dy)))
    }

    pub fn is_in_block_of(self, center: AreaXY) -> bool {
        (self.x - center.x).abs() <= 1 && (self.y - center.y).abs() <= 1
    }
}

impl fmt::Display for AreaXY {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

/// One square partition of the world.
#[derive(Debug, Clone)]
pub struct MapArea {
    coord: AreaXY,
    rooms: Vec<RoomId>,
    pending_doors: Vec<WorldXY>,
}

impl MapArea {
    fn new(coord: AreaXY) -> Self {
        Self {
            coord,
            rooms: Vec::new(),
            pending_doors: Vec::new(),
        }
    }

    pub fn coord(&self) -> AreaXY {
        self.coord
    }

    /// Rooms seeded in this area, in creation order.
    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Frontier doors registered here that still await resolution.
    pub fn pending_doors(&self) -> &[WorldXY] {
        &self.pending_doors
    }

    pub(crate) fn add_room(&mut self, room: RoomId) {
        self.rooms.push(room);
    }

    pub(crate) fn push_pending(&mut self, door: WorldXY) {
        if !self.pending_doors.contains(&door) {
            self.pending_doors.push(door);
        }
    }

    pub(crate) fn remove_pending(&mut self, door: WorldXY) -> bool {
        match self.pending_doors.iter().position(|d| *d == door) {
            Some(idx) => {
                self.pending_doors.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Lazily built index from area coordinate to [`MapArea`]. Areas are never dropped.
#[derive(Debug)]
pub struct AreaIndex {
    area_size: i32,
    areas: BTreeMap<AreaXY, MapArea>,
}

impl AreaIndex {
    pub fn new(area_size: i32) -> Self {
        Self {
            area_size: area_size.max(1),
            areas: BTreeMap::new(),
        }
    }

    pub fn area_size(&self) -> i32 {
        self.area_size
    }

    pub fn coord_for(&self, xy: WorldXY) -> AreaXY {
        AreaXY::containing(xy, self.area_size)
    }

    /// The area holding `xy`, created on first use.
    pub fn area_for(&mut self, xy: WorldXY) -> &mut MapArea {
        let coord = self.coord_for(xy);
        self.area_mut(coord)
    }

    pub fn area_mut(&mut self, coord: AreaXY) -> &mut MapArea {
        self.areas.entry(coord).or_insert_with(|| MapArea::new(coord))
    }

    pub fn get(&self, coord: AreaXY) -> Option<&MapArea> {
        self.areas.get(&coord)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapArea> {
        self.areas.values()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Pending doors of the 3x3 block around `center`, area by area.
    pub fn pending_in_block(&self, center: AreaXY) -> Vec<(AreaXY, WorldXY)> {
        center
            .block()
            .filter_map(|coord| self.areas.get(&coord))
            .flat_map(|area| area.pending_doors.iter().map(move |door| (area.coord, *door)))
            .collect()
    }

    /// Drops `door` from whichever area lists it.
    pub(crate) fn remove_pending(&mut self, door: WorldXY) -> bool {
        self.areas.values_mut().any(|area| area.remove_pending(door))
    }

    pub fn pending_count(&self) -> usize {
        self.areas.values().map(|area| area.pending_doors.len()).sum()
    }
}
