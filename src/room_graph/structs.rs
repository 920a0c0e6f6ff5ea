use std::collections::BTreeSet;
use std::fmt;

use log::warn;

use crate::area::AreaXY;
use crate::error::GraphError;
use crate::template::TileKind;
use crate::world::WorldXY;

use super::relaxation::relax_distances;

/// Distance of a room that no seed reaches yet.
pub const UNREACHED: u32 = u32::MAX;

#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct RoomId {
    value: u32,
}

impl RoomId {
    #[inline]
    pub fn index(self) -> usize {
        self.value as usize
    }
}

impl From<u32> for RoomId {
    fn from(value: u32) -> Self {
        Self { value }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.value)
    }
}

/// A room placed in the world, either from a template or as a backfilled pocket.
#[derive(Debug, Clone)]
pub struct RuntimeRoom {
    id: RoomId,
    area: AreaXY,
    seed: bool,
    walls: BTreeSet<WorldXY>,
    doors: BTreeSet<WorldXY>,
    floors: BTreeSet<WorldXY>,
    center: Option<WorldXY>,
    adjacent: BTreeSet<RoomId>,
    distance: u32,
    highlighted: bool,
}

impl RuntimeRoom {
    fn new(id: RoomId, area: AreaXY, seed: bool) -> Self {
        Self {
            id,
            area,
            seed,
            walls: BTreeSet::new(),
            doors: BTreeSet::new(),
            floors: BTreeSet::new(),
            center: None,
            adjacent: BTreeSet::new(),
            distance: if seed { 0 } else { UNREACHED },
            highlighted: false,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    /// The area this room was seeded in.
    pub fn area(&self) -> AreaXY {
        self.area
    }

    pub fn is_seed(&self) -> bool {
        self.seed
    }

    pub fn walls(&self) -> &BTreeSet<WorldXY> {
        &self.walls
    }

    /// Doors still unresolved. Shrinks as doors become walls or floors.
    pub fn doors(&self) -> &BTreeSet<WorldXY> {
        &self.doors
    }

    pub fn floors(&self) -> &BTreeSet<WorldXY> {
        &self.floors
    }

    /// Every cell this room claimed.
    pub fn cells(&self) -> impl Iterator<Item = WorldXY> + '_ {
        self.walls.iter().chain(self.doors.iter()).chain(self.floors.iter()).copied()
    }

    /// The representative cell, known once the room has been fully drawn.
    pub fn center(&self) -> Option<WorldXY> {
        self.center
    }

    pub fn adjacent(&self) -> &BTreeSet<RoomId> {
        &self.adjacent
    }

    /// Hop count from the nearest seed room; `None` while unreached.
    pub fn distance(&self) -> Option<u32> {
        (self.distance != UNREACHED).then_some(self.distance)
    }

    pub(crate) fn raw_distance(&self) -> u32 {
        self.distance
    }

    pub(crate) fn set_raw_distance(&mut self, distance: u32) {
        self.distance = distance;
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Flips the highlight and returns the new state.
    pub(crate) fn toggle_highlight(&mut self) -> bool {
        self.highlighted = !self.highlighted;
        self.highlighted
    }

    pub(crate) fn add_cell(&mut self, xy: WorldXY, tile: TileKind) {
        match tile {
            TileKind::Wall => self.walls.insert(xy),
            TileKind::Door => self.doors.insert(xy),
            TileKind::Floor => self.floors.insert(xy),
            TileKind::None => false,
        };
    }

    /// Moves a resolved door into the bucket matching its new kind.
    pub(crate) fn resolve_door(&mut self, xy: WorldXY, tile: TileKind) {
        if self.doors.remove(&xy) {
            self.add_cell(xy, tile);
        }
    }

    /// Picks the floor cell closest to the centroid of all floors. Rooms
    /// without floors fall back to their other cells. Ties go to the first
    /// cell in row-major order.
    pub(crate) fn late_init(&mut self) {
        let candidates: Vec<WorldXY> = if self.floors.is_empty() {
            self.cells().collect()
        } else {
            self.floors.iter().copied().collect()
        };
        if candidates.is_empty() {
            return;
        }

        let count = candidates.len() as f64;
        let centroid = (
            candidates.iter().map(|xy| xy.x as f64).sum::<f64>() / count,
            candidates.iter().map(|xy| xy.y as f64).sum::<f64>() / count,
        );

        let mut best = candidates[0];
        let mut best_dist = best.distance_squared_to(centroid);
        for xy in candidates.into_iter().skip(1) {
            let dist = xy.distance_squared_to(centroid);
            if dist < best_dist {
                best = xy;
                best_dist = dist;
            }
        }
        self.center = Some(best);
    }
}

impl PartialEq for RuntimeRoom {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RuntimeRoom {}

/// Result of asking for a new edge between two rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    AlreadyLinked,
    /// The edge was added; lists every room whose distance dropped.
    Linked { relaxed: Vec<RoomId> },
}

/// All rooms ever created, indexed by [`RoomId`], and the undirected edges between them.
#[derive(Debug, Default)]
pub struct RoomGraph {
    rooms: Vec<RuntimeRoom>,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room. Seed rooms are pinned at distance 0.
    pub(crate) fn new_room(&mut self, area: AreaXY, seed: bool) -> RoomId {
        let id = RoomId::from(self.rooms.len() as u32);
        self.rooms.push(RuntimeRoom::new(id, area, seed));
        id
    }

    pub fn get(&self, id: RoomId) -> Option<&RuntimeRoom> {
        self.rooms.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: RoomId) -> Option<&mut RuntimeRoom> {
        self.rooms.get_mut(id.index())
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> Result<&mut RuntimeRoom, GraphError> {
        self.rooms.get_mut(id.index()).ok_or(GraphError::UnknownRoom(id))
    }

    pub fn rooms(&self) -> &[RuntimeRoom] {
        &self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn are_adjacent(&self, a: RoomId, b: RoomId) -> bool {
        self.get(a).is_some_and(|room| room.adjacent.contains(&b))
    }

    /// Adds the undirected edge `a`-`b` and re-relaxes every distance.
    /// Linking an already linked pair only logs a warning.
    pub fn add_room_links(&mut self, a: RoomId, b: RoomId) -> Result<LinkOutcome, GraphError> {
        if a == b {
            return Err(GraphError::SelfLink(a));
        }
        if self.get(a).is_none() {
            return Err(GraphError::UnknownRoom(a));
        }
        if self.get(b).is_none() {
            return Err(GraphError::UnknownRoom(b));
        }
        if self.are_adjacent(a, b) {
            warn!("{a} and {b} are already linked");
            return Ok(LinkOutcome::AlreadyLinked);
        }

        self.room_mut(a)?.adjacent.insert(b);
        self.room_mut(b)?.adjacent.insert(a);

        Ok(LinkOutcome::Linked {
            relaxed: relax_distances(&mut self.rooms),
        })
    }

    /// Exports the adjacency as a petgraph graph; node indices follow room ids.
    #[cfg(feature = "petgraph")]
    pub fn to_petgraph(&self) -> petgraph::graph::UnGraph<RoomId, ()> {
        use petgraph::graph::NodeIndex;

        let mut graph = petgraph::graph::UnGraph::with_capacity(self.rooms.len(), 0);
        for room in self.rooms.iter() {
            graph.add_node(room.id);
        }
        for room in self.rooms.iter() {
            for other in room.adjacent.iter().filter(|other| **other > room.id) {
                graph.add_edge(NodeIndex::new(room.id.index()), NodeIndex::new(other.index()), ());
            }
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(graph: &mut RoomGraph, from: RoomId, len: usize) -> Vec<RoomId> {
        let mut prev = from;
        let mut ids = Vec::new();
        for _ in 0..len {
            let next = graph.new_room(AreaXY::new(0, 0), false);
            graph.add_room_links(prev, next).unwrap();
            ids.push(next);
            prev = next;
        }
        ids
    }

    #[test]
    fn links_are_symmetric_and_unique() {
        let mut graph = RoomGraph::new();
        let a = graph.new_room(AreaXY::new(0, 0), true);
        let b = graph.new_room(AreaXY::new(0, 0), false);

        assert_eq!(
            graph.add_room_links(a, b),
            Ok(LinkOutcome::Linked { relaxed: vec![b] })
        );
        assert!(graph.are_adjacent(a, b) && graph.are_adjacent(b, a));
        assert_eq!(graph.add_room_links(b, a), Ok(LinkOutcome::AlreadyLinked));
        assert_eq!(graph.get(a).map(|r| r.adjacent().len()), Some(1));
        assert_eq!(graph.add_room_links(a, a), Err(GraphError::SelfLink(a)));
        assert_eq!(
            graph.add_room_links(a, RoomId::from(7)),
            Err(GraphError::UnknownRoom(RoomId::from(7)))
        );
    }

    #[test]
    fn distances_follow_hops_from_the_seed() {
        let mut graph = RoomGraph::new();
        let seed = graph.new_room(AreaXY::new(0, 0), true);
        let rooms = chain(&mut graph, seed, 4);
        let distances: Vec<Option<u32>> = rooms.iter().map(|id| graph.get(*id).unwrap().distance()).collect();
        assert_eq!(distances, vec![Some(1), Some(2), Some(3), Some(4)]);

        // a shortcut from the seed to the far end
        graph.add_room_links(seed, rooms[3]).unwrap();
        let distances: Vec<Option<u32>> = rooms.iter().map(|id| graph.get(*id).unwrap().distance()).collect();
        assert_eq!(distances, vec![Some(1), Some(2), Some(2), Some(1)]);
        assert_eq!(graph.get(seed).unwrap().distance(), Some(0));
    }

    #[test]
    fn joining_two_seeded_components_relaxes_the_merged_side() {
        let mut graph = RoomGraph::new();
        let first = graph.new_room(AreaXY::new(0, 0), true);
        let long = chain(&mut graph, first, 5);
        let second = graph.new_room(AreaXY::new(5, 0), true);
        let short = chain(&mut graph, second, 1);

        let outcome = graph.add_room_links(long[4], short[0]).unwrap();
        assert_eq!(
            outcome,
            LinkOutcome::Linked { relaxed: vec![long[3], long[4]] }
        );
        let distances: Vec<Option<u32>> = long.iter().map(|id| graph.get(*id).unwrap().distance()).collect();
        assert_eq!(distances, vec![Some(1), Some(2), Some(3), Some(3), Some(2)]);
        assert_eq!(graph.get(short[0]).unwrap().distance(), Some(1));
    }

    #[test]
    fn unlinked_rooms_stay_unreached() {
        let mut graph = RoomGraph::new();
        graph.new_room(AreaXY::new(0, 0), true);
        let lonely = graph.new_room(AreaXY::new(0, 0), false);
        assert_eq!(graph.get(lonely).unwrap().distance(), None);
    }

    #[test]
    fn late_init_picks_a_floor_near_the_centroid() {
        let mut graph = RoomGraph::new();
        let id = graph.new_room(AreaXY::new(0, 0), false);
        let room = graph.get_mut(id).unwrap();
        // an L shape whose centroid (2/3, 5/6) is not itself a floor
        for xy in [(0, 0), (1, 0), (2, 0), (0, 1), (0, 2), (1, 2)] {
            room.add_cell(WorldXY::from(xy), TileKind::Floor);
        }
        room.add_cell(WorldXY::new(5, 5), TileKind::Wall);
        room.late_init();
        assert_eq!(room.center(), Some(WorldXY::new(0, 1)));
    }

    #[test]
    fn resolved_doors_change_bucket() {
        let mut graph = RoomGraph::new();
        let id = graph.new_room(AreaXY::new(0, 0), false);
        let room = graph.get_mut(id).unwrap();
        room.add_cell(WorldXY::new(1, 1), TileKind::Door);
        room.resolve_door(WorldXY::new(1, 1), TileKind::Wall);
        assert!(room.doors().is_empty());
        assert!(room.walls().contains(&WorldXY::new(1, 1)));
    }

    #[cfg(feature = "petgraph")]
    #[test]
    fn petgraph_export_mirrors_the_adjacency() {
        let mut graph = RoomGraph::new();
        let seed = graph.new_room(AreaXY::new(0, 0), true);
        let rooms = chain(&mut graph, seed, 2);
        graph.add_room_links(seed, rooms[1]).unwrap();

        let exported = graph.to_petgraph();
        assert_eq!(exported.node_count(), 3);
        assert_eq!(exported.edge_count(), 3);
    }
}
