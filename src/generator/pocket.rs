use std::collections::{BTreeSet, HashSet, VecDeque};

use log::info;

use crate::error::GenerationError;
use crate::room_graph::structs::RoomId;
use crate::template::TileKind;
use crate::view::ViewBounds;
use crate::world::{WorldGrid, WorldXY};

use super::{GenEvent, Generator};

/// Finds every maximal 4-connected group of unclaimed cells inside `bounds`
/// that is fully walled in by claimed cells.
///
/// Groups touching the edge of `bounds` are skipped: they may continue into
/// the unscanned world, so we cannot tell yet whether they are enclosed.
/// Each pocket is returned sorted row-major; pockets come in the order their
/// first cell is met scanning `bounds` row by row.
pub fn find_pockets(world: &WorldGrid, bounds: &ViewBounds) -> Vec<Vec<WorldXY>> {
    let mut seen: HashSet<WorldXY> = HashSet::new();
    let mut pockets = Vec::new();

    for start in bounds.cells() {
        if world.is_claimed(start) || !seen.insert(start) {
            continue;
        }

        let mut queue = VecDeque::from([start]);
        let mut members = Vec::new();
        let mut open = false;

        while let Some(xy) = queue.pop_front() {
            members.push(xy);
            if bounds.on_edge(xy) {
                open = true;
            }
            for adj in xy.neighbors() {
                if !bounds.contains(adj) || world.is_claimed(adj) {
                    continue;
                }
                if seen.insert(adj) {
                    queue.push_back(adj);
                }
            }
        }

        if !open {
            members.sort();
            pockets.push(members);
        }
    }

    pockets
}

impl Generator {
    /// Claims `cells` as a floor-only room, links it to every foreign room
    /// owning a door next to it, then settles those doors.
    ///
    /// Returns `None` without touching anything if some cell was claimed
    /// since the pocket was found.
    pub(super) fn materialize_pocket(&mut self, cells: &[WorldXY]) -> Result<Option<RoomId>, GenerationError> {
        let Some(first) = cells.first() else {
            return Ok(None);
        };
        if cells.iter().any(|xy| self.world.is_claimed(*xy)) {
            return Ok(None);
        }

        let area = self.areas.coord_for(*first);
        let room = self.graph.new_room(area, false);
        self.events.push(GenEvent::RoomCreated { room, area });

        let runtime = self.graph.room_mut(room)?;
        for xy in cells {
            self.world.claim(*xy, TileKind::Floor, room)?;
            runtime.add_cell(*xy, TileKind::Floor);
            self.events.push(GenEvent::TileClaimed {
                xy: *xy,
                tile: TileKind::Floor,
                room,
            });
        }
        runtime.late_init();
        self.register_room(area, room, &[]);
        info!("backfilled a pocket of {} cells as {room}", cells.len());

        let door_owners: BTreeSet<RoomId> = cells
            .iter()
            .flat_map(|xy| xy.neighbors())
            .filter_map(|adj| self.world.get(adj))
            .filter(|cell| cell.tile == TileKind::Door && cell.room != room)
            .map(|cell| cell.room)
            .collect();
        for other in door_owners {
            self.link(room, other)?;
        }

        self.classify_doors()?;
        Ok(Some(room))
    }
}
