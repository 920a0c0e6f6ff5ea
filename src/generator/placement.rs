use log::debug;

use crate::error::GenerationError;
use crate::room_graph::structs::RoomId;
use crate::template::{RoomTemplate, TileKind};
use crate::tile_map::LocalXY;
use crate::world::{WorldGrid, WorldXY};

use super::{GenEvent, Generator};

/// Whether `template` can be stamped with its top-left corner at `origin`.
///
/// Every template cell must land on an unclaimed cell or on a cell of the
/// exact same kind, and at least one cell must differ from what is already
/// there: a stamp that adds nothing sits right on top of an existing room.
pub fn fits(world: &WorldGrid, template: &RoomTemplate, origin: WorldXY) -> bool {
    let mut superposition = true;

    for (xy, me) in template.tiles().iter() {
        let other = world.tile_at(origin.offset(xy.x as i32, xy.y as i32));
        if other != TileKind::None && other != *me {
            return false;
        }
        if other != *me {
            superposition = false;
        }
    }

    !superposition
}

#[inline]
fn origin_for(door: WorldXY, template_door: LocalXY) -> WorldXY {
    door.offset(-(template_door.x as i32), -(template_door.y as i32))
}

impl Generator {
    /// Tries templates in random order and each template's doors in order;
    /// the first door that lines up with `door` wins.
    pub(super) fn find_fit(&mut self, door: WorldXY) -> Option<(usize, LocalXY)> {
        for template_index in self.rng.permutation(self.pool.len()) {
            let Some(template) = self.pool.get(template_index) else {
                continue;
            };
            if let Some(template_door) = template
                .doors()
                .iter()
                .find(|template_door| fits(&self.world, template, origin_for(door, **template_door)))
            {
                return Some((template_index, *template_door));
            }
        }
        None
    }

    /// Grows a new room out of `door` and wires it into the areas and the graph.
    pub(super) fn place_template(
        &mut self,
        template_index: usize,
        template_door: LocalXY,
        door: WorldXY,
        owner: RoomId,
    ) -> Result<RoomId, GenerationError> {
        let origin = origin_for(door, template_door);
        let area = self.areas.coord_for(origin);
        let room = self.graph.new_room(area, false);
        self.events.push(GenEvent::RoomCreated { room, area });

        let new_doors = self.draw_template(template_index, origin, room)?;
        self.template_rooms += 1;
        self.register_room(area, room, &new_doors);
        self.areas.remove_pending(door);
        debug!(
            "placed {room} from template {template_index} at {origin} through {door}, {} new doors",
            new_doors.len()
        );

        self.classify_doors()?;

        // The door between the two rooms usually links them during the sweep.
        // When the cell behind it already belonged to a third room, tie the
        // newcomer to the room it grew from so every room stays reachable.
        if self.graph.get(room).is_some_and(|r| r.adjacent().is_empty()) {
            self.link(owner, room)?;
        }

        Ok(room)
    }

    /// Claims every unclaimed, non-empty template cell for `room`, then
    /// settles the room's center. Returns the door cells this room claimed.
    pub(super) fn draw_template(
        &mut self,
        template_index: usize,
        origin: WorldXY,
        room: RoomId,
    ) -> Result<Vec<WorldXY>, GenerationError> {
        let template = self
            .pool
            .get(template_index)
            .ok_or(GenerationError::TemplateOutOfRange(template_index))?;
        let runtime = self.graph.room_mut(room)?;
        let mut new_doors = Vec::new();

        for (xy, tile) in template.tiles().iter() {
            if *tile == TileKind::None {
                continue;
            }
            let at = origin.offset(xy.x as i32, xy.y as i32);
            if self.world.is_claimed(at) {
                continue;
            }
            self.world.claim(at, *tile, room)?;
            runtime.add_cell(at, *tile);
            self.events.push(GenEvent::TileClaimed { xy: at, tile: *tile, room });
            if *tile == TileKind::Door {
                new_doors.push(at);
            }
        }

        runtime.late_init();
        Ok(new_doors)
    }
}
