use log::trace;

use crate::error::GenerationError;
use crate::template::TileKind;
use crate::world::WorldXY;

use super::{GenEvent, Generator};

impl Generator {
    /// Reclassifies every door whose surroundings are settled.
    ///
    /// A door boxed in on three or more sides by walls or doors leads nowhere
    /// and becomes wall. A door with floor on exactly two sides joins two
    /// rooms: it becomes floor and the rooms owning those floors get linked.
    /// Anything else stays a door.
    pub(super) fn classify_doors(&mut self) -> Result<(), GenerationError> {
        let doors: Vec<WorldXY> = self.world.door_cells().collect();

        for door in doors {
            let around = door.neighbors().map(|xy| (xy, self.world.tile_at(xy)));
            let solid = around.iter().filter(|(_, tile)| tile.is_solid()).count();
            let floors: Vec<WorldXY> = around
                .iter()
                .filter(|(_, tile)| *tile == TileKind::Floor)
                .map(|(xy, _)| *xy)
                .collect();

            if solid >= 3 {
                self.reclassify_door(door, TileKind::Wall)?;
            } else if let &[a, b] = floors.as_slice() {
                self.reclassify_door(door, TileKind::Floor)?;
                if let (Some(a), Some(b)) = (self.world.owner(a), self.world.owner(b)) {
                    if a != b {
                        self.link(a, b)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn reclassify_door(&mut self, door: WorldXY, tile: TileKind) -> Result<(), GenerationError> {
        let owner = self.world.reclassify(door, tile)?;
        self.graph.room_mut(owner)?.resolve_door(door, tile);
        self.areas.remove_pending(door);
        self.events.push(GenEvent::TileReclassified { xy: door, tile });
        trace!("door {door} of {owner} is now {tile:?}");
        Ok(())
    }
}
