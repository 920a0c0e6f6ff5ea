use std::collections::BTreeSet;

use super::structs::{RoomId, RuntimeRoom};

/// Lowers every room's distance to one more than its closest neighbor's,
/// sweeping all rooms until a full pass changes nothing. Seed rooms stay at 0.
///
/// Edges all weigh 1, so this settles on hop counts. Distances only ever go
/// down, which keeps earlier results valid as edges are added. Unreached
/// rooms use `u32::MAX` and saturate instead of overflowing.
///
/// Returns the rooms whose distance changed, in id order.
pub fn relax_distances(rooms: &mut [RuntimeRoom]) -> Vec<RoomId> {
    let mut relaxed: BTreeSet<RoomId> = BTreeSet::new();

    loop {
        let mut changed = false;

        for idx in 0..rooms.len() {
            if rooms[idx].is_seed() {
                continue;
            }

            let best = rooms[idx]
                .adjacent()
                .iter()
                .filter_map(|other| rooms.get(other.index()))
                .map(|other| other.raw_distance().saturating_add(1))
                .min();

            if let Some(best) = best {
                if best < rooms[idx].raw_distance() {
                    rooms[idx].set_raw_distance(best);
                    relaxed.insert(rooms[idx].id());
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    relaxed.into_iter().collect()
}
