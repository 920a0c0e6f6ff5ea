//! Invariants that must hold for any template and any seed.

use std::collections::BTreeSet;

use proptest::prelude::*;
use room_grower::{Generator, GeneratorConfig, RoomTemplate, Step, TemplatePool, TileKind, ViewBounds, WorldXY};

fn layout() -> impl Strategy<Value = String> {
    (1usize..7, 1usize..7).prop_flat_map(|(width, height)| {
        prop::collection::vec(prop::collection::vec(prop::sample::select(vec![' ', '.', '#']), width), height)
            .prop_map(|rows| {
                rows.into_iter()
                    .map(|row| row.into_iter().collect::<String>())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
    })
}

fn pending_doors(gen: &Generator) -> BTreeSet<WorldXY> {
    gen.areas()
        .iter()
        .flat_map(|area| area.pending_doors().iter().copied())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn four_turns_are_the_identity(text in layout()) {
        let template = RoomTemplate::parse("t", &text).unwrap();
        let back = template.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
        prop_assert_eq!(back.tiles(), template.tiles());
        prop_assert_eq!(back.doors(), template.doors());
    }

    #[test]
    fn rotated_doors_match_a_fresh_parse(text in layout(), turns in 1usize..4) {
        let mut rotated = RoomTemplate::parse("t", &text).unwrap();
        for _ in 0..turns {
            rotated = rotated.rotated_cw();
        }
        // drawing doors as floor gives back the undecorated layout
        let reparsed = RoomTemplate::parse("t", &rotated.to_string().replace('+', ".")).unwrap();
        prop_assert_eq!(reparsed.tiles(), rotated.tiles());
        prop_assert_eq!(reparsed.doors(), rotated.doors());
    }

    #[test]
    fn doors_sit_on_floor_cells(text in layout()) {
        let template = RoomTemplate::parse("t", &text).unwrap();
        for door in template.doors() {
            prop_assert_eq!(template.tile(*door), TileKind::Door);
        }
        let marked = template.tiles().iter().filter(|(_, tile)| **tile == TileKind::Door).count();
        prop_assert_eq!(marked, template.doors().len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn growth_keeps_the_world_consistent(seed in any::<u64>(), radius in 4i32..12, steps in 10usize..120) {
        let config = GeneratorConfig::default().with_seed(seed);
        let mut gen = Generator::new(TemplatePool::builtin().unwrap(), config).unwrap();
        let view = ViewBounds::around(WorldXY::new(2, 2), radius);
        let mut previous: Vec<Option<u32>> = Vec::new();

        for _ in 0..steps {
            match gen.step(&view).unwrap() {
                // a handled door leaves the frontier for good
                Step::Placed { door, .. } | Step::Fallback(door) | Step::Stale(door) => {
                    prop_assert!(!pending_doors(&gen).contains(&door));
                    prop_assert_ne!(gen.world().tile_at(door), TileKind::Door);
                }
                _ => (),
            }

            let now: Vec<Option<u32>> = gen.graph().rooms().iter().map(|room| room.distance()).collect();
            for (before, after) in previous.iter().zip(now.iter()) {
                if let Some(before) = before {
                    prop_assert!(after.is_some_and(|after| after <= *before));
                }
            }
            previous = now;
        }

        // every claimed cell belongs to exactly one room, in the matching bucket
        let mut owned = 0;
        for room in gen.graph().rooms() {
            for xy in room.walls() {
                prop_assert_eq!(gen.world().tile_at(*xy), TileKind::Wall);
            }
            for xy in room.floors() {
                prop_assert_eq!(gen.world().tile_at(*xy), TileKind::Floor);
            }
            for xy in room.doors() {
                prop_assert_eq!(gen.world().tile_at(*xy), TileKind::Door);
            }
            for xy in room.cells() {
                prop_assert_eq!(gen.world().owner(xy), Some(room.id()));
                owned += 1;
            }
        }
        prop_assert_eq!(owned, gen.world().len());
    }

    #[test]
    fn distances_are_shortest_hops_from_the_seed(seed in any::<u64>(), steps in 10usize..150) {
        let config = GeneratorConfig::default().with_seed(seed);
        let mut gen = Generator::new(TemplatePool::builtin().unwrap(), config).unwrap();
        gen.run(&ViewBounds::around(WorldXY::new(2, 2), 10), steps).unwrap();

        let graph = gen.graph();
        for room in graph.rooms() {
            for other in room.adjacent() {
                prop_assert!(graph.are_adjacent(*other, room.id()));
            }
            if room.is_seed() {
                prop_assert_eq!(room.distance(), Some(0));
                continue;
            }
            let nearest = room
                .adjacent()
                .iter()
                .filter_map(|id| graph.get(*id).and_then(|r| r.distance()))
                .min();
            prop_assert_eq!(room.distance(), nearest.map(|d| d + 1));
        }
    }
}
