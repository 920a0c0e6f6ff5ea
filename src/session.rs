//! The top-level object a host embeds.
//!
//! A [`Session`] owns the [`Generator`] and talks to the outside world through
//! two collaborator traits: a [`Presenter`] that mirrors the world visually and
//! an [`AchievementSink`] that receives unlock signals. Nothing here draws,
//! reads input devices or stores anything on disk.

use log::debug;

use crate::area::AreaXY;
use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::generator::{GenEvent, Generator, Step};
use crate::room_graph::structs::RoomId;
use crate::template::{TemplatePool, TileKind};
use crate::view::Viewport;
use crate::world::WorldXY;

/// Visual side of the session. Positions are world-space (`cell * tile_size`).
/// Every method defaults to doing nothing.
pub trait Presenter {
    fn draw_tile(&mut self, _room: RoomId, _position: [f32; 2], _tile: TileKind) {}

    fn retile(&mut self, _position: [f32; 2], _tile: TileKind) {}

    fn draw_link(&mut self, _a: RoomId, _b: RoomId, _from: [f32; 2], _to: [f32; 2]) {}

    fn set_distance_label(&mut self, _room: RoomId, _position: [f32; 2], _distance: u32) {}

    fn set_room_highlight(&mut self, _room: RoomId, _highlighted: bool) {}

    fn set_room_links_visible(&mut self, _room: RoomId, _visible: bool) {}

    fn set_room_distance_visible(&mut self, _room: RoomId, _visible: bool) {}

    fn set_area_outline_visible(&mut self, _area: AreaXY, _visible: bool) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    /// Clicked a room with no unresolved door left.
    DoorlessRoom,
}

pub trait AchievementSink {
    fn unlock(&mut self, achievement: Achievement);
}

/// Presenter and achievement sink that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

impl AchievementSink for NullPresenter {
    fn unlock(&mut self, _achievement: Achievement) {}
}

pub struct Session<P: Presenter, A: AchievementSink> {
    generator: Generator,
    presenter: P,
    achievements: A,
    focus_area: Option<AreaXY>,
}

impl<P: Presenter, A: AchievementSink> Session<P, A> {
    pub fn new(
        pool: TemplatePool,
        config: GeneratorConfig,
        presenter: P,
        achievements: A,
    ) -> Result<Self, GenerationError> {
        Ok(Self {
            generator: Generator::new(pool, config)?,
            presenter,
            achievements,
            focus_area: None,
        })
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut Generator {
        &mut self.generator
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn achievements(&self) -> &A {
        &self.achievements
    }

    /// The area at the center of the active 3x3 block, once the first tick ran.
    pub fn focus_area(&self) -> Option<AreaXY> {
        self.focus_area
    }

    fn tile_size(&self) -> f32 {
        self.generator.config().tile_size
    }

    /// Runs one unit of generation for what `viewport` shows, and mirrors
    /// the result on the presenter.
    pub fn tick(&mut self, viewport: &Viewport) -> Result<Step, GenerationError> {
        let tile_size = self.tile_size();
        let focus = self.generator.areas().coord_for(viewport.focus_cell(tile_size));
        self.refocus(focus);

        let step = self.generator.step(&viewport.bounds(tile_size))?;
        self.forward_events();
        Ok(step)
    }

    /// Shows outlines for the 3x3 block around `focus` and hides the rest of the old block.
    fn refocus(&mut self, focus: AreaXY) {
        if self.focus_area == Some(focus) {
            return;
        }
        if let Some(old) = self.focus_area {
            for area in old.block().filter(|area| !area.is_in_block_of(focus)) {
                self.presenter.set_area_outline_visible(area, false);
            }
        }
        for area in focus.block() {
            self.presenter.set_area_outline_visible(area, true);
        }
        debug!("focus moved to area {focus}");
        self.focus_area = Some(focus);
    }

    fn forward_events(&mut self) {
        let tile_size = self.tile_size();
        let show_links = self.generator.config().show_links;
        let show_distance = self.generator.config().show_distance;

        for event in self.generator.drain_events() {
            match event {
                GenEvent::RoomCreated { .. } => (),
                GenEvent::TileClaimed { xy, tile, room } => {
                    self.presenter.draw_tile(room, xy.to_world_position(tile_size), tile);
                }
                GenEvent::TileReclassified { xy, tile } => {
                    self.presenter.retile(xy.to_world_position(tile_size), tile);
                }
                GenEvent::RoomsLinked(a, b) => {
                    let centers = (self.center_of(a), self.center_of(b));
                    if let (Some(from), Some(to)) = centers {
                        self.presenter.draw_link(
                            a,
                            b,
                            from.to_world_position(tile_size),
                            to.to_world_position(tile_size),
                        );
                        self.presenter.set_room_links_visible(a, show_links);
                        self.presenter.set_room_links_visible(b, show_links);
                    }
                }
                GenEvent::DistanceChanged { room, distance } => {
                    if let Some(center) = self.center_of(room) {
                        self.presenter
                            .set_distance_label(room, center.to_world_position(tile_size), distance);
                        self.presenter.set_room_distance_visible(room, show_distance);
                    }
                }
            }
        }
    }

    fn center_of(&self, room: RoomId) -> Option<WorldXY> {
        self.generator.room(room).and_then(|r| r.center())
    }

    /// Toggles the highlight of the room under `world_position`. Clicking a
    /// room with no door left unlocks [`Achievement::DoorlessRoom`].
    pub fn handle_click(&mut self, world_position: [f32; 2]) -> Option<RoomId> {
        let cell = WorldXY::from_world_position(world_position, self.tile_size());
        let id = self.generator.world().owner(cell)?;
        let room = self.generator.room_mut(id)?;
        let highlighted = room.toggle_highlight();
        let doorless = room.doors().is_empty();

        self.presenter.set_room_highlight(id, highlighted);
        if doorless {
            self.achievements.unlock(Achievement::DoorlessRoom);
        }
        Some(id)
    }

    pub fn toggle_show_links(&mut self, visible: bool) {
        self.generator.config_mut().show_links = visible;
        for id in self.room_ids() {
            self.presenter.set_room_links_visible(id, visible);
        }
    }

    pub fn toggle_show_distance(&mut self, visible: bool) {
        self.generator.config_mut().show_distance = visible;
        for id in self.room_ids() {
            self.presenter.set_room_distance_visible(id, visible);
        }
    }

    /// Flips whether stalled generation backfills enclosed pockets. Returns the new value.
    pub fn toggle_calculate_new_rooms(&mut self) -> bool {
        self.generator.config_mut().toggle_calculate_new_rooms()
    }

    fn room_ids(&self) -> Vec<RoomId> {
        self.generator.graph().rooms().iter().map(|room| room.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        tiles: usize,
        links: Vec<(RoomId, RoomId)>,
        highlights: Vec<(RoomId, bool)>,
        visible_areas: Vec<AreaXY>,
        hidden_areas: Vec<AreaXY>,
        link_toggles: usize,
        unlocked: Vec<Achievement>,
    }

    impl Presenter for Recorder {
        fn draw_tile(&mut self, _room: RoomId, _position: [f32; 2], _tile: TileKind) {
            self.tiles += 1;
        }

        fn draw_link(&mut self, a: RoomId, b: RoomId, _from: [f32; 2], _to: [f32; 2]) {
            self.links.push((a, b));
        }

        fn set_room_highlight(&mut self, room: RoomId, highlighted: bool) {
            self.highlights.push((room, highlighted));
        }

        fn set_room_links_visible(&mut self, _room: RoomId, _visible: bool) {
            self.link_toggles += 1;
        }

        fn set_area_outline_visible(&mut self, area: AreaXY, visible: bool) {
            if visible {
                self.visible_areas.push(area);
            } else {
                self.hidden_areas.push(area);
            }
        }
    }

    impl AchievementSink for Recorder {
        fn unlock(&mut self, achievement: Achievement) {
            self.unlocked.push(achievement);
        }
    }

    fn session() -> Session<Recorder, NullPresenter> {
        let pool = TemplatePool::builtin().unwrap();
        Session::new(pool, GeneratorConfig::default().with_seed(11), Recorder::default(), NullPresenter).unwrap()
    }

    #[test]
    fn first_tick_seeds_and_draws() {
        let mut session = session();
        let view = Viewport::new([2.0, 2.0], [6.0, 6.0]);
        let step = session.tick(&view).unwrap();
        assert!(matches!(step, Step::Seeded(_)));
        // the hall covers 25 cells
        assert_eq!(session.presenter().tiles, 25);
        assert_eq!(session.presenter().visible_areas.len(), 9);
        assert_eq!(session.focus_area(), Some(AreaXY::new(0, 0)));
    }

    #[test]
    fn moving_focus_hides_areas_that_left_the_block() {
        let mut session = session();
        session.tick(&Viewport::new([2.0, 2.0], [6.0, 6.0])).unwrap();
        session.tick(&Viewport::new([12.0, 2.0], [6.0, 6.0])).unwrap();
        // the left column of the old block is hidden, the new right column shown
        assert_eq!(session.presenter().hidden_areas.len(), 3);
        assert_eq!(session.presenter().visible_areas.len(), 18);
        assert_eq!(session.focus_area(), Some(AreaXY::new(1, 0)));
    }

    #[test]
    fn clicking_toggles_highlight() {
        let mut session = session();
        session.tick(&Viewport::new([2.0, 2.0], [6.0, 6.0])).unwrap();

        let clicked = session.handle_click([2.5, 2.5]);
        assert_eq!(clicked, Some(RoomId::from(0)));
        session.handle_click([2.5, 2.5]);
        assert_eq!(
            session.presenter().highlights,
            vec![(RoomId::from(0), true), (RoomId::from(0), false)]
        );
        assert_eq!(session.handle_click([-40.0, 3.0]), None);
    }

    #[test]
    fn growth_draws_links_between_room_centers() {
        let mut session = session();
        let view = Viewport::new([2.0, 2.0], [12.0, 12.0]);
        for _ in 0..40 {
            session.tick(&view).unwrap();
        }
        assert!(session.generator().graph().len() > 1);
        assert!(!session.presenter().links.is_empty());
        for (a, b) in session.presenter().links.iter() {
            assert!(session.generator().graph().are_adjacent(*a, *b));
        }
    }

    #[test]
    fn link_toggle_reaches_every_room() {
        let mut session = session();
        session.tick(&Viewport::new([2.0, 2.0], [6.0, 6.0])).unwrap();
        let before = session.presenter().link_toggles;
        session.toggle_show_links(false);
        assert_eq!(session.presenter().link_toggles - before, session.generator().graph().len());
        assert!(!session.generator().config().show_links);
    }

    #[test]
    fn doorless_room_click_unlocks_achievement() {
        let pool = TemplatePool::from_texts([("closet", "###\n#.#\n###")]).unwrap();
        let mut session = Session::new(
            pool,
            GeneratorConfig::default().with_seed(2),
            NullPresenter,
            Recorder::default(),
        )
        .unwrap();
        session.tick(&Viewport::new([1.0, 1.0], [4.0, 4.0])).unwrap();
        assert_eq!(session.handle_click([1.5, 1.5]), Some(RoomId::from(0)));
        assert_eq!(session.achievements().unlocked, vec![Achievement::DoorlessRoom]);
    }
}
