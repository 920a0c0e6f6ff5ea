/// Holds template fitting and drawing
mod placement;

/// Holds the door reclassification sweep
mod doors;

/// Holds the search for enclosed empty pockets and their backfill
pub mod pocket;

use std::collections::VecDeque;

use log::{debug, info, trace};

use crate::area::{AreaIndex, AreaXY};
use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GridError};
use crate::rng::GenRng;
use crate::room_graph::structs::{LinkOutcome, RoomGraph, RoomId, RuntimeRoom};
use crate::template::{TemplatePool, TileKind};
use crate::view::ViewBounds;
use crate::world::{WorldGrid, WorldXY};

pub use self::placement::fits;

/// What a single [`Generator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The starting room was drawn at the origin.
    Seeded(RoomId),
    /// A template grew out of `door`.
    Placed { door: WorldXY, room: RoomId },
    /// Nothing fits behind `door`, so it became floor.
    Fallback(WorldXY),
    /// `door` had already been resolved and was dropped from the frontier.
    Stale(WorldXY),
    /// `door` lies outside the view and stays pending.
    Deferred(WorldXY),
    /// An enclosed empty pocket became a floor-only room.
    Pocket(RoomId),
    /// No work within the current view.
    Idle,
}

/// How a frontier door was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Placed(RoomId),
    Fallback,
}

/// Changes the host may want to mirror, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenEvent {
    RoomCreated { room: RoomId, area: AreaXY },
    TileClaimed { xy: WorldXY, tile: TileKind, room: RoomId },
    TileReclassified { xy: WorldXY, tile: TileKind },
    RoomsLinked(RoomId, RoomId),
    DistanceChanged { room: RoomId, distance: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Seed,
    Resolve,
    Sweep,
}

/// One walk over the frontier doors of the active areas.
#[derive(Debug, Default)]
struct ResolvePass {
    queue: VecDeque<WorldXY>,
    placed: usize,
    started: bool,
}

/// Grows rooms out of frontier doors, one unit of work per [`step`](Generator::step).
///
/// The generator owns the world grid, the area index and the room graph.
/// Callers only observe them between steps, so a room is never seen half drawn.
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    pool: TemplatePool,
    rng: GenRng,
    world: WorldGrid,
    areas: AreaIndex,
    graph: RoomGraph,
    phase: Phase,
    pass: ResolvePass,
    pockets: VecDeque<Vec<WorldXY>>,
    events: Vec<GenEvent>,
    template_rooms: usize,
}

impl Generator {
    pub fn new(pool: TemplatePool, config: GeneratorConfig) -> Result<Self, GenerationError> {
        if pool.is_empty() {
            return Err(GenerationError::EmptyPool);
        }
        let rng = config.seed.map_or_else(GenRng::from_entropy, GenRng::new);
        info!("generator created with {} templates, seed {}", pool.len(), rng.seed());

        Ok(Self {
            areas: AreaIndex::new(config.area_size),
            config,
            pool,
            rng,
            world: WorldGrid::new(),
            graph: RoomGraph::new(),
            phase: Phase::Seed,
            pass: ResolvePass::default(),
            pockets: VecDeque::new(),
            events: Vec::new(),
            template_rooms: 0,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GeneratorConfig {
        &mut self.config
    }

    pub fn pool(&self) -> &TemplatePool {
        &self.pool
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn world(&self) -> &WorldGrid {
        &self.world
    }

    pub fn areas(&self) -> &AreaIndex {
        &self.areas
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn room(&self, id: RoomId) -> Option<&RuntimeRoom> {
        self.graph.get(id)
    }

    /// The room that claimed `xy`, if any.
    pub fn room_at(&self, xy: WorldXY) -> Option<&RuntimeRoom> {
        self.world.owner(xy).and_then(|id| self.graph.get(id))
    }

    /// Takes every event recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<GenEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn room_mut(&mut self, id: RoomId) -> Option<&mut RuntimeRoom> {
        self.graph.get_mut(id)
    }

    /// Performs one unit of work for the world around `view`.
    pub fn step(&mut self, view: &ViewBounds) -> Result<Step, GenerationError> {
        match self.phase {
            Phase::Seed => return Ok(Step::Seeded(self.seed_room_at(0, WorldXY::ORIGIN)?)),
            Phase::Sweep => {
                if let Some(room) = self.next_pocket()? {
                    return Ok(Step::Pocket(room));
                }
            }
            Phase::Resolve => (),
        }

        if self.pass.queue.is_empty() {
            if self.pass.started && self.pass.placed == 0 && self.config.calculate_new_rooms {
                self.pass = ResolvePass::default();
                let pockets = pocket::find_pockets(&self.world, view);
                if pockets.is_empty() {
                    return Ok(Step::Idle);
                }
                debug!("found {} enclosed pockets", pockets.len());
                self.pockets = pockets.into();
                self.phase = Phase::Sweep;
                return Ok(self.next_pocket()?.map_or(Step::Idle, Step::Pocket));
            }

            self.start_pass(view);
            if self.pass.queue.is_empty() {
                return Ok(Step::Idle);
            }
        }

        match self.pass.queue.pop_front() {
            Some(door) => self.process_frontier(door, view),
            None => Ok(Step::Idle),
        }
    }

    /// Steps until nothing is left to do around `view` or `max_steps` is hit.
    /// Returns how many steps did work.
    pub fn run(&mut self, view: &ViewBounds, max_steps: usize) -> Result<usize, GenerationError> {
        let mut worked = 0;
        let mut idle_in_a_row = 0;
        for _ in 0..max_steps {
            match self.step(view)? {
                Step::Idle => {
                    idle_in_a_row += 1;
                    // one idle for an empty frontier, one for a sweep that found nothing
                    if idle_in_a_row >= 2 {
                        break;
                    }
                }
                _ => {
                    idle_in_a_row = 0;
                    worked += 1;
                }
            }
        }
        Ok(worked)
    }

    /// Draws template `template_index` with its top-left corner at `origin`
    /// as a new seed room, pinned at distance 0. Cells already claimed are
    /// left to their owners.
    pub fn seed_room_at(&mut self, template_index: usize, origin: WorldXY) -> Result<RoomId, GenerationError> {
        let name = self
            .pool
            .get(template_index)
            .map(|t| t.name().to_string())
            .ok_or(GenerationError::TemplateOutOfRange(template_index))?;

        let area = self.areas.coord_for(origin);
        let room = self.graph.new_room(area, true);
        self.events.push(GenEvent::RoomCreated { room, area });
        let new_doors = self.draw_template(template_index, origin, room)?;
        self.register_room(area, room, &new_doors);
        info!("seeded {room} from '{name}' at {origin}");

        if self.phase == Phase::Seed {
            self.phase = Phase::Resolve;
        }
        self.classify_doors()?;
        Ok(room)
    }

    /// Resolves the frontier door at `door` right away, regardless of the view.
    pub fn resolve_door(&mut self, door: WorldXY) -> Result<Resolution, GenerationError> {
        let owner = match self.world.get(door) {
            None => return Err(GridError::Unclaimed(door).into()),
            Some(cell) if cell.tile != TileKind::Door => return Err(GridError::NotADoor(door).into()),
            Some(cell) => cell.room,
        };

        let under_cap = self.config.max_rooms.map_or(true, |max| self.template_rooms < max);
        if under_cap {
            if let Some((template_index, template_door)) = self.find_fit(door) {
                let room = self.place_template(template_index, template_door, door, owner)?;
                return Ok(Resolution::Placed(room));
            }
        }

        self.fall_back(door, owner)?;
        Ok(Resolution::Fallback)
    }

    fn start_pass(&mut self, view: &ViewBounds) {
        let focus = self.areas.coord_for(view.center());
        let reach = view.expanded(self.config.view_margin);
        let queue: VecDeque<WorldXY> = self
            .areas
            .pending_in_block(focus)
            .into_iter()
            .map(|(_, door)| door)
            .filter(|door| reach.contains(*door))
            .collect();
        trace!("resolve pass over {} doors around area {focus}", queue.len());
        self.pass = ResolvePass {
            queue,
            placed: 0,
            started: true,
        };
    }

    fn process_frontier(&mut self, door: WorldXY, view: &ViewBounds) -> Result<Step, GenerationError> {
        if self.world.tile_at(door) != TileKind::Door {
            self.areas.remove_pending(door);
            trace!("dropping stale frontier door {door}");
            return Ok(Step::Stale(door));
        }
        if !view.expanded(self.config.view_margin).contains(door) {
            trace!("deferring frontier door {door} outside the view");
            return Ok(Step::Deferred(door));
        }

        match self.resolve_door(door)? {
            Resolution::Placed(room) => {
                self.pass.placed += 1;
                Ok(Step::Placed { door, room })
            }
            Resolution::Fallback => Ok(Step::Fallback(door)),
        }
    }

    fn next_pocket(&mut self) -> Result<Option<RoomId>, GenerationError> {
        while let Some(cells) = self.pockets.pop_front() {
            if let Some(room) = self.materialize_pocket(&cells)? {
                if self.pockets.is_empty() {
                    self.phase = Phase::Resolve;
                }
                return Ok(Some(room));
            }
        }
        self.phase = Phase::Resolve;
        Ok(None)
    }

    /// Files a freshly drawn room and its new doors under `area`.
    fn register_room(&mut self, area: AreaXY, room: RoomId, new_doors: &[WorldXY]) {
        let map_area = self.areas.area_mut(area);
        map_area.add_room(room);
        for door in new_doors {
            map_area.push_pending(*door);
        }
    }

    /// Turns a door with nowhere to grow into floor of its own room.
    fn fall_back(&mut self, door: WorldXY, owner: RoomId) -> Result<(), GenerationError> {
        self.world.reclassify(door, TileKind::Floor)?;
        self.graph.room_mut(owner)?.resolve_door(door, TileKind::Floor);
        self.events.push(GenEvent::TileReclassified {
            xy: door,
            tile: TileKind::Floor,
        });
        self.areas.remove_pending(door);
        debug!("no template fits {door}, opened it as floor of {owner}");
        self.classify_doors()
    }

    /// Adds an edge and records what changed. `false` when already linked.
    fn link(&mut self, a: RoomId, b: RoomId) -> Result<bool, GenerationError> {
        match self.graph.add_room_links(a, b)? {
            LinkOutcome::AlreadyLinked => Ok(false),
            LinkOutcome::Linked { relaxed } => {
                debug!("linked {a} and {b}");
                self.events.push(GenEvent::RoomsLinked(a, b));
                for room in relaxed {
                    if let Some(distance) = self.graph.get(room).and_then(|r| r.distance()) {
                        self.events.push(GenEvent::DistanceChanged { room, distance });
                    }
                }
                Ok(true)
            }
        }
    }
}
