#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod area;
pub mod config;
pub mod error;
pub mod generator;
pub mod rng;
pub mod room_graph;
pub mod session;
pub mod template;
pub mod tile_map;
pub mod view;
pub mod world;

pub use crate::area::{AreaIndex, AreaXY, MapArea};
pub use crate::config::GeneratorConfig;
pub use crate::error::{ConfigError, GenerationError, GraphError, GridError, TemplateError};
pub use crate::generator::{GenEvent, Generator, Resolution, Step};
pub use crate::room_graph::structs::{LinkOutcome, RoomGraph, RoomId, RuntimeRoom};
pub use crate::session::{Achievement, AchievementSink, NullPresenter, Presenter, Session};
pub use crate::template::{RoomTemplate, TemplatePool, TileKind};
pub use crate::view::{ViewBounds, Viewport};
pub use crate::world::{WorldCell, WorldGrid, WorldXY};

/// Grows a world from `pool` inside `view` until generation goes idle or
/// `max_steps` steps have run.
pub fn grow_rooms(
    pool: TemplatePool,
    config: GeneratorConfig,
    view: &ViewBounds,
    max_steps: usize,
) -> Result<Generator, GenerationError> {
    let mut generator = Generator::new(pool, config)?;
    generator.run(view, max_steps)?;
    Ok(generator)
}
