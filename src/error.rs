use std::path::PathBuf;

use thiserror::Error;

use crate::room_graph::structs::RoomId;
use crate::world::WorldXY;

/// Failures while turning authored text into room templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{name}' has no non-empty lines")]
    Empty { name: String },

    #[error("could not read template source '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Violations of the world grid's claim rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("cell {0} is already claimed")]
    AlreadyClaimed(WorldXY),

    #[error("cell {0} is not a door and cannot be reclassified")]
    NotADoor(WorldXY),

    #[error("cell {0} is not claimed")]
    Unclaimed(WorldXY),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),

    #[error("room {0} cannot be linked to itself")]
    SelfLink(RoomId),
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("the template pool is empty")]
    EmptyPool,

    #[error("template index {0} is out of range")]
    TemplateOutOfRange(usize),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
