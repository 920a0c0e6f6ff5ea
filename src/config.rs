use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Generation and display options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Side of a square area, in cells.
    pub area_size: i32,
    /// World-space width of one cell.
    pub tile_size: f32,
    /// Doors this many cells outside the view are still resolved.
    pub view_margin: i32,
    /// Backfill enclosed empty pockets once growth stalls.
    pub calculate_new_rooms: bool,
    pub show_links: bool,
    pub show_distance: bool,
    /// Fixed seed for reproducible worlds; drawn from entropy when absent.
    pub seed: Option<u64>,
    /// Stop placing template rooms after this many. Fallbacks and pockets still run.
    pub max_rooms: Option<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            area_size: 10,
            tile_size: 1.0,
            view_margin: 1,
            calculate_new_rooms: true,
            show_links: true,
            show_distance: false,
            seed: None,
            max_rooms: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn toggle_show_links(&mut self) -> bool {
        self.show_links = !self.show_links;
        self.show_links
    }

    pub fn toggle_show_distance(&mut self) -> bool {
        self.show_distance = !self.show_distance;
        self.show_distance
    }

    pub fn toggle_calculate_new_rooms(&mut self) -> bool {
        self.calculate_new_rooms = !self.calculate_new_rooms;
        self.calculate_new_rooms
    }
}
