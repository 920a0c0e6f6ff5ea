use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;

use crate::error::TemplateError;
use crate::tile_map::{LocalXY, TileMap};

/// What a single cell of a template, or of the world, holds.
///
/// `None` marks cells outside a template's authored shape and, in the world,
/// cells nobody has claimed yet. Doors are never authored: they are floors
/// recognized by the shape of their neighborhood.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    #[default]
    None,
    Floor,
    Wall,
    Door,
}

impl TileKind {
    fn from_char(c: char) -> Self {
        match c {
            ' ' => TileKind::None,
            '.' => TileKind::Floor,
            _ => TileKind::Wall,
        }
    }

    /// Walls and doors both block a door from opening onto them.
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Door)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileKind::None => write!(f, " "),
            TileKind::Floor => write!(f, "."),
            TileKind::Wall => write!(f, "#"),
            TileKind::Door => write!(f, "+"),
        }
    }
}

/// An authored room blueprint, or one of its quarter-turn rotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTemplate {
    name: String,
    quarter_turns: u8,
    tiles: TileMap<TileKind>,
    doors: Vec<LocalXY>,
}

impl RoomTemplate {
    /// Parses an ASCII layout: `' '` is outside the room, `'.'` is floor and
    /// any other character is wall. Lines shorter than the widest one are
    /// padded with `None`; blank lines are dropped.
    pub fn parse(name: &str, text: &str) -> Result<Self, TemplateError> {
        let text = text.replace('\r', "");
        let lines: Vec<Vec<char>> = text
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();

        let height = lines.len();
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(TemplateError::Empty { name: name.to_string() });
        }

        let mut tiles = TileMap::new(width, height, TileKind::None);
        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.iter().enumerate() {
                tiles[LocalXY::new(x, y)] = TileKind::from_char(*c);
            }
        }

        Ok(Self::with_detected_doors(name.to_string(), 0, tiles))
    }

    fn with_detected_doors(name: String, quarter_turns: u8, mut tiles: TileMap<TileKind>) -> Self {
        let doors = detect_doors(&mut tiles);
        Self {
            name,
            quarter_turns,
            tiles,
            doors,
        }
    }

    /// This template turned 90° clockwise. Doors are detected again on the
    /// rotated grid rather than carried over from this one.
    pub fn rotated_cw(&self) -> RoomTemplate {
        let mut base = self.tiles.clone();
        for xy in self.doors.iter() {
            base[*xy] = TileKind::Floor;
        }
        Self::with_detected_doors(self.name.clone(), (self.quarter_turns + 1) % 4, base.rotated_cw())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many clockwise quarter turns separate this variant from the authored layout.
    pub fn quarter_turns(&self) -> u8 {
        self.quarter_turns
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn tiles(&self) -> &TileMap<TileKind> {
        &self.tiles
    }

    #[inline]
    pub fn tile(&self, xy: LocalXY) -> TileKind {
        self.tiles[xy]
    }

    /// Door positions in row-major order.
    pub fn doors(&self) -> &[LocalXY] {
        &self.doors
    }
}

impl fmt::Display for RoomTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            let row: String = (0..self.width())
                .map(|x| self.tile(LocalXY::new(x, y)).to_string())
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

/// Marks door tiles in place and returns their positions.
///
/// A door is a floor tile on the room's outline: walls on both sides along one
/// axis, and along the other axis floor on one side with nothing on the other.
/// Tiles are visited row by row and marked as they are found, so a floor next
/// to a freshly marked door no longer sees a floor neighbor there.
fn detect_doors(tiles: &mut TileMap<TileKind>) -> Vec<LocalXY> {
    let mut doors = Vec::new();
    let coords: Vec<LocalXY> = tiles.coords().collect();

    for xy in coords {
        if tiles[xy] != TileKind::Floor {
            continue;
        }
        let (x, y) = (xy.x as isize, xy.y as isize);
        let at = |dx: isize, dy: isize| tiles.get(x + dx, y + dy).unwrap_or(TileKind::None);
        let up = at(0, -1);
        let down = at(0, 1);
        let left = at(-1, 0);
        let right = at(1, 0);

        if is_door_axis(up, down, left, right) || is_door_axis(left, right, up, down) {
            tiles[xy] = TileKind::Door;
            doors.push(xy);
        }
    }

    doors
}

/// `side_a`/`side_b` must both be walls; `open_a`/`open_b` must be one floor
/// and one empty, in either order.
#[inline]
fn is_door_axis(side_a: TileKind, side_b: TileKind, open_a: TileKind, open_b: TileKind) -> bool {
    side_a == TileKind::Wall
        && side_b == TileKind::Wall
        && matches!(
            (open_a, open_b),
            (TileKind::None, TileKind::Floor) | (TileKind::Floor, TileKind::None)
        )
}

const BUILTIN_ROOMS: [(&str, &str); 4] = [
    ("hall", include_str!("../rooms/hall.txt")),
    ("corridor", include_str!("../rooms/corridor.txt")),
    ("cross", include_str!("../rooms/cross.txt")),
    ("dead_end", include_str!("../rooms/dead_end.txt")),
];

/// Every template the generator may place, rotations included.
///
/// Templates are stored authored-first: each parsed layout is followed by its
/// 90°, 180° and 270° variants. Index 0 is the unrotated first layout, which
/// is what seeds a fresh world.
#[derive(Debug, Clone, Default)]
pub struct TemplatePool {
    templates: Vec<RoomTemplate>,
}

impl TemplatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `(name, text)` pairs in order.
    pub fn from_texts<'a, I>(sources: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut pool = Self::new();
        for (name, text) in sources {
            pool.add(RoomTemplate::parse(name, text)?);
        }
        Ok(pool)
    }

    /// The layouts shipped with the crate, `hall` first.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_texts(BUILTIN_ROOMS)
    }

    /// Parses every `*.txt` file in `dir`, in file name order. The file stem names the template.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let io_err = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                paths.push(path);
            }
        }

        let mut pool = Self::new();
        for path in paths.into_iter().sorted() {
            let text = fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            pool.add(RoomTemplate::parse(&name, &text)?);
        }
        Ok(pool)
    }

    /// Adds `template` followed by its three clockwise rotations.
    pub fn add(&mut self, template: RoomTemplate) {
        let r90 = template.rotated_cw();
        let r180 = r90.rotated_cw();
        let r270 = r180.rotated_cw();
        self.templates.extend([template, r90, r180, r270]);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RoomTemplate> {
        self.templates.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomTemplate> {
        self.templates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doors_of(text: &str) -> Vec<(usize, usize)> {
        RoomTemplate::parse("t", text)
            .expect("valid template")
            .doors()
            .iter()
            .map(|xy| (xy.x, xy.y))
            .collect()
    }

    #[test]
    fn parses_tiles_and_pads_ragged_lines() {
        let template = RoomTemplate::parse("t", "###\r\n#.\n\n#").unwrap();
        assert_eq!((template.width(), template.height()), (3, 3));
        assert_eq!(template.tile(LocalXY::new(1, 1)), TileKind::Floor);
        assert_eq!(template.tile(LocalXY::new(2, 1)), TileKind::None);
        assert_eq!(template.tile(LocalXY::new(0, 2)), TileKind::Wall);
        assert_eq!(template.tile(LocalXY::new(1, 2)), TileKind::None);
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(
            RoomTemplate::parse("blank", "\n\r\n"),
            Err(TemplateError::Empty { .. })
        ));
    }

    #[test]
    fn open_top_of_a_shaft_is_a_door() {
        // the top floor has walls left and right, nothing above and floor below
        assert_eq!(doors_of("#.#\n#.#\n###"), vec![(1, 0)]);
    }

    #[test]
    fn floor_beside_an_open_corner_is_not_a_door() {
        assert!(doors_of("###\n#.#\n#. ").is_empty());
    }

    #[test]
    fn interior_floors_are_not_doors() {
        assert!(doors_of("#####\n#...#\n#...#\n#####").is_empty());
    }

    #[test]
    fn hall_has_one_door_per_side() {
        assert_eq!(
            doors_of("##.##\n#...#\n.....\n#...#\n##.##"),
            vec![(2, 0), (0, 2), (4, 2), (2, 4)]
        );
    }

    #[test]
    fn corridor_ends_are_doors_but_the_tile_after_a_door_is_not() {
        assert_eq!(doors_of("#######\n.......\n#######"), vec![(0, 1), (6, 1)]);
    }

    #[test]
    fn rotation_redetects_doors() {
        let shaft = RoomTemplate::parse("shaft", "#.#\n#.#\n###").unwrap();
        let r90 = shaft.rotated_cw();
        assert_eq!(r90.to_string(), "###\n#.+\n###\n");
        assert_eq!(r90.doors(), &[LocalXY::new(2, 1)]);

        let r180 = r90.rotated_cw();
        assert_eq!(r180.to_string(), "###\n#.#\n#+#\n");
        assert_eq!(r180.quarter_turns(), 2);
    }

    #[test]
    fn four_rotations_restore_the_template() {
        let cross = RoomTemplate::parse("cross", include_str!("../rooms/cross.txt")).unwrap();
        let back = cross.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
        assert_eq!(back.tiles(), cross.tiles());
        assert_eq!(back.doors(), cross.doors());
        assert_eq!(back.quarter_turns(), 0);
    }

    #[test]
    fn pool_stores_rotations_after_each_layout() {
        let pool = TemplatePool::builtin().unwrap();
        assert_eq!(pool.len(), BUILTIN_ROOMS.len() * 4);
        let turns: Vec<u8> = pool.iter().take(5).map(|t| t.quarter_turns()).collect();
        assert_eq!(turns, vec![0, 1, 2, 3, 0]);
        assert_eq!(pool.get(0).map(|t| t.name()), Some("hall"));
        assert!(pool.iter().all(|t| !t.doors().is_empty()));
    }
}
