use std::ops::{Index, IndexMut};

/// A coordinate local to a [`TileMap`], `x` growing right and `y` growing down.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct LocalXY {
    pub x: usize,
    pub y: usize,
}

impl LocalXY {
    #[inline]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for LocalXY {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// Dense, row-major storage for a `width` x `height` rectangle of tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> TileMap<T> where T: Copy {
    #[inline]
    pub fn new(width: usize, height: usize, default: T) -> TileMap<T> {
        TileMap {
            width,
            height,
            data: vec![default; width * height],
        }
    }

    /// Returns the tile at `(x, y)`, or `None` when the coordinate lies outside the map.
    /// Signed so callers can probe neighbors of edge tiles without underflow.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> Option<T> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.data[self.linear_index(LocalXY::new(x as usize, y as usize))])
    }

    /// A copy of this map turned 90° clockwise. The new width is the old height.
    pub fn rotated_cw(&self) -> TileMap<T> {
        let mut data = Vec::with_capacity(self.data.len());
        for ny in 0..self.width {
            for nx in 0..self.height {
                data.push(self[LocalXY::new(ny, self.height - 1 - nx)]);
            }
        }
        TileMap {
            width: self.height,
            height: self.width,
            data,
        }
    }
}

impl<T> TileMap<T> {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn linear_index(&self, xy: LocalXY) -> usize {
        debug_assert!(xy.x < self.width && xy.y < self.height, "{xy:?} outside {}x{}", self.width, self.height);
        xy.y * self.width + xy.x
    }

    /// Iterates every coordinate in row-major order (all of row 0, then row 1, ...).
    pub fn coords(&self) -> impl Iterator<Item = LocalXY> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| LocalXY::new(x, y)))
    }

    /// Iterates coordinates paired with their tiles, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (LocalXY, &T)> + '_ {
        self.coords().zip(self.data.iter())
    }
}

impl<T> Index<LocalXY> for TileMap<T> {
    type Output = T;
    fn index(&self, index: LocalXY) -> &T {
        &self.data[self.linear_index(index)]
    }
}

impl<T> IndexMut<LocalXY> for TileMap<T> {
    fn index_mut(&mut self, index: LocalXY) -> &mut T {
        let idx = self.linear_index(index);
        &mut self.data[idx]
    }
}
