use crate::world::WorldXY;

/// An inclusive rectangle of world cells, typically what the camera can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewBounds {
    pub min: WorldXY,
    pub max: WorldXY,
}

impl ViewBounds {
    /// Builds bounds from any two opposite corners.
    pub fn new(a: WorldXY, b: WorldXY) -> Self {
        Self {
            min: WorldXY::new(a.x.min(b.x), a.y.min(b.y)),
            max: WorldXY::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// A square of `2 * radius + 1` cells on a side.
    pub fn around(center: WorldXY, radius: i32) -> Self {
        Self::new(center.offset(-radius, -radius), center.offset(radius, radius))
    }

    #[inline]
    pub fn contains(&self, xy: WorldXY) -> bool {
        xy.x >= self.min.x && xy.x <= self.max.x && xy.y >= self.min.y && xy.y <= self.max.y
    }

    /// True for cells on the outermost ring of the rectangle.
    #[inline]
    pub fn on_edge(&self, xy: WorldXY) -> bool {
        self.contains(xy)
            && (xy.x == self.min.x || xy.x == self.max.x || xy.y == self.min.y || xy.y == self.max.y)
    }

    pub fn expanded(&self, margin: i32) -> Self {
        Self::new(self.min.offset(-margin, -margin), self.max.offset(margin, margin))
    }

    /// The middle cell, rounding toward `min`.
    pub fn center(&self) -> WorldXY {
        WorldXY::new(
            self.min.x + (self.max.x - self.min.x) / 2,
            self.min.y + (self.max.y - self.min.y) / 2,
        )
    }

    /// Every cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = WorldXY> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| WorldXY::new(x, y)))
    }
}

/// A camera in world space: a center point and half the visible width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: [f32; 2],
    pub half_extent: [f32; 2],
}

impl Viewport {
    pub fn new(center: [f32; 2], half_extent: [f32; 2]) -> Self {
        Self { center, half_extent }
    }

    /// Cells touched by the viewport when each cell is `tile_size` wide.
    pub fn bounds(&self, tile_size: f32) -> ViewBounds {
        let min = [
            self.center[0] - self.half_extent[0],
            self.center[1] - self.half_extent[1],
        ];
        let max = [
            self.center[0] + self.half_extent[0],
            self.center[1] + self.half_extent[1],
        ];
        ViewBounds::new(
            WorldXY::from_world_position(min, tile_size),
            WorldXY::from_world_position(max, tile_size),
        )
    }

    pub fn focus_cell(&self, tile_size: f32) -> WorldXY {
        WorldXY::from_world_position(self.center, tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_and_margins() {
        let bounds = ViewBounds::around(WorldXY::ORIGIN, 2);
        assert!(bounds.on_edge(WorldXY::new(-2, 0)));
        assert!(bounds.on_edge(WorldXY::new(1, 2)));
        assert!(!bounds.on_edge(WorldXY::new(1, 1)));
        assert!(!bounds.contains(WorldXY::new(3, 0)));
        assert!(bounds.expanded(1).contains(WorldXY::new(3, 0)));
        assert_eq!(bounds.cells().count(), 25);
        assert_eq!(bounds.cells().next(), Some(WorldXY::new(-2, -2)));
    }

    #[test]
    fn viewport_covers_partial_cells() {
        let view = Viewport::new([0.0, 0.0], [2.5, 1.0]);
        let bounds = view.bounds(1.0);
        assert_eq!(bounds.min, WorldXY::new(-3, -1));
        assert_eq!(bounds.max, WorldXY::new(2, 1));
        assert_eq!(view.focus_cell(1.0), WorldXY::ORIGIN);
    }
}
