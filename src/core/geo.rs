// src/core/geo.rs
//! Bounding boxes, the implicit quadrant grid over them, and search radii.
//!
//! All arithmetic is planar: cell bounds are linear interpolations of the root
//! box and spans are converted to meters with the small-angle arc length. Good
//! enough for regional boxes; distortion grows towards the poles.

use std::f64::consts::PI;

use crate::config::consts::EARTH_RADIUS_M;
use crate::error::GeoError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Arc length in meters of `span_deg` degrees on a great circle.
pub fn arc_length_m(span_deg: f64) -> f64 {
    span_deg / 360.0 * (2.0 * PI * EARTH_RADIUS_M)
}

/// A validated `south < north`, `west < east` box. No antimeridian crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    north: f64,
    east: f64,
    south: f64,
    west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, east: f64, south: f64, west: f64) -> Result<Self, GeoError> {
        for (side, v) in [("north", north), ("east", east), ("south", south), ("west", west)] {
            if !v.is_finite() {
                return Err(GeoError::NonFinite { side });
            }
        }
        for lat in [north, south] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(GeoError::LatitudeRange(lat));
            }
        }
        for lng in [east, west] {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(GeoError::LongitudeRange(lng));
            }
        }
        if south >= north {
            return Err(GeoError::LatitudeOrder { south, north });
        }
        if west >= east {
            return Err(GeoError::LongitudeOrder { west, east });
        }
        Ok(Self { north, east, south, west })
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn south(&self) -> f64 {
        self.south
    }

    pub fn west(&self) -> f64 {
        self.west
    }

    pub fn center(&self) -> LatLng {
        LatLng {
            lat: self.south + 0.5 * (self.north - self.south),
            lng: self.west + 0.5 * (self.east - self.west),
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn lat_span_m(&self) -> f64 {
        arc_length_m(self.north - self.south)
    }

    pub fn lng_span_m(&self) -> f64 {
        arc_length_m(self.east - self.west)
    }

    /// Radius of the circle queried for the whole box: the longer span over √2.
    pub fn search_radius(&self) -> f64 {
        self.lat_span_m().max(self.lng_span_m()) / 2f64.sqrt()
    }

    /// Bounds of `cell`, interpolated inside this box.
    pub fn cell_bounds(&self, cell: Cell) -> BoundingBox {
        let side = cell.side() as f64;
        let lat_step = (self.north - self.south) / side;
        let lng_step = (self.east - self.west) / side;
        let (row, col) = (cell.row as f64, cell.col as f64);
        BoundingBox {
            south: self.south + lat_step * row,
            north: self.south + lat_step * (row + 1.0),
            west: self.west + lng_step * col,
            east: self.west + lng_step * (col + 1.0),
        }
    }
}

/// One cell of the `2^depth x 2^depth` grid. Row 0 is the southern band,
/// col 0 the western one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub depth: u32,
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const ROOT: Cell = Cell { depth: 0, row: 0, col: 0 };

    /// Cells per axis at this depth.
    pub fn side(self) -> u32 {
        1 << self.depth
    }

    /// The four quadrants one level down, in row-major order.
    pub fn children(self) -> [Cell; 4] {
        let (depth, r, c) = (self.depth + 1, self.row * 2, self.col * 2);
        [
            Cell { depth, row: r, col: c },
            Cell { depth, row: r, col: c + 1 },
            Cell { depth, row: r + 1, col: c },
            Cell { depth, row: r + 1, col: c + 1 },
        ]
    }

    /// Every cell at `depth`, south to north, then west to east.
    pub fn grid(depth: u32) -> impl Iterator<Item = Cell> {
        let side = 1u32 << depth;
        (0..side).flat_map(move |row| (0..side).map(move |col| Cell { depth, row, col }))
    }

    /// Search radius for this cell given the root radius.
    pub fn radius(self, root_radius: f64) -> f64 {
        root_radius / self.side() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> BoundingBox {
        BoundingBox::new(1.0, 1.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn radius_regression_one_degree_box() {
        let expected = (PI / 180.0 * 2.0 * PI * 6_379_000.0 / (2.0 * PI)) / 2f64.sqrt();
        let got = unit_box().search_radius();
        assert!((got - expected).abs() < 1e-6, "{got} vs {expected}");
    }

    #[test]
    fn radius_uses_longer_span() {
        let wide = BoundingBox::new(1.0, 4.0, 0.0, 0.0).unwrap();
        assert!((wide.search_radius() - arc_length_m(4.0) / 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn rejects_inverted_and_out_of_range_boxes() {
        assert!(matches!(BoundingBox::new(0.0, 1.0, 1.0, 0.0), Err(GeoError::LatitudeOrder { .. })));
        assert!(matches!(BoundingBox::new(1.0, 0.0, 0.0, 1.0), Err(GeoError::LongitudeOrder { .. })));
        assert!(matches!(BoundingBox::new(91.0, 1.0, 0.0, 0.0), Err(GeoError::LatitudeRange(_))));
        assert!(matches!(BoundingBox::new(1.0, 181.0, 0.0, 0.0), Err(GeoError::LongitudeRange(_))));
        assert!(matches!(BoundingBox::new(f64::NAN, 1.0, 0.0, 0.0), Err(GeoError::NonFinite { side: "north" })));
    }

    #[test]
    fn cell_bounds_interpolate_inside_root() {
        let root = BoundingBox::new(52.0, 14.0, 50.0, 10.0).unwrap();
        let b = root.cell_bounds(Cell { depth: 1, row: 1, col: 0 });
        assert_eq!((b.south(), b.north(), b.west(), b.east()), (51.0, 52.0, 10.0, 12.0));
        assert_eq!(b.center(), LatLng { lat: 51.5, lng: 11.0 });
    }

    #[test]
    fn children_tile_their_parent() {
        let root = unit_box();
        let parent = Cell { depth: 2, row: 3, col: 1 };
        let pb = root.cell_bounds(parent);
        for child in parent.children() {
            assert_eq!(child.depth, 3);
            let cb = root.cell_bounds(child);
            assert!(pb.contains(cb.center()));
            assert!(((cb.north() - cb.south()) * 2.0 - (pb.north() - pb.south())).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_is_row_major_and_complete() {
        let cells: Vec<Cell> = Cell::grid(2).collect();
        assert_eq!(cells.len(), 16);
        assert_eq!(cells[1], Cell { depth: 2, row: 0, col: 1 });
        assert_eq!(cells[4], Cell { depth: 2, row: 1, col: 0 });
        let mut sorted = cells.clone();
        sorted.sort();
        assert_eq!(sorted, cells);
    }

    #[test]
    fn cell_radius_halves_per_depth() {
        assert_eq!(Cell { depth: 3, row: 0, col: 0 }.radius(800.0), 100.0);
        assert_eq!(Cell::ROOT.radius(800.0), 800.0);
    }
}
