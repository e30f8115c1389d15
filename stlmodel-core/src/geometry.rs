/// Geometry primitives shared by the decoder and the model
use nalgebra::{Point3, Vector3};

/// One decoded STL facet: face normal, three corners and the attribute word
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleRecord {
    /// Face normal as stored in the file. Not renormalized, may be zero.
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
    /// Opaque per-facet attribute, usually zero.
    pub attribute: u16,
}

impl TriangleRecord {
    pub fn new(normal: Vector3<f32>, vertices: [Point3<f32>; 3], attribute: u16) -> Self {
        Self {
            normal,
            vertices,
            attribute,
        }
    }
}

/// Axis-aligned bounds stored as `[min, max]` per axis.
///
/// Every accumulator starts at `[0, 0]` rather than at +/- infinity, so the
/// box always contains the origin. A mesh that lives entirely at `x > 5`
/// still reports `x = [0, max]`. Downstream camera placement relies on this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: [f32; 2],
    pub y: [f32; 2],
    pub z: [f32; 2],
}

impl Bounds {
    /// The zero-seeded starting box.
    pub const ZERO: Bounds = Bounds {
        x: [0.0, 0.0],
        y: [0.0, 0.0],
        z: [0.0, 0.0],
    };

    pub fn new() -> Self {
        Self::ZERO
    }

    /// Grow the box to contain one point.
    ///
    /// A NaN coordinate turns both ends of its axis into NaN, and they stay
    /// NaN for the rest of the accumulation.
    pub fn include(&mut self, point: [f32; 3]) {
        let [px, py, pz] = point;

        self.x[0] = nan_min(self.x[0], px);
        self.x[1] = nan_max(self.x[1], px);

        self.y[0] = nan_min(self.y[0], py);
        self.y[1] = nan_max(self.y[1], py);

        self.z[0] = nan_min(self.z[0], pz);
        self.z[1] = nan_max(self.z[1], pz);
    }

    /// Compute bounds over a flat `[x, y, z, x, y, z, ...]` buffer in one pass.
    ///
    /// Uses the same accumulator as [`Bounds::include`], so feeding the same
    /// points either way gives bit-identical results. A trailing partial
    /// vertex is ignored.
    pub fn from_vertices(vertices: &[f32]) -> Self {
        let mut bounds = Self::ZERO;
        for v in vertices.chunks_exact(3) {
            bounds.include([v[0], v[1], v[2]]);
        }
        bounds
    }

    pub fn min(&self) -> Point3<f32> {
        Point3::new(self.x[0], self.y[0], self.z[0])
    }

    pub fn max(&self) -> Point3<f32> {
        Point3::new(self.x[1], self.y[1], self.z[1])
    }

    /// Midpoint of the box. This is not the area-weighted mesh centroid.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.x[0] + self.x[1]) / 2.0,
            (self.y[0] + self.y[1]) / 2.0,
            (self.z[0] + self.z[1]) / 2.0,
        )
    }

    /// Edge lengths along each axis
    pub fn extent(&self) -> Vector3<f32> {
        self.max() - self.min()
    }
}

fn nan_min(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        f32::NAN
    } else {
        a.min(b)
    }
}

fn nan_max(a: f32, b: f32) -> f32 {
    if a.is_nan() || b.is_nan() {
        f32::NAN
    } else {
        a.max(b)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_seeded() {
        let mut bounds = Bounds::new();
        bounds.include([2.0, 3.0, 4.0]);
        // Origin stays inside even though no point touches it
        assert_eq!(bounds.x, [0.0, 2.0]);
        assert_eq!(bounds.y, [0.0, 3.0]);
        assert_eq!(bounds.z, [0.0, 4.0]);
    }

    #[test]
    fn test_negative_points() {
        let mut bounds = Bounds::new();
        bounds.include([-1.0, -2.0, 0.5]);
        bounds.include([-3.0, 1.0, -0.5]);
        assert_eq!(bounds.x, [-3.0, 0.0]);
        assert_eq!(bounds.y, [-2.0, 1.0]);
        assert_eq!(bounds.z, [-0.5, 0.5]);
    }

    #[test]
    fn test_from_vertices_matches_include() {
        let flat = [1.5, -2.0, 3.0, -4.25, 0.0, 7.0, 0.1, 9.0, -0.3];
        let mut incremental = Bounds::new();
        for v in flat.chunks_exact(3) {
            incremental.include([v[0], v[1], v[2]]);
        }
        assert_eq!(Bounds::from_vertices(&flat), incremental);
    }

    #[test]
    fn test_from_vertices_ignores_partial_tail() {
        let bounds = Bounds::from_vertices(&[1.0, 1.0, 1.0, 50.0]);
        assert_eq!(bounds.x, [0.0, 1.0]);
    }

    #[test]
    fn test_nan_poisons_axis() {
        let mut bounds = Bounds::new();
        bounds.include([1.0, 2.0, 3.0]);
        bounds.include([f32::NAN, -1.0, 0.5]);
        bounds.include([3.0, 4.0, -2.0]);

        assert!(bounds.x[0].is_nan());
        assert!(bounds.x[1].is_nan());
        assert_eq!(bounds.y, [-1.0, 4.0]);
        assert_eq!(bounds.z, [-2.0, 3.0]);
        assert!(bounds.center().x.is_nan());

        let flat = [1.0, 2.0, 3.0, f32::NAN, -1.0, 0.5, 3.0, 4.0, -2.0];
        let full = Bounds::from_vertices(&flat);
        assert!(full.x[0].is_nan() && full.x[1].is_nan());
        assert_eq!(full.y, bounds.y);
        assert_eq!(full.z, bounds.z);
    }

    #[test]
    fn test_center_and_extent() {
        let bounds = Bounds {
            x: [-1.0, 3.0],
            y: [0.0, 1.0],
            z: [-2.0, -2.0],
        };
        let center = bounds.center();
        assert_relative_eq!(center.x, 1.0);
        assert_relative_eq!(center.y, 0.5);
        assert_relative_eq!(center.z, -2.0);
        assert_relative_eq!(bounds.extent(), Vector3::new(4.0, 1.0, 0.0));
    }

    #[test]
    fn test_empty_center_is_origin() {
        assert_eq!(Bounds::from_vertices(&[]).center(), Point3::origin());
    }
}
