use crate::material::MaterialId;
use crate::math::Vector;
use crate::vertex::Vertex;

/// A set of vertices forming triangles, plus the material it draws with.
///
/// Transforms work directly on the in-memory vertex array; the renderer
/// re-uploads every frame, so there is nothing to invalidate.
pub struct Triangle {
    vertices: Vec<Vertex>,
    material: MaterialId,
    current_scale: f32,
}

impl Triangle {
    pub fn new(vertices: Vec<Vertex>, material: MaterialId) -> Self {
        debug_assert!(!vertices.is_empty(), "triangle with no vertices");
        Self {
            vertices,
            material,
            current_scale: 1.0,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Accumulated scale factor applied via [`Triangle::scale`].
    pub fn current_scale(&self) -> f32 {
        self.current_scale
    }

    pub fn min_bounds(&self) -> Vector {
        self.vertices
            .iter()
            .skip(1)
            .fold(self.vertices[0].position, |min, v| min.min(v.position))
    }

    pub fn max_bounds(&self) -> Vector {
        self.vertices
            .iter()
            .skip(1)
            .fold(self.vertices[0].position, |max, v| max.max(v.position))
    }

    pub fn center(&self) -> Vector {
        (self.min_bounds() + self.max_bounds()) / 2.0
    }

    pub fn translate(&mut self, delta: Vector) {
        for vertex in &mut self.vertices {
            vertex.position += delta;
        }
    }

    /// Scales about the center, so the triangle does not drift while
    /// growing or shrinking.
    pub fn scale(&mut self, factor: f32) {
        let center = self.center();
        self.translate(-center);
        for vertex in &mut self.vertices {
            vertex.position *= factor;
        }
        self.translate(center);
        self.current_scale *= factor;
    }

    /// Rotates by `angle` radians in the XY plane, about the center.
    pub fn rotate(&mut self, angle: f32) {
        let center = self.center();
        self.translate(-center);
        for vertex in &mut self.vertices {
            let p = vertex.position;
            let heading = p.angle() + angle;
            let distance = Vector::new2(p.x, p.y).magnitude();
            vertex.position =
                Vector::new(heading.cos() * distance, heading.sin() * distance, p.z);
        }
        self.translate(center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::Color;
    use core::f32::consts::FRAC_PI_2;

    fn assert_close(a: Vector, b: Vector) {
        assert!((a - b).magnitude() < 1e-5, "{a:?} != {b:?}");
    }

    fn unit_triangle() -> Triangle {
        Triangle::new(
            vec![
                Vertex::new(Vector::new2(-1.0, -1.0), Color::WHITE),
                Vertex::new(Vector::new2(1.0, -1.0), Color::WHITE),
                Vertex::new(Vector::new2(0.0, 1.0), Color::WHITE),
            ],
            MaterialId(0),
        )
    }

    #[test]
    fn bounds_and_center() {
        let tri = unit_triangle();
        assert_eq!(tri.min_bounds(), Vector::new2(-1.0, -1.0));
        assert_eq!(tri.max_bounds(), Vector::new2(1.0, 1.0));
        assert_eq!(tri.center(), Vector::zero());
    }

    #[test]
    fn translate_shifts_bounds() {
        let mut tri = unit_triangle();
        tri.translate(Vector::new2(0.5, -0.25));
        assert_close(tri.min_bounds(), Vector::new2(-0.5, -1.25));
        assert_close(tri.max_bounds(), Vector::new2(1.5, 0.75));
    }

    #[test]
    fn scale_keeps_center_and_tracks_factor() {
        let mut tri = unit_triangle();
        tri.translate(Vector::new2(0.3, 0.7));
        let center = tri.center();

        tri.scale(2.0);
        assert_close(tri.center(), center);
        assert_eq!(tri.current_scale(), 2.0);
        // Width doubled from 2 to 4.
        assert_close(
            tri.max_bounds() - tri.min_bounds(),
            Vector::new2(4.0, 4.0),
        );

        tri.scale(0.5);
        assert_eq!(tri.current_scale(), 1.0);
    }

    #[test]
    fn rotate_quarter_turn() {
        let mut tri = unit_triangle();
        tri.rotate(FRAC_PI_2);
        // (1, -1) about the origin becomes (1, 1).
        assert_close(tri.vertices()[1].position, Vector::new2(1.0, 1.0));
        // (0, 1) becomes (-1, 0).
        assert_close(tri.vertices()[2].position, Vector::new2(-1.0, 0.0));
    }

    #[test]
    fn rotate_keeps_distances_to_pivot() {
        let mut tri = unit_triangle();
        tri.translate(Vector::new2(-0.4, 0.6));
        // The pivot is the bounding-box center at the time of the call.
        let pivot = tri.center();
        let distances: Vec<f32> = tri
            .vertices()
            .iter()
            .map(|v| (v.position - pivot).magnitude())
            .collect();

        tri.rotate(1.2345);

        for (vertex, before) in tri.vertices().iter().zip(distances) {
            let after = (vertex.position - pivot).magnitude();
            assert!((after - before).abs() < 1e-5);
        }
    }
}
