//! Unit geometry for the three primitive shapes the scene uses. Entity
//! dimensions are applied through the instance model matrix.

use crate::vertex::MeshVertex;

const CYLINDER_SEGMENTS: u16 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// 1 x 1 x 1 cube centred on the origin.
    Box,
    /// Radius 0.5, height 1, centred on the origin, axis along Y.
    Cylinder,
    /// 1 x 1 quad in the XY plane facing +Z.
    Plane,
}

impl ShapeKind {
    pub const ALL: &'static [ShapeKind] = &[ShapeKind::Box, ShapeKind::Cylinder, ShapeKind::Plane];

    pub fn index(self) -> usize {
        match self {
            Self::Box => 0,
            Self::Cylinder => 1,
            Self::Plane => 2,
        }
    }

    pub fn mesh(self) -> MeshData {
        match self {
            Self::Box => box_mesh(),
            Self::Cylinder => cylinder_mesh(CYLINDER_SEGMENTS),
            Self::Plane => plane_mesh(),
        }
    }
}

pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

fn v(position: [f32; 3], normal: [f32; 3]) -> MeshVertex {
    MeshVertex { position, normal }
}

fn box_mesh() -> MeshData {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        v([-p, -p,  p], [0.0, 0.0, 1.0]),
        v([ p, -p,  p], [0.0, 0.0, 1.0]),
        v([ p,  p,  p], [0.0, 0.0, 1.0]),
        v([-p,  p,  p], [0.0, 0.0, 1.0]),
        // -Z face
        v([ p, -p, -p], [0.0, 0.0, -1.0]),
        v([-p, -p, -p], [0.0, 0.0, -1.0]),
        v([-p,  p, -p], [0.0, 0.0, -1.0]),
        v([ p,  p, -p], [0.0, 0.0, -1.0]),
        // +X face
        v([ p, -p,  p], [1.0, 0.0, 0.0]),
        v([ p, -p, -p], [1.0, 0.0, 0.0]),
        v([ p,  p, -p], [1.0, 0.0, 0.0]),
        v([ p,  p,  p], [1.0, 0.0, 0.0]),
        // -X face
        v([-p, -p, -p], [-1.0, 0.0, 0.0]),
        v([-p, -p,  p], [-1.0, 0.0, 0.0]),
        v([-p,  p,  p], [-1.0, 0.0, 0.0]),
        v([-p,  p, -p], [-1.0, 0.0, 0.0]),
        // +Y face
        v([-p,  p,  p], [0.0, 1.0, 0.0]),
        v([ p,  p,  p], [0.0, 1.0, 0.0]),
        v([ p,  p, -p], [0.0, 1.0, 0.0]),
        v([-p,  p, -p], [0.0, 1.0, 0.0]),
        // -Y face
        v([-p, -p, -p], [0.0, -1.0, 0.0]),
        v([ p, -p, -p], [0.0, -1.0, 0.0]),
        v([ p, -p,  p], [0.0, -1.0, 0.0]),
        v([-p, -p,  p], [0.0, -1.0, 0.0]),
    ];
    let indices = (0..6u16)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();
    MeshData { vertices, indices }
}

fn cylinder_mesh(segments: u16) -> MeshData {
    let radius = 0.5_f32;
    let half_h = 0.5_f32;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    let ring = |i: u16| {
        let theta = i as f32 / segments as f32 * std::f32::consts::TAU;
        (theta.sin(), theta.cos())
    };

    // Side: a bottom/top pair per ring step, the seam duplicated.
    for i in 0..=segments {
        let (s, c) = ring(i);
        vertices.push(v([s * radius, -half_h, c * radius], [s, 0.0, c]));
        vertices.push(v([s * radius, half_h, c * radius], [s, 0.0, c]));
    }
    for i in 0..segments {
        let b0 = i * 2;
        let t0 = b0 + 1;
        let b1 = b0 + 2;
        let t1 = b0 + 3;
        indices.extend_from_slice(&[b0, b1, t1, t1, t0, b0]);
    }

    // Caps
    for (y, ny) in [(half_h, 1.0_f32), (-half_h, -1.0_f32)] {
        let center = vertices.len() as u16;
        vertices.push(v([0.0, y, 0.0], [0.0, ny, 0.0]));
        for i in 0..segments {
            let (s, c) = ring(i);
            vertices.push(v([s * radius, y, c * radius], [0.0, ny, 0.0]));
        }
        for i in 0..segments {
            let a = center + 1 + i;
            let b = center + 1 + (i + 1) % segments;
            if ny > 0.0 {
                indices.extend_from_slice(&[center, a, b]);
            } else {
                indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    MeshData { vertices, indices }
}

fn plane_mesh() -> MeshData {
    let p = 0.5_f32;
    let n = [0.0, 0.0, 1.0];
    MeshData {
        vertices: vec![
            v([-p, -p, 0.0], n),
            v([p, -p, 0.0], n),
            v([p, p, 0.0], n),
            v([-p, p, 0.0], n),
        ],
        indices: vec![0, 1, 2, 2, 3, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn assert_outward_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from(mesh.vertices[tri[0] as usize].position);
            let b = Vec3::from(mesh.vertices[tri[1] as usize].position);
            let c = Vec3::from(mesh.vertices[tri[2] as usize].position);
            let face_normal = (b - a).cross(c - a);
            let vertex_normal = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(
                face_normal.dot(vertex_normal) > 0.0,
                "triangle {tri:?} winds against its normal"
            );
        }
    }

    #[test]
    fn every_shape_indexes_in_bounds() {
        for &shape in ShapeKind::ALL {
            let mesh = shape.mesh();
            assert_eq!(mesh.indices.len() % 3, 0);
            assert!(mesh
                .indices
                .iter()
                .all(|&i| (i as usize) < mesh.vertices.len()));
        }
    }

    #[test]
    fn every_shape_winds_counter_clockwise() {
        for &shape in ShapeKind::ALL {
            assert_outward_winding(&shape.mesh());
        }
    }

    #[test]
    fn unit_shapes_fit_unit_bounds() {
        for &shape in ShapeKind::ALL {
            for vertex in shape.mesh().vertices {
                assert!(vertex.position.iter().all(|c| c.abs() <= 0.5 + 1e-6));
            }
        }
    }

    #[test]
    fn shape_indices_are_distinct() {
        let mut seen: Vec<usize> = ShapeKind::ALL.iter().map(|s| s.index()).collect();
        seen.dedup();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
