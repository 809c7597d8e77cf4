//! UV sphere tessellation.
//!
//! Vertices are laid out latitude-major: `slices + 1` rings from the north
//! pole (`phi = 0`) to the south pole (`phi = PI`), each ring holding
//! `stacks` points around the Y axis. Pole rings are full rings of coincident
//! points rather than a single apex vertex, which keeps the index pass a
//! uniform quad grid.

use std::f32::consts::PI;

use thiserror::Error;

use crate::constants::{SPHERE_RADIUS, SPHERE_SLICES, SPHERE_STACKS};

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("sphere needs at least one stack and one slice (stacks: {stacks}, slices: {slices})")]
    EmptyGrid { stacks: u32, slices: u32 },

    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("sphere with {stacks} stacks and {slices} slices has too many vertices for u32 indices")]
    TooManyVertices { stacks: u32, slices: u32 },

    #[error("index {index} at position {position} is outside the vertex range 0..{vertex_count}")]
    IndexOutOfRange {
        index: u32,
        position: usize,
        vertex_count: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// Points per latitude ring.
    pub stacks: u32,
    /// Latitude bands between the poles; there are `slices + 1` rings.
    pub slices: u32,
    pub radius: f32,
}

impl SphereParams {
    pub const fn new(stacks: u32, slices: u32, radius: f32) -> Self {
        Self {
            stacks,
            slices,
            radius,
        }
    }

    fn validate(&self) -> Result<u32, GeometryError> {
        if self.stacks == 0 || self.slices == 0 {
            return Err(GeometryError::EmptyGrid {
                stacks: self.stacks,
                slices: self.slices,
            });
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(self.radius));
        }

        // Indices reach `vertex_count - 1` and scalars are 3x that, both
        // must stay representable.
        self.slices
            .checked_add(1)
            .and_then(|rings| rings.checked_mul(self.stacks))
            .filter(|count| count.checked_mul(3).is_some())
            .ok_or(GeometryError::TooManyVertices {
                stacks: self.stacks,
                slices: self.slices,
            })
    }
}

impl Default for SphereParams {
    fn default() -> Self {
        Self::new(SPHERE_STACKS, SPHERE_SLICES, SPHERE_RADIUS)
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    params: SphereParams,
    vertices: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl SphereMesh {
    pub fn params(&self) -> SphereParams {
        self.params
    }

    pub fn vertices(&self) -> &[[f32; 3]] {
        &self.vertices
    }

    /// Positions as one flat `x, y, z, x, y, z, ...` slice.
    pub fn scalars(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn scalar_count(&self) -> usize {
        self.scalars().len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Builds the vertex and triangle index lists for `params`.
pub fn generate(params: SphereParams) -> Result<SphereMesh, GeometryError> {
    let vertex_count = params.validate()?;
    let vertices = generate_vertices(&params, vertex_count);
    let indices = generate_indices(params.stacks, vertex_count);

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index >= vertex_count)
    {
        return Err(GeometryError::IndexOutOfRange {
            index,
            position,
            vertex_count,
        });
    }

    Ok(SphereMesh {
        params,
        vertices,
        indices,
    })
}

fn generate_vertices(params: &SphereParams, vertex_count: u32) -> Vec<[f32; 3]> {
    let mut vertices = Vec::with_capacity(vertex_count as usize);

    for i in 0..=params.slices {
        let phi = i as f32 * (PI / params.slices as f32);
        let (sin_phi, cos_phi) = phi.sin_cos();

        for j in 0..params.stacks {
            let theta = j as f32 * (PI * 2.0 / params.stacks as f32);
            let (sin_theta, cos_theta) = theta.sin_cos();

            vertices.push([
                params.radius * cos_theta * sin_phi,
                params.radius * cos_phi,
                params.radius * sin_theta * sin_phi,
            ]);
        }
    }

    vertices
}

fn generate_indices(stacks: u32, vertex_count: u32) -> Vec<u32> {
    // Every vertex above the last ring opens one quad towards the ring below.
    let quad_rows = vertex_count - stacks;
    let mut indices = Vec::with_capacity(quad_rows as usize * 6);

    for i in 0..quad_rows {
        if (i + 1) % stacks == 0 {
            // Last point of its ring: stitch the seam back to the ring start.
            let ring_start = i + 1 - stacks;
            let wrap = if i + 1 == vertex_count {
                vertex_count - stacks
            } else {
                i + 1
            };

            indices.extend_from_slice(&[i, ring_start, i + stacks]);
            indices.extend_from_slice(&[ring_start, i + stacks, wrap]);
        } else {
            indices.extend_from_slice(&[i, i + 1, i + stacks]);
            indices.extend_from_slice(&[i + 1, i + stacks, i + stacks + 1]);
        }
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh(stacks: u32, slices: u32, radius: f32) -> SphereMesh {
        generate(SphereParams::new(stacks, slices, radius)).unwrap()
    }

    #[test]
    fn default_sphere_sizes() {
        let mesh = generate(SphereParams::default()).unwrap();

        assert_eq!(mesh.vertex_count(), 930);
        assert_eq!(mesh.scalar_count(), 2790);
        assert_eq!(mesh.scalars().len(), 2790);
        assert_eq!(mesh.index_count(), 5400);
        assert_eq!(mesh.triangle_count(), 1800);
        assert!(mesh.indices().iter().all(|&i| i < 930));
    }

    #[test]
    fn default_sphere_vertices_lie_on_radius() {
        let mesh = generate(SphereParams::default()).unwrap();

        for [x, y, z] in mesh.vertices() {
            let norm = (x * x + y * y + z * z).sqrt();
            assert!((norm - 2.0).abs() < 1e-5, "norm {} off the sphere", norm);
        }
    }

    #[test]
    fn counts_follow_grid_shape() {
        for &(stacks, slices) in &[(3, 2), (8, 5), (17, 11), (30, 30), (64, 1)] {
            let mesh = mesh(stacks, slices, 1.5);
            let vertex_count = ((slices + 1) * stacks) as usize;

            assert_eq!(mesh.vertex_count(), vertex_count);
            assert_eq!(mesh.scalar_count(), 3 * vertex_count);
            assert_eq!(mesh.index_count(), 6 * (vertex_count - stacks as usize));
            assert!(mesh
                .indices()
                .iter()
                .all(|&i| (i as usize) < vertex_count));
        }
    }

    #[test]
    fn vertices_are_latitude_major() {
        let mesh = mesh(4, 2, 1.0);
        let v = mesh.vertices();

        // Whole first ring sits on the north pole.
        for p in &v[0..4] {
            assert!((p[1] - 1.0).abs() < 1e-6);
        }
        // Equator ring walks around the Y axis starting at +X.
        assert!((v[4][0] - 1.0).abs() < 1e-6);
        assert!((v[5][2] - 1.0).abs() < 1e-6);
        assert!((v[6][0] + 1.0).abs() < 1e-6);
        assert!((v[7][2] + 1.0).abs() < 1e-6);
        // Last ring on the south pole.
        for p in &v[8..12] {
            assert!((p[1] + 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn interior_quads_span_adjacent_rings() {
        let stacks = 5;
        let mesh = mesh(stacks, 3, 1.0);
        let indices = mesh.indices();

        // i = 1 is not the last point of its ring.
        assert_eq!(&indices[6..12], &[1, 2, 1 + stacks, 2, 1 + stacks, 2 + stacks]);
    }

    #[test]
    fn seam_wraps_to_next_point() {
        let stacks = 6;
        let mesh = mesh(stacks, 4, 1.0);
        let indices = mesh.indices();
        let vertex_count = mesh.vertex_count() as u32;

        for i in 0..vertex_count - stacks {
            let tri = &indices[(i * 6) as usize..(i * 6 + 6) as usize];
            if (i + 1) % stacks == 0 {
                let ring_start = i + 1 - stacks;
                assert_eq!(&tri[0..3], &[i, ring_start, i + stacks]);
                assert_eq!(&tri[3..5], &[ring_start, i + stacks]);

                let expected = if i + 1 == vertex_count {
                    vertex_count - stacks
                } else {
                    i + 1
                };
                assert_eq!(tri[5], expected);
            }
        }
    }

    #[test]
    fn single_stack_sphere_is_degenerate_but_valid() {
        let mesh = mesh(1, 3, 1.0);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 18);
        assert_eq!(&mesh.indices()[0..6], &[0, 0, 1, 0, 1, 1]);
    }

    #[test]
    fn rejects_empty_grid() {
        assert_eq!(
            generate(SphereParams::new(0, 30, 2.0)).unwrap_err(),
            GeometryError::EmptyGrid {
                stacks: 0,
                slices: 30
            }
        );
        assert!(matches!(
            generate(SphereParams::new(30, 0, 2.0)),
            Err(GeometryError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn rejects_bad_radius() {
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                generate(SphereParams::new(30, 30, radius)),
                Err(GeometryError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn rejects_overflowing_counts() {
        assert_eq!(
            generate(SphereParams::new(u32::MAX, 1, 1.0)).unwrap_err(),
            GeometryError::TooManyVertices {
                stacks: u32::MAX,
                slices: 1
            }
        );
        assert!(matches!(
            generate(SphereParams::new(2, u32::MAX, 1.0)),
            Err(GeometryError::TooManyVertices { .. })
        ));
    }
}
