//! Wireframe icosphere whose vertices spike outward with the spectrum.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::audio::FeatureFrame;
use crate::params::SphereParams;

/// Vertex data for the sphere mesh (position + rest normal)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Icosahedron corners (unnormalized golden-ratio form)
fn icosahedron() -> ([Vec3; 12], [[usize; 3]; 20]) {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let corners = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ];
    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    (corners, faces)
}

/// Split triangle (a, b, c) into (detail + 1)^2 triangles, appending corners to `out`
fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: u32, out: &mut Vec<Vec3>) {
    let cols = detail as usize + 1;

    // Row i runs from lerp(a, c) to lerp(b, c) with cols - i + 1 points
    let mut grid: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let t = i as f32 / cols as f32;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = cols - i;

        let row = if rows == 0 {
            vec![aj]
        } else {
            (0..=rows)
                .map(|j| aj.lerp(bj, j as f32 / rows as f32))
                .collect()
        };
        grid.push(row);
    }

    for i in 0..cols {
        for j in 0..(2 * (cols - i) - 1) {
            let k = j / 2;
            if j % 2 == 0 {
                out.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                out.extend_from_slice(&[grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
}

/// Audio-reactive sphere mesh (non-indexed triangle list)
pub struct SoundSphere {
    pub vertices: Vec<Vertex>,
    /// Undisplaced positions for resetting
    rest_positions: Vec<Vec3>,
    params: SphereParams,
    rotation_y: f32,
}

impl SoundSphere {
    /// Build the subdivided icosphere at rest
    pub fn new(params: SphereParams) -> Self {
        let (corners, faces) = icosahedron();

        let mut corners_out = Vec::new();
        for [a, b, c] in faces {
            subdivide_face(corners[a], corners[b], corners[c], params.detail, &mut corners_out);
        }

        let rest_positions: Vec<Vec3> = corners_out
            .into_iter()
            .map(|p| p.normalize() * params.radius)
            .collect();

        let vertices = rest_positions
            .iter()
            .map(|p| Vertex {
                position: p.to_array(),
                normal: p.normalize_or_zero().to_array(),
            })
            .collect();

        Self {
            vertices,
            rest_positions,
            params,
            rotation_y: 0.0,
        }
    }

    /// Apply one frame of audio. Returns true when the sphere reacted.
    ///
    /// Quiet frames (mean at or below the sound threshold) restore the rest shape.
    pub fn update(&mut self, frame: &FeatureFrame) -> bool {
        let reactive = !frame.is_empty() && frame.average() > self.params.sound_threshold;

        if reactive {
            let p = &self.params;
            for (vertex, rest) in self.vertices.iter_mut().zip(&self.rest_positions) {
                let n = rest.normalize_or_zero();

                // Azimuth picks the bin, giving the striped spike pattern
                let band = ((n.z.atan2(n.x) * p.band_spread).floor().abs() as usize) % frame.len();
                let intensity = frame[band] * p.intensity_scale;

                let distortion = p.distortion_base
                    + (n.x * p.pattern_frequency + n.y * p.pattern_frequency).sin().abs()
                        * p.distortion_range;

                vertex.position = (*rest * (1.0 + intensity * distortion)).to_array();
            }
        } else {
            for (vertex, rest) in self.vertices.iter_mut().zip(&self.rest_positions) {
                vertex.position = rest.to_array();
            }
        }

        self.rotation_y += self.params.rotation_per_tick_rad;
        reactive
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    /// Model matrix for the renderer (rotation about Y)
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    /// Largest vertex distance from the center
    pub fn max_radius(&self) -> f32 {
        self.vertices
            .iter()
            .map(|v| Vec3::from_array(v.position).length())
            .fold(0.0, f32::max)
    }

    /// Vertex data as raw bytes for GPU upload
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn is_at_rest(&self) -> bool {
        self.vertices
            .iter()
            .zip(&self.rest_positions)
            .all(|(v, rest)| Vec3::from_array(v.position) == *rest)
    }
}
