use glam::{Affine3A, Vec3};
use serde::{Deserialize, Serialize};

/// Triangle mesh data carried by geometry nodes.
///
/// The converter never modifies geometry; it only needs positions to report
/// bounds and to round-trip the data through the scene document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub indices: Vec<u32>,
}

impl Mesh {
    #[must_use]
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounds of the positions after applying `transform`.
    #[must_use]
    pub fn bounds(&self, transform: &Affine3A) -> Option<Aabb> {
        self.positions
            .iter()
            .map(|p| transform.transform_point3(Vec3::from_array(*p)))
            .fold(None, |acc: Option<Aabb>, point| {
                Some(match acc {
                    Some(aabb) => aabb.including(point),
                    None => Aabb::point(point),
                })
            })
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    #[must_use]
    pub fn including(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}
