use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Handle to a node owned by the scene graph.
///
/// Holders never own the node; lookups through the scene graph return `None`
/// once the node has been destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Rigid transform: position and unit orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Compose `self` (parent) with `local` (child), renormalizing the result
    /// so repeated composition does not drift away from unit length.
    pub fn mul_transform(&self, local: &Transform) -> Transform {
        Transform {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Map a point from local space into the space of this transform.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    pub fn renormalized(self) -> Self {
        Self {
            rotation: self.rotation.normalize(),
            ..self
        }
    }
}
