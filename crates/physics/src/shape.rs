use rapier3d::prelude::{ColliderBuilder, SharedShape};
use serde::{Deserialize, Serialize};

/// Collision shape of a body, in body-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    Box { half_extents: [f32; 3] },
    Sphere { radius: f32 },
    /// Capsule aligned with the local Y axis.
    Capsule { half_height: f32, radius: f32 },
}

impl Default for CollisionShape {
    fn default() -> Self {
        Self::Box {
            half_extents: [0.5, 0.5, 0.5],
        }
    }
}

impl CollisionShape {
    /// Distance from the shape's center to its lowest point.
    pub fn half_height(&self) -> f32 {
        match *self {
            Self::Box { half_extents } => half_extents[1],
            Self::Sphere { radius } => radius,
            Self::Capsule {
                half_height,
                radius,
            } => half_height + radius,
        }
    }

    pub(crate) fn shared_shape(&self) -> SharedShape {
        match *self {
            Self::Box { half_extents: [x, y, z] } => SharedShape::cuboid(x, y, z),
            Self::Sphere { radius } => SharedShape::ball(radius),
            Self::Capsule {
                half_height,
                radius,
            } => SharedShape::capsule_y(half_height, radius),
        }
    }

    pub(crate) fn collider_builder(&self) -> ColliderBuilder {
        ColliderBuilder::new(self.shared_shape())
    }
}
