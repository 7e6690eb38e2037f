//! Per-body shading and the draw list handed to a renderer
//!
//! Nothing here touches a GPU. A renderer walks the [`DrawItem`]s in order and
//! draws a box of `half_extent` with `model` and `shade.color()`.

use crate::scene::Scene;
use pickbox_math::{Mat4, Quat, Vec3};
use pickbox_physics::prelude::*;

/// Display state of a body for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeShade {
    Ground,
    /// Under the cursor's pick ray
    Hit,
    Sleeping,
    /// Reported by the contact sensor this frame
    Touching,
    Idle,
}

impl CubeShade {
    /// Linear RGBA
    pub fn color(self) -> [f32; 4] {
        match self {
            CubeShade::Ground => [0.2, 0.7, 0.2, 1.0],
            CubeShade::Hit => [1.0, 0.0, 1.0, 1.0],
            CubeShade::Sleeping => [0.9, 0.1, 0.1, 1.0],
            CubeShade::Touching => [1.0, 0.55, 0.0, 1.0],
            CubeShade::Idle => [1.0, 1.0, 0.0, 1.0],
        }
    }
}

/// Per-frame facts a shade is derived from
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadeInputs {
    pub is_ground: bool,
    pub is_hit: bool,
    pub is_sleeping: bool,
    pub is_touching: bool,
}

/// Ground is always `Ground`; otherwise Hit > Sleeping > Touching > Idle.
pub fn derive_shade(inputs: ShadeInputs) -> CubeShade {
    if inputs.is_ground {
        CubeShade::Ground
    } else if inputs.is_hit {
        CubeShade::Hit
    } else if inputs.is_sleeping {
        CubeShade::Sleeping
    } else if inputs.is_touching {
        CubeShade::Touching
    } else {
        CubeShade::Idle
    }
}

/// One box to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub body: RigidBodyHandle,
    /// Body pose; the unit box is scaled by `half_extent`
    pub model: Mat4,
    pub half_extent: f32,
    pub shade: CubeShade,
}

impl DrawItem {
    pub fn color(&self) -> [f32; 4] {
        self.shade.color()
    }
}

/// Build the draw list from body snapshots
///
/// `hit` is the picked body, if any. `touching` holds the bodies that took part
/// in a reported sensor contact.
pub fn build_draw_list(
    scene: &Scene,
    snapshots: &[BodySnapshot],
    hit: Option<RigidBodyHandle>,
    touching: &[RigidBodyHandle],
) -> Vec<DrawItem> {
    snapshots
        .iter()
        .map(|snapshot| {
            let shade = derive_shade(ShadeInputs {
                is_ground: scene.is_ground(snapshot.handle),
                is_hit: hit == Some(snapshot.handle),
                is_sleeping: snapshot.is_sleeping(),
                is_touching: touching.contains(&snapshot.handle),
            });
            let model = Mat4::from_rotation_translation(
                Quat::from_array(snapshot.rotation),
                Vec3::from(snapshot.position),
            );
            DrawItem {
                body: snapshot.handle,
                model,
                half_extent: scene.half_extent_of(snapshot.handle),
                shade,
            }
        })
        .collect()
}

/// Number of items drawn with each shade, in `CubeShade` declaration order
pub fn shade_histogram(items: &[DrawItem]) -> [usize; 5] {
    let mut counts = [0; 5];
    for item in items {
        let slot = match item.shade {
            CubeShade::Ground => 0,
            CubeShade::Hit => 1,
            CubeShade::Sleeping => 2,
            CubeShade::Touching => 3,
            CubeShade::Idle => 4,
        };
        counts[slot] += 1;
    }
    counts
}
