//! Named bone rotations applied on top of the rest pose.

use glam::Quat;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::character::settings::RotationOrder;
use crate::scene::{Scene, SkeletonKey};

/// Euler angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EulerAngles {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerAngles {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    #[must_use]
    pub fn to_quat(self, order: RotationOrder) -> Quat {
        order.quat(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BonePose {
    pub rotation: EulerAngles,
}

/// Bone name to rotation. Bones absent from the map keep their rotation.
///
/// Serializes as the bare map: `{ "head": { "rotation": { "x": 0.2, ... } } }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pose(FxHashMap<String, BonePose>);

impl Pose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_bone(mut self, name: &str, rotation: EulerAngles) -> Self {
        self.insert(name, rotation);
        self
    }

    pub fn insert(&mut self, name: &str, rotation: EulerAngles) {
        self.0.insert(name.to_string(), BonePose { rotation });
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BonePose> {
        self.0.get(name)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BonePose)> {
        self.0.iter().map(|(name, pose)| (name.as_str(), pose))
    }

    /// Sets the rotation of every named bone of `skeleton` found in the map.
    ///
    /// Each bone is written at most once and only from this map, so the
    /// result does not depend on iteration order and a second application
    /// changes nothing. Names the skeleton lacks are skipped. Returns the
    /// number of bones written.
    pub fn apply(&self, scene: &mut Scene, skeleton: SkeletonKey, order: RotationOrder) -> usize {
        let Some(skel) = scene.get_skeleton(skeleton) else {
            log::warn!("Pose applied to a removed skeleton");
            return 0;
        };

        let targets: Vec<_> = self
            .iter()
            .filter_map(|(name, bone)| match skel.bone_by_name(name) {
                Some(handle) => Some((handle, bone.rotation.to_quat(order))),
                None => {
                    log::trace!("Pose bone '{name}' not in skeleton '{}', skipped", skel.name);
                    None
                }
            })
            .collect();

        let mut applied = 0;
        for (handle, rotation) in targets {
            if let Some(node) = scene.get_node_mut(handle) {
                node.transform.rotation = rotation;
                applied += 1;
            }
        }
        applied
    }
}

impl FromIterator<(String, BonePose)> for Pose {
    fn from_iter<I: IntoIterator<Item = (String, BonePose)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
