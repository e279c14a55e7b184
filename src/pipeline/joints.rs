use std::collections::HashMap;

use crate::{
    sensor::MapToImage,
    types::{BodyFrame, CameraPoint, ImagePoint, JointKind, PersonId},
};

/// A joint after projection: the raw camera-space position alongside its
/// image-space pixel position.
#[derive(Clone, Copy, Debug)]
pub struct TrackedJoint {
    pub camera: CameraPoint,
    pub image: ImagePoint,
    pub tracked: bool,
}

/// Latest known joint positions per person, replaced wholesale on every body
/// tick. Entries for persons that left the tracked set are removed, never
/// left stale.
#[derive(Default)]
pub struct JointTracker {
    joints: HashMap<(PersonId, JointKind), TrackedJoint>,
}

impl JointTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one body frame. Returns the persons whose entries were purged
    /// because they are no longer tracked, so downstream per-person state can
    /// be reset too.
    pub fn update(&mut self, frame: &BodyFrame, mapper: &dyn MapToImage) -> Vec<PersonId> {
        let mut still_tracked: Vec<PersonId> = Vec::with_capacity(frame.skeletons.len());

        for skeleton in &frame.skeletons {
            if !skeleton.tracked {
                continue;
            }
            still_tracked.push(skeleton.person);

            for kind in JointKind::ALL {
                let Some(joint) = skeleton.joint(kind) else {
                    continue;
                };
                let image = mapper.map_to_image(joint.position);
                self.joints.insert(
                    (skeleton.person, kind),
                    TrackedJoint {
                        camera: joint.position,
                        image,
                        tracked: joint.tracked,
                    },
                );
            }
        }

        let mut vanished: Vec<PersonId> = self
            .joints
            .keys()
            .map(|(person, _)| *person)
            .filter(|person| !still_tracked.contains(person))
            .collect();
        vanished.sort_unstable();
        vanished.dedup();

        for person in &vanished {
            self.purge(*person);
        }

        vanished
    }

    pub fn joint(&self, person: PersonId, kind: JointKind) -> Option<&TrackedJoint> {
        self.joints.get(&(person, kind))
    }

    pub fn persons(&self) -> Vec<PersonId> {
        let mut persons: Vec<PersonId> = self.joints.keys().map(|(person, _)| *person).collect();
        persons.sort_unstable();
        persons.dedup();
        persons
    }

    /// Image positions of every currently tracked joint, for overlay markers.
    pub fn tracked_image_points(&self) -> impl Iterator<Item = ImagePoint> + '_ {
        self.joints
            .values()
            .filter(|j| j.tracked)
            .map(|j| j.image)
    }

    pub fn purge(&mut self, person: PersonId) {
        self.joints.retain(|(owner, _), _| *owner != person);
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::types::{Skeleton, SkeletonJoint};

    struct IdentityMapper;

    impl MapToImage for IdentityMapper {
        fn map_to_image(&self, point: CameraPoint) -> ImagePoint {
            ImagePoint::new(point.x, point.y)
        }
    }

    fn skeleton(person: PersonId, z: f32) -> Skeleton {
        Skeleton {
            person,
            tracked: true,
            joints: JointKind::ALL
                .iter()
                .map(|&kind| SkeletonJoint {
                    kind,
                    position: CameraPoint::new(0.1, 0.2, z),
                    tracked: true,
                })
                .collect(),
        }
    }

    fn frame(skeletons: Vec<Skeleton>) -> BodyFrame {
        BodyFrame {
            skeletons,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn update_replaces_entries_for_tracked_persons() {
        let mut tracker = JointTracker::new();
        tracker.update(&frame(vec![skeleton(1, 1.0)]), &IdentityMapper);
        assert_eq!(
            tracker.joint(1, JointKind::HandTipRight).unwrap().camera.z,
            1.0
        );

        tracker.update(&frame(vec![skeleton(1, 2.0)]), &IdentityMapper);
        assert_eq!(
            tracker.joint(1, JointKind::HandTipRight).unwrap().camera.z,
            2.0
        );
    }

    #[test]
    fn vanished_person_is_purged_and_reported() {
        let mut tracker = JointTracker::new();
        tracker.update(&frame(vec![skeleton(1, 1.0), skeleton(2, 1.5)]), &IdentityMapper);
        assert_eq!(tracker.persons(), vec![1, 2]);

        let vanished = tracker.update(&frame(vec![skeleton(2, 1.5)]), &IdentityMapper);
        assert_eq!(vanished, vec![1]);
        assert!(tracker.joint(1, JointKind::HandRight).is_none());
        assert_eq!(tracker.persons(), vec![2]);
    }

    #[test]
    fn untracked_skeleton_counts_as_vanished() {
        let mut tracker = JointTracker::new();
        tracker.update(&frame(vec![skeleton(7, 1.0)]), &IdentityMapper);

        let mut lost = skeleton(7, 1.0);
        lost.tracked = false;
        let vanished = tracker.update(&frame(vec![lost]), &IdentityMapper);
        assert_eq!(vanished, vec![7]);
        assert!(tracker.is_empty());
    }
}
