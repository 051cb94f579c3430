use std::collections::HashMap;

use crate::autorig::AutoRig;
use crate::pose::{TimelineEvaluator, apply_all_constraints, resolve_world};
use crate::{
    AnimationId, Bone, BoneId, ConstraintId, Error, IkConstraint, RigAnimation, WorldTransform,
};

/// Owns a rig: the bone arena, its IK constraints, and its animations.
///
/// Bones reference parents by id; the skeleton keeps the parent graph a
/// forest. Bones and constraints are created and destroyed only through
/// skeleton-scoped operations. Pose fields (`x`, `rotation`, ...) may be
/// edited directly via [`Skeleton::bone_mut`]; parent edits go through
/// [`Skeleton::set_parent`] so the cycle check cannot be bypassed.
#[derive(Debug, Default)]
pub struct Skeleton {
    pub name: String,
    bones: Vec<Bone>,
    constraints: Vec<IkConstraint>,
    animations: Vec<RigAnimation>,
    evaluator: TimelineEvaluator,
    next_bone_id: BoneId,
    next_constraint_id: ConstraintId,
    next_animation_id: AnimationId,
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds a skeleton from an analyzer result, resolving the rig's string
    /// bone keys into concrete ids. The bone list and its parent links are
    /// populated atomically; attachments stay with the [`AutoRig`].
    pub fn from_auto_rig(rig: &AutoRig) -> Self {
        let mut skeleton = Self::new(rig.name.clone());
        let mut ids: HashMap<&str, BoneId> = HashMap::with_capacity(rig.bones.len());
        for spec in &rig.bones {
            // Analyzer output is parent-first ordered.
            let parent = spec.parent_key.and_then(|key| ids.get(key).copied());
            let id = skeleton.push_bone(spec.key, parent);
            ids.insert(spec.key, id);
            if let Some(bone) = skeleton.bones.last_mut() {
                bone.x = spec.x;
                bone.y = spec.y;
                bone.rotation = spec.rotation;
                bone.scale_x = spec.scale_x;
                bone.scale_y = spec.scale_y;
                bone.length = spec.length;
            }
        }
        skeleton
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, id: BoneId) -> Option<&Bone> {
        self.bones.iter().find(|b| b.id == id)
    }

    pub fn bone_mut(&mut self, id: BoneId) -> Option<&mut Bone> {
        self.bones.iter_mut().find(|b| b.id == id)
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|b| b.name == name)
    }

    pub fn add_bone(&mut self, name: impl Into<String>, parent: Option<BoneId>) -> Result<BoneId, Error> {
        if let Some(parent) = parent {
            if self.bone(parent).is_none() {
                return Err(Error::UnknownBone { id: parent });
            }
        }
        Ok(self.push_bone(name, parent))
    }

    fn push_bone(&mut self, name: impl Into<String>, parent: Option<BoneId>) -> BoneId {
        let id = self.next_bone_id;
        self.next_bone_id += 1;
        self.bones.push(Bone::new(id, name, parent));
        id
    }

    /// Removes a bone and all of its descendants, along with any constraints
    /// targeting removed bones and any animation tracks bound to them.
    pub fn remove_bone(&mut self, id: BoneId) -> Result<(), Error> {
        if self.bone(id).is_none() {
            return Err(Error::UnknownBone { id });
        }
        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            cursor += 1;
            for bone in &self.bones {
                if bone.parent == Some(current) && !doomed.contains(&bone.id) {
                    doomed.push(bone.id);
                }
            }
        }
        self.bones.retain(|b| !doomed.contains(&b.id));
        self.constraints.retain(|c| !doomed.contains(&c.target_bone));
        for animation in &mut self.animations {
            animation.tracks.retain(|t| !doomed.contains(&t.bone));
        }
        Ok(())
    }

    /// Reparents a bone after verifying the move keeps the graph a forest:
    /// the new parent must not be the bone itself or one of its descendants.
    /// On rejection the bone list is left unchanged.
    pub fn set_parent(&mut self, bone: BoneId, parent: Option<BoneId>) -> Result<(), Error> {
        let bone_name = self
            .bone(bone)
            .ok_or(Error::UnknownBone { id: bone })?
            .name
            .clone();
        if let Some(parent_id) = parent {
            let parent_bone = self
                .bone(parent_id)
                .ok_or(Error::UnknownBone { id: parent_id })?;
            // Ancestor walk from the candidate parent: reaching `bone` means
            // the candidate is `bone` itself or one of its descendants.
            let mut steps = 0;
            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == bone {
                    return Err(Error::ReparentWouldCycle {
                        bone: bone_name,
                        parent: parent_bone.name.clone(),
                    });
                }
                steps += 1;
                if steps > self.bones.len() {
                    break;
                }
                cursor = self.bone(current).and_then(|b| b.parent);
            }
        }
        if let Some(target) = self.bone_mut(bone) {
            target.parent = parent;
        }
        Ok(())
    }

    pub fn constraints(&self) -> &[IkConstraint] {
        &self.constraints
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        target_bone: BoneId,
    ) -> Result<ConstraintId, Error> {
        if self.bone(target_bone).is_none() {
            return Err(Error::UnknownBone { id: target_bone });
        }
        let id = self.next_constraint_id;
        self.next_constraint_id += 1;
        self.constraints.push(IkConstraint::new(id, name, target_bone));
        Ok(id)
    }

    pub fn constraint_mut(&mut self, id: ConstraintId) -> Option<&mut IkConstraint> {
        self.constraints.iter_mut().find(|c| c.id == id)
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) {
        self.constraints.retain(|c| c.id != id);
    }

    pub fn animations(&self) -> &[RigAnimation] {
        &self.animations
    }

    pub fn add_animation(&mut self, name: impl Into<String>, duration: f32) -> AnimationId {
        let id = self.next_animation_id;
        self.next_animation_id += 1;
        self.animations.push(RigAnimation::new(id, name, duration));
        id
    }

    pub fn animation(&self, id: AnimationId) -> Option<&RigAnimation> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn animation_mut(&mut self, id: AnimationId) -> Option<&mut RigAnimation> {
        self.animations.iter_mut().find(|a| a.id == id)
    }

    pub fn animation_by_name(&self, name: &str) -> Option<&RigAnimation> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// World transforms of every bone at the current pose.
    pub fn resolve_world(&self) -> HashMap<BoneId, WorldTransform> {
        resolve_world(&self.bones)
    }

    /// Poses the skeleton at `time` (milliseconds) within an animation:
    /// every track's interpolated values are written into the live bones,
    /// then all enabled IK constraints are applied in list order on top.
    ///
    /// Looping animations wrap time modulo the duration; non-looping ones
    /// clamp to `[0, duration]`.
    pub fn pose_at(&mut self, animation: AnimationId, time: f32) -> Result<(), Error> {
        let Self {
            bones,
            constraints,
            animations,
            evaluator,
            ..
        } = self;
        let animation = animations
            .iter()
            .find(|a| a.id == animation)
            .ok_or_else(|| Error::UnknownAnimation {
                name: format!("id {animation}"),
            })?;

        let local_time = if animation.looping && animation.duration > 0.0 {
            time.rem_euclid(animation.duration)
        } else {
            time.clamp(0.0, animation.duration.max(0.0))
        };

        for track in &animation.tracks {
            if let Some(delta) = evaluator.evaluate(&track.keyframes, local_time) {
                if delta.is_empty() {
                    continue;
                }
                if let Some(bone) = bones.iter_mut().find(|b| b.id == track.bone) {
                    delta.apply_to(bone);
                }
            }
        }
        apply_all_constraints(bones, constraints);
        Ok(())
    }
}
