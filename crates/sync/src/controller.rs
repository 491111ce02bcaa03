use crate::net::SyncHandle;
use crate::state::{InstructionQueue, MergeableState};
use crate::viewpoint::{ViewPoint, ViewPointError, ViewPose};

/// Read/write access to the simulator's camera transform.
pub trait CameraRig {
    fn pose(&self) -> ViewPose;

    fn set_pose(&mut self, pose: ViewPose);
}

/// Camera held in memory, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRig {
    pose: ViewPose,
}

impl MemoryRig {
    pub fn new(pose: ViewPose) -> Self {
        Self { pose }
    }
}

impl CameraRig for MemoryRig {
    fn pose(&self) -> ViewPose {
        self.pose
    }

    fn set_pose(&mut self, pose: ViewPose) {
        self.pose = pose;
    }
}

/// Applies received instructions to a camera once per simulation tick.
pub struct CameraController<R> {
    rig: R,
    viewpoint: ViewPoint,
    handle: SyncHandle<InstructionQueue>,
}

impl<R: CameraRig> CameraController<R> {
    pub fn new(rig: R, handle: SyncHandle<InstructionQueue>) -> Self {
        let viewpoint = ViewPoint::from_pose(rig.pose());
        Self {
            rig,
            viewpoint,
            handle,
        }
    }

    /// Runs one tick: pulls the rig pose, drains the pending queue onto it
    /// and pushes the result back. Returns the number of instructions
    /// applied. Never waits on the network.
    pub fn step(&mut self) -> usize {
        self.viewpoint.set_pose(self.rig.pose());

        let applied = if self.handle.current().is_empty() {
            0
        } else {
            let mut pending = self.handle.take_pending();
            let applied = pending.execute(&mut self.viewpoint);
            log::debug!("Applied {} instruction(s) to camera {}", applied, pending.id());
            applied
        };

        self.rig.set_pose(self.viewpoint.pose());
        applied
    }

    /// Saves the current rig pose as a checkpoint and returns its index.
    pub fn save_checkpoint(&mut self) -> usize {
        self.viewpoint.set_pose(self.rig.pose());
        self.viewpoint.save_state()
    }

    /// Restores a saved checkpoint onto both the view point and the rig.
    pub fn restore_checkpoint(&mut self, index: usize) -> Result<(), ViewPointError> {
        self.viewpoint.restore_state(index)?;
        self.rig.set_pose(self.viewpoint.pose());
        log::debug!("Camera restored to checkpoint {}", index);
        Ok(())
    }

    pub fn rig(&self) -> &R {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut R {
        &mut self.rig
    }

    pub fn viewpoint(&self) -> &ViewPoint {
        &self.viewpoint
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::geometry::AxisAngle;
    use crate::instruction::Instruction;

    #[test]
    fn step_applies_pending_queue_to_rig() {
        let handle = SyncHandle::new(InstructionQueue::new(0));
        let mut controller = CameraController::new(MemoryRig::default(), handle.clone());

        let forward = InstructionQueue::with_instructions(0, [Instruction::translate(0.0, 0.0, 1.0)]);
        handle.merge_incoming(forward).unwrap();

        assert_eq!(controller.step(), 1);
        assert_eq!(controller.rig().pose().position, DVec3::new(0.0, 0.0, -1.0));
        assert!(handle.current().is_empty());
        assert_eq!(controller.step(), 0);
    }

    #[test]
    fn step_starts_from_the_rig_pose() {
        let handle = SyncHandle::new(InstructionQueue::new(0));
        let mut controller = CameraController::new(MemoryRig::default(), handle.clone());

        // The simulator moved the camera on its own between ticks.
        controller
            .rig_mut()
            .set_pose(ViewPose::new(DVec3::new(10.0, 0.0, 0.0), AxisAngle::IDENTITY));
        let up = InstructionQueue::with_instructions(0, [Instruction::translate(0.0, 1.0, 0.0)]);
        handle.merge_incoming(up).unwrap();

        controller.step();
        assert_eq!(controller.rig().pose().position, DVec3::new(10.0, 1.0, 0.0));
    }

    #[test]
    fn idle_step_leaves_rig_untouched() {
        let pose = ViewPose::new(DVec3::splat(1.0), AxisAngle::new(DVec3::Y, 0.3));
        let handle = SyncHandle::new(InstructionQueue::new(0));
        let mut controller = CameraController::new(MemoryRig::new(pose), handle);

        assert_eq!(controller.step(), 0);
        assert_eq!(controller.rig().pose(), pose);
    }

    #[test]
    fn idle_step_follows_the_rig() {
        let handle = SyncHandle::new(InstructionQueue::new(0));
        let mut controller = CameraController::new(MemoryRig::default(), handle);

        let moved = ViewPose::new(DVec3::new(10.0, 0.0, 0.0), AxisAngle::IDENTITY);
        controller.rig_mut().set_pose(moved);

        assert_eq!(controller.step(), 0);
        assert_eq!(controller.viewpoint().pose(), controller.rig().pose());
        assert_eq!(controller.viewpoint().position(), DVec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn checkpoint_restore_reaches_the_rig() {
        let handle = SyncHandle::new(InstructionQueue::new(0));
        let mut controller = CameraController::new(MemoryRig::default(), handle.clone());

        let saved = ViewPose::new(DVec3::new(10.0, 0.0, 0.0), AxisAngle::new(DVec3::Y, 0.5));
        controller.rig_mut().set_pose(saved);
        let index = controller.save_checkpoint();
        assert_eq!(controller.viewpoint().checkpoint(index), Some(&saved));

        let right = InstructionQueue::with_instructions(0, [Instruction::translate(1.0, 0.0, 0.0)]);
        handle.merge_incoming(right).unwrap();
        controller.step();
        assert_ne!(controller.rig().pose(), saved);

        controller.restore_checkpoint(index).unwrap();
        assert_eq!(controller.rig().pose(), saved);

        let up = InstructionQueue::with_instructions(0, [Instruction::translate(0.0, 1.0, 0.0)]);
        handle.merge_incoming(up).unwrap();
        controller.step();
        let position = controller.rig().pose().position;
        assert!((position - DVec3::new(10.0, 1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn restoring_unknown_checkpoint_keeps_rig_pose() {
        let pose = ViewPose::new(DVec3::splat(2.0), AxisAngle::IDENTITY);
        let handle = SyncHandle::new(InstructionQueue::new(0));
        let mut controller = CameraController::new(MemoryRig::new(pose), handle);

        assert_eq!(
            controller.restore_checkpoint(4),
            Err(ViewPointError::UnknownCheckpoint(4))
        );
        assert_eq!(controller.rig().pose(), pose);
    }
}
