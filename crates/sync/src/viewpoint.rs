use glam::DVec3;

use crate::geometry::AxisAngle;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewPointError {
    #[error("no checkpoint saved at index {0}")]
    UnknownCheckpoint(usize),
}

/// Position and orientation of a camera. Copying a pose is a deep copy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewPose {
    pub position: DVec3,
    pub orientation: AxisAngle,
}

impl ViewPose {
    pub fn new(position: DVec3, orientation: AxisAngle) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// Live camera pose plus an append-only list of saved checkpoints.
#[derive(Debug, Clone, Default)]
pub struct ViewPoint {
    pose: ViewPose,
    checkpoints: Vec<ViewPose>,
}

impl ViewPoint {
    pub fn new(position: DVec3, orientation: AxisAngle) -> Self {
        Self {
            pose: ViewPose::new(position, orientation),
            checkpoints: Vec::new(),
        }
    }

    pub fn from_pose(pose: ViewPose) -> Self {
        Self {
            pose,
            checkpoints: Vec::new(),
        }
    }

    pub fn update(&mut self, position: DVec3, orientation: AxisAngle) {
        self.pose = ViewPose::new(position, orientation);
    }

    pub fn set_pose(&mut self, pose: ViewPose) {
        self.pose = pose;
    }

    pub fn pose(&self) -> ViewPose {
        self.pose
    }

    pub fn position(&self) -> DVec3 {
        self.pose.position
    }

    pub fn orientation(&self) -> AxisAngle {
        self.pose.orientation
    }

    /// Returns the index to pass to [`ViewPoint::restore_state`].
    pub fn save_state(&mut self) -> usize {
        self.checkpoints.push(self.pose);
        self.checkpoints.len() - 1
    }

    pub fn restore_state(&mut self, index: usize) -> Result<(), ViewPointError> {
        let saved = self
            .checkpoints
            .get(index)
            .ok_or(ViewPointError::UnknownCheckpoint(index))?;
        self.pose = *saved;
        Ok(())
    }

    pub fn checkpoint(&self, index: usize) -> Option<&ViewPose> {
        self.checkpoints.get(index)
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }
}
