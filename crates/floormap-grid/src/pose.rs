//! Robot pose and camera geometry.
//!
//! The grid never computes kinematics itself. It asks a [`PoseSource`] to
//! project pixels onto the ground plane, for the transform from the robot
//! base into the world frame, and for the current pose.

use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::PoseError;

/// Identifier of the world frame the pose is expressed in.
///
/// Changes whenever the robot loses track of where it is (it was picked up,
/// for example); positions under different ids are not comparable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    pub origin_id: OriginId,
    /// Position in world units (one world unit per grid cell).
    pub position: Point2<f64>,
}

impl RobotPose {
    pub fn new(origin_id: OriginId, x: f64, y: f64) -> Self {
        Self {
            origin_id,
            position: Point2::new(x, y),
        }
    }
}

/// Kinematic queries the grid needs from the robot.
pub trait PoseSource {
    /// Ground-plane point, in the robot base frame, seen at pixel
    /// `(pixel_x, pixel_y)` (column, row).
    fn project_to_ground(&self, pixel_x: f64, pixel_y: f64) -> Result<Point3<f64>, PoseError>;

    /// Homogeneous transform from the robot base into frame `link`.
    fn base_to_link(&self, link: &str) -> Result<Matrix4<f64>, PoseError>;

    fn pose(&self) -> Result<RobotPose, PoseError>;
}

impl<T: PoseSource + ?Sized> PoseSource for &T {
    fn project_to_ground(&self, pixel_x: f64, pixel_y: f64) -> Result<Point3<f64>, PoseError> {
        (**self).project_to_ground(pixel_x, pixel_y)
    }

    fn base_to_link(&self, link: &str) -> Result<Matrix4<f64>, PoseError> {
        (**self).base_to_link(link)
    }

    fn pose(&self) -> Result<RobotPose, PoseError> {
        (**self).pose()
    }
}

/// A camera fixed over a flat floor, described by a pixel-to-ground
/// homography, carried by a robot with a planar pose.
///
/// Useful for replaying recorded frames and for tests; a live robot
/// implements [`PoseSource`] on top of its own kinematics.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundHomography {
    /// Maps homogeneous `(pixel_x, pixel_y, 1)` to ground `(x, y, w)` in the
    /// robot base frame.
    pub ground_from_pixel: Matrix3<f64>,
    /// World frame name answered by [`PoseSource::base_to_link`].
    pub world_frame: String,
    origin_id: OriginId,
    position: Point2<f64>,
    heading: f64,
}

impl GroundHomography {
    pub fn new(ground_from_pixel: Matrix3<f64>, world_frame: impl Into<String>) -> Self {
        Self {
            ground_from_pixel,
            world_frame: world_frame.into(),
            origin_id: OriginId(0),
            position: Point2::origin(),
            heading: 0.0,
        }
    }

    pub fn from_array(rows: [[f64; 3]; 3], world_frame: impl Into<String>) -> Self {
        Self::new(
            Matrix3::from_row_slice(&[
                rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2],
                rows[2][0], rows[2][1], rows[2][2],
            ]),
            world_frame,
        )
    }

    /// Move the robot to `(x, y)` with heading `theta` (radians, about +z).
    pub fn set_pose(&mut self, x: f64, y: f64, theta: f64) {
        self.position = Point2::new(x, y);
        self.heading = theta;
    }

    pub fn set_origin(&mut self, origin_id: OriginId) {
        self.origin_id = origin_id;
    }

    pub fn origin_id(&self) -> OriginId {
        self.origin_id
    }
}

impl PoseSource for GroundHomography {
    fn project_to_ground(&self, pixel_x: f64, pixel_y: f64) -> Result<Point3<f64>, PoseError> {
        let v = self.ground_from_pixel * Vector3::new(pixel_x, pixel_y, 1.0);
        let w = v[2];
        // Rays at or above the horizon never meet the floor.
        if !w.is_finite() || w.abs() < 1e-12 {
            return Err(PoseError::NotOnGround {
                x: pixel_x,
                y: pixel_y,
            });
        }
        Ok(Point3::new(v[0] / w, v[1] / w, 0.0))
    }

    fn base_to_link(&self, link: &str) -> Result<Matrix4<f64>, PoseError> {
        if link != self.world_frame {
            return Err(PoseError::UnknownFrame(link.to_string()));
        }
        let (s, c) = self.heading.sin_cos();
        Ok(Matrix4::new(
            c,
            -s,
            0.0,
            self.position.x,
            s,
            c,
            0.0,
            self.position.y,
            0.0,
            0.0,
            1.0,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        ))
    }

    fn pose(&self) -> Result<RobotPose, PoseError> {
        Ok(RobotPose {
            origin_id: self.origin_id,
            position: self.position,
        })
    }
}
