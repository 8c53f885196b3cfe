use super::errors::{Error, Result};
use super::spans::SENTINEL_EXTENT;
use log::debug;

/// Distance from the eye under which walls are clipped away.
pub const DEFAULT_NEAR: f32 = 1.0;

/// Screen shape used to turn walls into column spans.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    screen_width: i32,
    fov_degrees: f32,
    near: f32,
}

impl Projection {
    pub fn new(screen_width: i32, fov_degrees: f32) -> Result<Projection> {
        ensure!(
            screen_width > 0 && screen_width < SENTINEL_EXTENT,
            Error::invalid_screen_width(screen_width)
        );
        ensure!(
            fov_degrees > 0.0 && fov_degrees < 180.0,
            Error::invalid_fov(fov_degrees)
        );
        debug!(
            "Projection: {} columns, {} degree field of view.",
            screen_width, fov_degrees
        );
        Ok(Projection {
            screen_width,
            fov_degrees,
            near: DEFAULT_NEAR,
        })
    }

    pub fn screen_width(&self) -> i32 {
        self.screen_width
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn look_from(&self, view: Viewpoint) -> ColumnProjector {
        let half_width = self.screen_width as f32 * 0.5;
        let (sin, cos) = view.angle_degrees.to_radians().sin_cos();
        ColumnProjector {
            view,
            sin,
            cos,
            half_width,
            focal: half_width / (self.fov_degrees.to_radians() * 0.5).tan(),
            width: self.screen_width as f32,
            near: self.near,
        }
    }
}

/// A position on the map and a facing; angle 0 is east, increasing counter-clockwise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewpoint {
    pub x: f32,
    pub y: f32,
    pub angle_degrees: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct ColumnProjector {
    view: Viewpoint,
    sin: f32,
    cos: f32,
    half_width: f32,
    focal: f32,
    width: f32,
    near: f32,
}

impl ColumnProjector {
    /// Map point to `(right, forward)` camera coordinates.
    pub fn to_camera(&self, x: f32, y: f32) -> (f32, f32) {
        let dx = x - self.view.x;
        let dy = y - self.view.y;
        (dx * self.sin - dy * self.cos, dx * self.cos + dy * self.sin)
    }

    /// Columns covered by the wall from `start` to `end`, if its front side faces the view.
    ///
    /// A wall's front is on the right of its direction, so front facing walls project left to
    /// right. Returns `None` for walls which are behind the eye, face away, or fall outside the
    /// screen.
    pub fn wall_columns(&self, start: (f32, f32), end: (f32, f32)) -> Option<(i32, i32)> {
        let (mut right1, mut forward1) = self.to_camera(start.0, start.1);
        let (mut right2, mut forward2) = self.to_camera(end.0, end.1);
        if forward1 <= self.near && forward2 <= self.near {
            return None;
        }
        if forward1 < self.near {
            let t = (self.near - forward1) / (forward2 - forward1);
            right1 += (right2 - right1) * t;
            forward1 = self.near;
        } else if forward2 < self.near {
            let t = (self.near - forward2) / (forward1 - forward2);
            right2 += (right1 - right2) * t;
            forward2 = self.near;
        }

        let x1 = self.half_width + right1 * self.focal / forward1;
        let x2 = self.half_width + right2 * self.focal / forward2;
        if x1 >= x2 || x2 <= 0.0 || x1 >= self.width {
            return None;
        }
        let first = x1.max(0.0).round() as i32;
        let last = x2.min(self.width).round() as i32 - 1;
        if first > last {
            None
        } else {
            Some((first, last))
        }
    }
}
