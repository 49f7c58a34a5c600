use glam::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    /// Distance of `point` along the view direction, mapped from
    /// `near..far` onto `[0, 1]` and clamped. This is the depth render queues
    /// expect.
    pub fn normalized_depth(&self, point: Vec3) -> f32 {
        let range = self.far - self.near;
        if range <= 0.0 {
            return 0.0;
        }
        let distance = (point - self.eye).dot(self.forward());
        ((distance - self.near) / range).clamp(0.0, 1.0)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            near: 0.1,
            far: 100.0,
        }
    }
}
