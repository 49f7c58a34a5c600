use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LightKind {
    #[default]
    Directional,
    Point,
    Spot,
}

impl LightKind {
    const fn raw(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }
}

/// A light affecting the operations of one render queue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightData {
    pub kind: LightKind,
    pub radius: f32,
    pub color: Vec3,
    pub position: Vec3,
    pub direction: Vec3,
}

impl LightData {
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            radius: 0.0,
            color,
            position: Vec3::ZERO,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point(position: Vec3, radius: f32, color: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            radius,
            color,
            position,
            direction: Vec3::ZERO,
        }
    }

    pub fn spot(position: Vec3, direction: Vec3, radius: f32, color: Vec3) -> Self {
        Self {
            kind: LightKind::Spot,
            radius,
            color,
            position,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// GPU layout of [`LightData`].
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug)]
pub struct LightRaw {
    pub position_radius: [f32; 4],
    pub direction_kind: [f32; 4],
    pub color: [f32; 4],
}

impl LightRaw {
    pub fn from_data(data: &LightData) -> Self {
        Self {
            position_radius: data.position.extend(data.radius).to_array(),
            direction_kind: data.direction.extend(data.kind.raw() as f32).to_array(),
            color: data.color.extend(1.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_raw_is_48_bytes() {
        assert_eq!(std::mem::size_of::<LightRaw>(), 48);
    }

    #[test]
    fn raw_packs_radius_and_kind() {
        let light = LightData::spot(Vec3::new(1.0, 2.0, 3.0), Vec3::NEG_Y * 4.0, 10.0, Vec3::ONE);
        let raw = LightRaw::from_data(&light);
        assert_eq!(raw.position_radius, [1.0, 2.0, 3.0, 10.0]);
        assert_eq!(raw.direction_kind, [0.0, -1.0, 0.0, 2.0]);
    }
}
