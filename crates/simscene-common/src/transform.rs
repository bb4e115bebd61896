//! Rigid-transform math for skeleton composition.
//!
//! A [`Transform`] is a translation, a unit quaternion rotation and a uniform
//! scale. Composition applies the right-hand side first: `a * b` maps a point
//! through `b`, then through `a`, which is exactly how a bone's world
//! transform folds up its parent chain.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn scaled(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// A quaternion in `(x, y, z, w)` order, matching the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn from_array(a: [f32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Hamilton product `self * rhs` (rhs rotation applied first).
    pub fn mul(self, q: Quat) -> Quat {
        let Quat { x, y, z, w } = self;
        Quat::new(
            w * q.x + x * q.w + y * q.z - z * q.y,
            w * q.y + y * q.w + z * q.x - x * q.z,
            w * q.z + z * q.w + x * q.y - y * q.x,
            w * q.w - x * q.x - y * q.y - z * q.z,
        )
    }

    /// Multiplicative inverse; for unit quaternions this is the conjugate.
    pub fn inverse(self) -> Quat {
        let s = self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w;
        Quat::new(-self.x / s, -self.y / s, -self.z / s, self.w / s)
    }

    /// Rotate a vector by this quaternion.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let (x, y, z, w) = (self.x, self.y, self.z, self.w);
        // Row-major rotation matrix applied to v.
        Vec3::new(
            (1.0 - 2.0 * (y * y + z * z)) * v.x
                + 2.0 * (x * y - w * z) * v.y
                + 2.0 * (x * z + w * y) * v.z,
            2.0 * (x * y + w * z) * v.x
                + (1.0 - 2.0 * (x * x + z * z)) * v.y
                + 2.0 * (y * z - w * x) * v.z,
            2.0 * (x * z - w * y) * v.x
                + 2.0 * (y * z + w * x) * v.y
                + (1.0 - 2.0 * (x * x + y * y)) * v.z,
        )
    }
}

/// Translation + rotation + uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub const fn new(translation: Vec3, rotation: Quat, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Map a point through this transform: rotate, scale, translate.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p).scaled(self.scale) + self.translation
    }

    /// Compose transforms; `a.then_local(b)` applies `b` in `a`'s space.
    ///
    /// Equivalent to `a * b` with matrices: the result maps a point through
    /// `b` first, then through `a`.
    pub fn then_local(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: self.rotation.mul(child.rotation),
            scale: self.scale * child.scale,
        }
    }

    /// Inverse transform, assuming a non-zero scale.
    pub fn inverse(&self) -> Transform {
        let inv_rot = self.rotation.inverse();
        let inv_scale = 1.0 / self.scale;
        Transform {
            translation: inv_rot.rotate(-self.translation).scaled(inv_scale),
            rotation: inv_rot,
            scale: inv_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS && (a.z - b.z).abs() < EPS
    }

    // 90 degrees around Z.
    fn quarter_turn_z() -> Quat {
        let h = std::f32::consts::FRAC_PI_4;
        Quat::new(0.0, 0.0, h.sin(), h.cos())
    }

    #[test]
    fn test_quat_rotate() {
        let q = quarter_turn_z();
        let v = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(approx(v, Vec3::new(0.0, 1.0, 0.0)), "{v:?}");
    }

    #[test]
    fn test_quat_inverse_roundtrip() {
        let q = quarter_turn_z();
        let v = Vec3::new(0.3, -1.2, 2.0);
        let back = q.inverse().rotate(q.rotate(v));
        assert!(approx(back, v), "{back:?}");
    }

    #[test]
    fn test_compose_translation_chain() {
        let a = Transform::new(Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY, 1.0);
        let b = Transform::new(Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY, 1.0);
        let ab = a.then_local(&b);
        assert!(approx(ab.translation, Vec3::new(0.0, 2.0, 1.0)));
    }

    #[test]
    fn test_compose_applies_child_in_parent_space() {
        let parent = Transform::new(Vec3::ZERO, quarter_turn_z(), 1.0);
        let child = Transform::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, 1.0);
        let world = parent.then_local(&child);
        // The child's +X offset ends up along +Y after the parent's turn.
        assert!(approx(world.translation, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let t = Transform::new(Vec3::new(1.0, -2.0, 3.0), quarter_turn_z(), 2.0);
        let id = t.then_local(&t.inverse());
        assert!(approx(id.translation, Vec3::ZERO), "{id:?}");
        assert!((id.scale - 1.0).abs() < EPS);
    }
}
