//! Geometric and enumerated component types used by [`Value`](super::Value).
//!
//! All geometric kinds store `f32` components. Narrowing from the host's
//! `f64` number type happens at the catalog edge and truncates.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::ValueError;

// =============================================================================
// VECTORS
// =============================================================================

/// Two-dimensional vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Returns the vector scaled to length 1. The zero vector yields NaN
    /// components, as the engine does.
    pub fn unit(self) -> Self {
        self / self.magnitude()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        self + (goal - self) * alpha
    }
}

impl Add for Vector2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul for Vector2 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div for Vector2 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Div<f32> for Vector2 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// Three-dimensional vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn unit(self) -> Self {
        self / self.magnitude()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        self + (goal - self) * alpha
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul for Vector3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div for Vector3 {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Self::new(self.x / rhs.x, self.y / rhs.y, self.z / rhs.z)
    }
}

impl Div<f32> for Vector3 {
    type Output = Self;
    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Two-dimensional vector with 16-bit integer components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector2int16 {
    pub x: i16,
    pub y: i16,
}

/// Three-dimensional vector with 16-bit integer components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Vector3int16 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

// Integer vectors wrap on overflow and go through f64 for scaling, so that
// division by zero saturates instead of panicking.
macro_rules! int16_vector {
    ($name:ident { $($field:ident),+ }) => {
        impl $name {
            pub const fn new($($field: i16),+) -> Self {
                Self { $($field),+ }
            }

            /// Multiplies every component by `n`, truncating the result.
            pub fn mul_n(self, n: f64) -> Self {
                Self { $($field: (self.$field as f64 * n) as i16),+ }
            }

            /// Divides every component by `n`, truncating the result.
            pub fn div_n(self, n: f64) -> Self {
                Self { $($field: (self.$field as f64 / n) as i16),+ }
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field.wrapping_add(rhs.$field)),+ }
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field.wrapping_sub(rhs.$field)),+ }
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self { $($field: self.$field.wrapping_mul(rhs.$field)),+ }
            }
        }

        impl Div for $name {
            type Output = Self;
            fn div(self, rhs: Self) -> Self {
                Self { $($field: (self.$field as f64 / rhs.$field as f64) as i16),+ }
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self { $($field: self.$field.wrapping_neg()),+ }
            }
        }
    };
}

int16_vector!(Vector2int16 { x, y });
int16_vector!(Vector3int16 { x, y, z });

impl fmt::Display for Vector2int16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

impl fmt::Display for Vector3int16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

// =============================================================================
// UDIM
// =============================================================================

/// One-dimensional GUI coordinate: a scale of the parent plus a pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UDim {
    pub scale: f32,
    pub offset: i32,
}

impl UDim {
    pub const fn new(scale: f32, offset: i32) -> Self {
        Self { scale, offset }
    }
}

impl Add for UDim {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.scale + rhs.scale, self.offset.wrapping_add(rhs.offset))
    }
}

impl Sub for UDim {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.scale - rhs.scale, self.offset.wrapping_sub(rhs.offset))
    }
}

impl Neg for UDim {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.scale, self.offset.wrapping_neg())
    }
}

impl fmt::Display for UDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.scale, self.offset)
    }
}

/// Two-dimensional GUI coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UDim2 {
    pub x: UDim,
    pub y: UDim,
}

impl UDim2 {
    pub const fn new(x: UDim, y: UDim) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        let scale = |a: f32, b: f32| a + (b - a) * alpha;
        let offset = |a: i32, b: i32| (a as f64 + (b as f64 - a as f64) * alpha as f64) as i32;
        Self::new(
            UDim::new(scale(self.x.scale, goal.x.scale), offset(self.x.offset, goal.x.offset)),
            UDim::new(scale(self.y.scale, goal.y.scale), offset(self.y.offset, goal.y.offset)),
        )
    }
}

impl Add for UDim2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for UDim2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for UDim2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for UDim2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}, {{{}}}", self.x, self.y)
    }
}

// =============================================================================
// RAY, CFRAME, RECT, REGION3
// =============================================================================

/// Half-line with an origin and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub const fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    /// Returns the point on the ray closest to `point`.
    pub fn closest_point(self, point: Vector3) -> Vector3 {
        let unit = self.direction.unit();
        let t = (point - self.origin).dot(unit);
        if t.is_nan() || t < 0.0 {
            return self.origin;
        }
        self.origin + unit * t
    }

    pub fn distance(self, point: Vector3) -> f32 {
        (point - self.closest_point(point)).magnitude()
    }
}

impl fmt::Display for Ray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}, {{{}}}", self.origin, self.direction)
    }
}

/// Coordinate frame: a position and a row-major 3x3 rotation matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CFrame {
    pub position: Vector3,
    pub rotation: [f32; 9],
}

const IDENTITY: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

impl Default for CFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CFrame {
    pub const IDENTITY: CFrame = CFrame {
        position: Vector3::new(0.0, 0.0, 0.0),
        rotation: IDENTITY,
    };

    /// Frame at `position` with no rotation.
    pub const fn from_position(position: Vector3) -> Self {
        Self {
            position,
            rotation: IDENTITY,
        }
    }

    /// Frame from the 12 components `x, y, z, r00, r01, ..., r22`.
    pub fn from_components(c: [f32; 12]) -> Self {
        Self {
            position: Vector3::new(c[0], c[1], c[2]),
            rotation: [c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11]],
        }
    }

    /// Frame from a position and a (not necessarily normalized) quaternion.
    pub fn from_quaternion(position: Vector3, qx: f32, qy: f32, qz: f32, qw: f32) -> Self {
        let n = (qx * qx + qy * qy + qz * qz + qw * qw).sqrt();
        let (x, y, z, w) = (qx / n, qy / n, qz / n, qw / n);
        Self {
            position,
            rotation: [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - z * w),
                2.0 * (x * z + y * w),
                2.0 * (x * y + z * w),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - x * w),
                2.0 * (x * z - y * w),
                2.0 * (y * z + x * w),
                1.0 - 2.0 * (x * x + y * y),
            ],
        }
    }

    /// Rotation from Euler angles in radians, applied in X, Y, Z order.
    pub fn from_euler_angles_xyz(rx: f32, ry: f32, rz: f32) -> Self {
        let rot_x = Self::axis_rotation(0, rx);
        let rot_y = Self::axis_rotation(1, ry);
        let rot_z = Self::axis_rotation(2, rz);
        rot_x * rot_y * rot_z
    }

    fn axis_rotation(axis: usize, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let rotation = match axis {
            0 => [1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c],
            1 => [c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c],
            _ => [c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0],
        };
        Self {
            position: Vector3::default(),
            rotation,
        }
    }

    pub fn components(self) -> [f32; 12] {
        let r = self.rotation;
        [
            self.position.x,
            self.position.y,
            self.position.z,
            r[0],
            r[1],
            r[2],
            r[3],
            r[4],
            r[5],
            r[6],
            r[7],
            r[8],
        ]
    }

    pub fn right_vector(self) -> Vector3 {
        Vector3::new(self.rotation[0], self.rotation[3], self.rotation[6])
    }

    pub fn up_vector(self) -> Vector3 {
        Vector3::new(self.rotation[1], self.rotation[4], self.rotation[7])
    }

    pub fn look_vector(self) -> Vector3 {
        Vector3::new(-self.rotation[2], -self.rotation[5], -self.rotation[8])
    }

    fn rotate(self, v: Vector3) -> Vector3 {
        let r = self.rotation;
        Vector3::new(
            r[0] * v.x + r[1] * v.y + r[2] * v.z,
            r[3] * v.x + r[4] * v.y + r[5] * v.z,
            r[6] * v.x + r[7] * v.y + r[8] * v.z,
        )
    }

    /// Inverse of an orthonormal frame (transposed rotation).
    pub fn inverse(self) -> Self {
        let r = self.rotation;
        let rotation = [r[0], r[3], r[6], r[1], r[4], r[7], r[2], r[5], r[8]];
        let inv = Self {
            position: Vector3::default(),
            rotation,
        };
        Self {
            position: -inv.rotate(self.position),
            rotation,
        }
    }

    pub fn point_to_world_space(self, v: Vector3) -> Vector3 {
        self.rotate(v) + self.position
    }

    pub fn point_to_object_space(self, v: Vector3) -> Vector3 {
        self.inverse().point_to_world_space(v)
    }

    pub fn to_world_space(self, other: Self) -> Self {
        self * other
    }

    pub fn to_object_space(self, other: Self) -> Self {
        self.inverse() * other
    }

    pub fn lerp(self, goal: Self, alpha: f32) -> Self {
        let mut rotation = [0.0; 9];
        for (i, r) in rotation.iter_mut().enumerate() {
            *r = self.rotation[i] + (goal.rotation[i] - self.rotation[i]) * alpha;
        }
        Self {
            position: self.position.lerp(goal.position, alpha),
            rotation,
        }
    }
}

impl Mul for CFrame {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let a = self.rotation;
        let b = rhs.rotation;
        let mut rotation = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                rotation[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        Self {
            position: self.point_to_world_space(rhs.position),
            rotation,
        }
    }
}

impl Mul<Vector3> for CFrame {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        self.point_to_world_space(rhs)
    }
}

impl Add<Vector3> for CFrame {
    type Output = Self;
    fn add(self, rhs: Vector3) -> Self {
        Self {
            position: self.position + rhs,
            rotation: self.rotation,
        }
    }
}

impl Sub<Vector3> for CFrame {
    type Output = Self;
    fn sub(self, rhs: Vector3) -> Self {
        Self {
            position: self.position - rhs,
            rotation: self.rotation,
        }
    }
}

impl fmt::Display for CFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.components().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Axis-aligned 2D rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vector2,
    pub max: Vector2,
}

impl Rect {
    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.min, self.max)
    }
}

/// Axis-aligned bounded region of 3D space. Script-only: the file
/// catalog has no representation for it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region3 {
    pub min: Vector3,
    pub max: Vector3,
}

impl Region3 {
    pub const fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn cframe(self) -> CFrame {
        CFrame::from_position((self.min + self.max) / 2.0)
    }

    pub fn size(self) -> Vector3 {
        self.max - self.min
    }

    /// Expands the region outward so that both corners lie on a grid of the
    /// given resolution.
    pub fn expand_to_grid(self, resolution: i32) -> Self {
        if resolution <= 0 {
            return self;
        }
        let res = resolution as f32;
        let down = |v: f32| (v / res).floor() * res;
        let up = |v: f32| (v / res).ceil() * res;
        Self {
            min: Vector3::new(down(self.min.x), down(self.min.y), down(self.min.z)),
            max: Vector3::new(up(self.max.x), up(self.max.y), up(self.max.z)),
        }
    }
}

impl fmt::Display for Region3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {}", self.cframe(), self.size())
    }
}

// =============================================================================
// FACES, AXES
// =============================================================================

/// Face names in bit order.
pub const FACE_NAMES: [&str; 6] = ["Right", "Top", "Back", "Left", "Bottom", "Front"];

/// Set of cube faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Faces {
    pub right: bool,
    pub top: bool,
    pub back: bool,
    pub left: bool,
    pub bottom: bool,
    pub front: bool,
}

impl Faces {
    pub fn from_bits(bits: u8) -> Self {
        Self {
            right: bits & 0x01 != 0,
            top: bits & 0x02 != 0,
            back: bits & 0x04 != 0,
            left: bits & 0x08 != 0,
            bottom: bits & 0x10 != 0,
            front: bits & 0x20 != 0,
        }
    }

    pub fn bits(self) -> u8 {
        self.flags()
            .iter()
            .enumerate()
            .fold(0, |acc, (i, set)| if *set { acc | (1 << i) } else { acc })
    }

    fn flags(self) -> [bool; 6] {
        [self.right, self.top, self.back, self.left, self.bottom, self.front]
    }

    /// Sets the face with the given name. Returns false for unknown names.
    pub fn set_by_name(&mut self, name: &str) -> bool {
        match FACE_NAMES.iter().position(|n| *n == name) {
            Some(i) => {
                *self = Self::from_bits(self.bits() | (1 << i));
                true
            }
            None => false,
        }
    }

    pub fn get_by_name(self, name: &str) -> Option<bool> {
        FACE_NAMES.iter().position(|n| *n == name).map(|i| self.flags()[i])
    }
}

impl fmt::Display for Faces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = FACE_NAMES
            .iter()
            .zip(self.flags())
            .filter_map(|(name, set)| set.then_some(*name))
            .collect();
        f.write_str(&names.join(", "))
    }
}

/// Axis names in bit order.
pub const AXIS_NAMES: [&str; 3] = ["X", "Y", "Z"];

/// Set of coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Axes {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Axes {
    pub fn from_bits(bits: u8) -> Self {
        Self {
            x: bits & 0x01 != 0,
            y: bits & 0x02 != 0,
            z: bits & 0x04 != 0,
        }
    }

    pub fn bits(self) -> u8 {
        (self.x as u8) | (self.y as u8) << 1 | (self.z as u8) << 2
    }

    /// Sets an axis by name. Face names select the axis they are normal to.
    pub fn set_by_name(&mut self, name: &str) -> bool {
        match name {
            "X" | "Right" | "Left" => self.x = true,
            "Y" | "Top" | "Bottom" => self.y = true,
            "Z" | "Back" | "Front" => self.z = true,
            _ => return false,
        }
        true
    }

    pub fn get_by_name(self, name: &str) -> Option<bool> {
        match name {
            "X" | "Right" | "Left" => Some(self.x),
            "Y" | "Top" | "Bottom" => Some(self.y),
            "Z" | "Back" | "Front" => Some(self.z),
            _ => None,
        }
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = AXIS_NAMES
            .iter()
            .zip([self.x, self.y, self.z])
            .filter_map(|(name, set)| set.then_some(*name))
            .collect();
        f.write_str(&names.join(", "))
    }
}

// =============================================================================
// NUMBER RANGE, PHYSICAL PROPERTIES
// =============================================================================

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberRange {
    pub min: f32,
    pub max: f32,
}

impl NumberRange {
    /// Creates a range, rejecting `min > max`.
    pub fn new(min: f32, max: f32) -> Result<Self, ValueError> {
        if !(min <= max) {
            return Err(ValueError::Validation {
                kind: "NumberRange",
                reason: "minimum must not exceed maximum",
            });
        }
        Ok(Self { min, max })
    }
}

impl fmt::Display for NumberRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.min, self.max)
    }
}

/// Material physics overrides. When `custom` is false the part uses the
/// defaults of its material and the remaining fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PhysicalProperties {
    pub custom: bool,
    pub density: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub friction_weight: f32,
    pub elasticity_weight: f32,
}

impl PhysicalProperties {
    pub fn new(density: f32, friction: f32, elasticity: f32) -> Self {
        Self::with_weights(density, friction, elasticity, 1.0, 1.0)
    }

    pub fn with_weights(
        density: f32,
        friction: f32,
        elasticity: f32,
        friction_weight: f32,
        elasticity_weight: f32,
    ) -> Self {
        Self {
            custom: true,
            density,
            friction,
            elasticity,
            friction_weight,
            elasticity_weight,
        }
    }
}

impl fmt::Display for PhysicalProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.custom {
            return f.write_str("nil");
        }
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.density, self.friction, self.elasticity, self.friction_weight, self.elasticity_weight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector3_ops() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vector3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vector3::new(3.0, 3.0, 3.0));
        assert_eq!(a * 2.0, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(a.dot(b), 32.0);
        assert_eq!(
            Vector3::new(1.0, 0.0, 0.0).cross(Vector3::new(0.0, 1.0, 0.0)),
            Vector3::new(0.0, 0.0, 1.0)
        );
        assert_eq!(a.to_string(), "1, 2, 3");
    }

    #[test]
    fn test_int16_vector_wraps_and_truncates() {
        let v = Vector3int16::new(i16::MAX, 5, -7);
        assert_eq!((v + Vector3int16::new(1, 0, 0)).x, i16::MIN);
        assert_eq!(v.mul_n(0.5), Vector3int16::new(16383, 2, -3));
        assert_eq!(Vector2int16::new(4, 4) / Vector2int16::new(0, 3), Vector2int16::new(i16::MAX, 1));
    }

    #[test]
    fn test_udim2_display() {
        let u = UDim2::new(UDim::new(0.5, 10), UDim::new(1.0, -4));
        assert_eq!(u.to_string(), "{0.5, 10}, {1, -4}");
    }

    #[test]
    fn test_cframe_inverse() {
        let cf = CFrame::from_euler_angles_xyz(0.0, std::f32::consts::FRAC_PI_2, 0.0)
            + Vector3::new(3.0, 4.0, 5.0);
        let round_trip = cf * cf.inverse();
        for (got, want) in round_trip.components().iter().zip(CFrame::IDENTITY.components()) {
            assert!((got - want).abs() < 1e-5, "{got} != {want}");
        }
    }

    #[test]
    fn test_cframe_point_transform() {
        let cf = CFrame::from_position(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(cf * Vector3::new(1.0, 2.0, 3.0), Vector3::new(2.0, 2.0, 3.0));
        assert_eq!(
            cf.point_to_object_space(Vector3::new(2.0, 2.0, 3.0)),
            Vector3::new(1.0, 2.0, 3.0)
        );
        assert_eq!(CFrame::IDENTITY.look_vector(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_faces_bits() {
        let mut faces = Faces::default();
        assert!(faces.set_by_name("Top"));
        assert!(faces.set_by_name("Front"));
        assert!(!faces.set_by_name("Middle"));
        assert_eq!(faces.bits(), 0x22);
        assert_eq!(Faces::from_bits(0x22), faces);
        assert_eq!(faces.to_string(), "Top, Front");
    }

    #[test]
    fn test_axes_accept_face_names() {
        let mut axes = Axes::default();
        assert!(axes.set_by_name("Left"));
        assert!(axes.set_by_name("Z"));
        assert_eq!(axes, Axes { x: true, y: false, z: true });
        assert_eq!(Axes::from_bits(axes.bits()), axes);
    }

    #[test]
    fn test_number_range_rejects_inverted() {
        assert!(NumberRange::new(1.0, 2.0).is_ok());
        assert!(NumberRange::new(2.0, 2.0).is_ok());
        assert!(matches!(
            NumberRange::new(3.0, 2.0),
            Err(ValueError::Validation { kind: "NumberRange", .. })
        ));
        assert!(NumberRange::new(f32::NAN, 2.0).is_err());
    }

    #[test]
    fn test_region3_expand_to_grid() {
        let region = Region3::new(Vector3::new(-1.0, 0.5, 3.0), Vector3::new(2.5, 4.0, 4.5));
        let grid = region.expand_to_grid(4);
        assert_eq!(grid.min, Vector3::new(-4.0, 0.0, 0.0));
        assert_eq!(grid.max, Vector3::new(4.0, 4.0, 8.0));
        assert_eq!(region.size(), Vector3::new(3.5, 3.5, 1.5));
    }
}
