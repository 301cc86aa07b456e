//! Vector and matrix types with the memory layout Metal expects.
//!
//! `Vec3` is padded to 16 bytes and `Mat4` is column-major, so these
//! types can be copied straight into vertex and uniform buffers and
//! read back as MSL `float3` / `float4x4` without translation.

use std::ops::Sub;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    _padding: f32,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            _padding: 0.0,
        }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[must_use]
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Returns the unit vector in the same direction, or zero if the
    /// vector has no length.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self::new(self.x / len, self.y / len, self.z / len)
        } else {
            Self::zero()
        }
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::zero()
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

#[allow(dead_code)]
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    #[allow(dead_code)]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// Column-major 4×4 matrix: `cols[c][r]` is row `r` of column `c`,
/// matching the element order of MSL `float4x4`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut result = [[0.0f32; 4]; 4];
        for c in 0..4 {
            for r in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.cols[k][r] * other.cols[c][k];
                }
                result[c][r] = sum;
            }
        }
        Self { cols: result }
    }

    #[allow(dead_code)]
    #[must_use]
    pub fn multiply_vec4(&self, v: &Vec4) -> Vec4 {
        let v = [v.x, v.y, v.z, v.w];
        let mut out = [0.0f32; 4];
        for (r, value) in out.iter_mut().enumerate() {
            *value = self.cols[0][r] * v[0]
                + self.cols[1][r] * v[1]
                + self.cols[2][r] * v[2]
                + self.cols[3][r] * v[3];
        }
        Vec4::new(out[0], out[1], out[2], out[3])
    }

    #[must_use]
    pub fn rotation_y(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            cols: [
                [cos, 0.0, -sin, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [sin, 0.0, cos, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[must_use]
    pub fn rotation_z(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            cols: [
                [cos, sin, 0.0, 0.0],
                [-sin, cos, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Right-handed view matrix looking from `eye` toward `target`.
    #[must_use]
    pub fn look_at(eye: &Vec3, target: &Vec3, up: &Vec3) -> Self {
        let forward = (*target - *eye).normalize();
        let right = forward.cross(up).normalize();
        let true_up = right.cross(&forward);

        Self {
            cols: [
                [right.x, true_up.x, -forward.x, 0.0],
                [right.y, true_up.y, -forward.y, 0.0],
                [right.z, true_up.z, -forward.z, 0.0],
                [-right.dot(eye), -true_up.dot(eye), forward.dot(eye), 1.0],
            ],
        }
    }

    /// Right-handed perspective projection with depth mapped to [0, 1],
    /// Metal's clip-space convention.
    #[must_use]
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let focal = 1.0 / (fov_y / 2.0).tan();
        Self {
            cols: [
                [focal / aspect, 0.0, 0.0, 0.0],
                [0.0, focal, 0.0, 0.0],
                [0.0, 0.0, far / (near - far), -1.0],
                [0.0, 0.0, (near * far) / (near - far), 0.0],
            ],
        }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}
