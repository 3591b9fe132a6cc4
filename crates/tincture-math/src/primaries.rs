//! RGB primaries and the RGB <-> XYZ matrices they define.
//!
//! A set of primaries is four CIE xy chromaticities: red, green, blue and the
//! white point. The RGB -> XYZ matrix has the primaries' XYZ as columns,
//! scaled so that RGB (1, 1, 1) lands on the white point with Y = 1.

use crate::Mat3;
use glam::{DMat3, DVec3};

/// D65 white point (xy).
pub const D65_XY: (f32, f32) = (0.31270, 0.32900);

/// D50 white point (xy).
pub const D50_XY: (f32, f32) = (0.34567, 0.35850);

/// Rec.709 luma weights, used for RGB -> gray.
pub const REC709_LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Chromaticities of an RGB color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primaries {
    /// Red primary (x, y).
    pub r: (f32, f32),
    /// Green primary (x, y).
    pub g: (f32, f32),
    /// Blue primary (x, y).
    pub b: (f32, f32),
    /// White point (x, y).
    pub w: (f32, f32),
    /// Display name.
    pub name: &'static str,
}

/// sRGB / Rec.709.
pub const SRGB: Primaries = Primaries {
    r: (0.6400, 0.3300),
    g: (0.3000, 0.6000),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "sRGB",
};

/// ITU-R BT.2020.
pub const REC2020: Primaries = Primaries {
    r: (0.7080, 0.2920),
    g: (0.1700, 0.7970),
    b: (0.1310, 0.0460),
    w: D65_XY,
    name: "Rec.2020",
};

/// Display P3 (P3 primaries, D65 white).
pub const DISPLAY_P3: Primaries = Primaries {
    r: (0.6800, 0.3200),
    g: (0.2650, 0.6900),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "Display P3",
};

/// Adobe RGB (1998).
pub const ADOBE_RGB: Primaries = Primaries {
    r: (0.6400, 0.3300),
    g: (0.2100, 0.7100),
    b: (0.1500, 0.0600),
    w: D65_XY,
    name: "Adobe RGB",
};

/// ProPhoto RGB (D50 white).
pub const PROPHOTO_RGB: Primaries = Primaries {
    r: (0.7347, 0.2653),
    g: (0.1596, 0.8404),
    b: (0.0366, 0.0001),
    w: D50_XY,
    name: "ProPhoto RGB",
};

/// Every built-in set, in registration order.
pub const BUILTIN_PRIMARIES: [Primaries; 5] = [SRGB, REC2020, DISPLAY_P3, ADOBE_RGB, PROPHOTO_RGB];

#[inline]
fn xy_to_xyz(xy: (f32, f32)) -> DVec3 {
    let (x, y) = (xy.0 as f64, xy.1 as f64);
    if y.abs() < 1e-12 {
        return DVec3::ZERO;
    }
    DVec3::new(x / y, 1.0, (1.0 - x - y) / y)
}

impl Primaries {
    /// Looks up a built-in set by display name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        BUILTIN_PRIMARIES
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// White point as XYZ with Y = 1.
    pub fn white_xyz(&self) -> [f32; 3] {
        xy_to_xyz(self.w).as_vec3().to_array()
    }

    fn rgb_to_xyz_f64(&self) -> DMat3 {
        let m = DMat3::from_cols(xy_to_xyz(self.r), xy_to_xyz(self.g), xy_to_xyz(self.b));
        let s = m.inverse() * xy_to_xyz(self.w);
        DMat3::from_cols(m.x_axis * s.x, m.y_axis * s.y, m.z_axis * s.z)
    }

    /// Linear RGB -> XYZ matrix.
    ///
    /// ```rust
    /// use tincture_math::SRGB;
    ///
    /// let m = SRGB.rgb_to_xyz();
    /// let white = m.transform([1.0, 1.0, 1.0]);
    /// assert!((white[1] - 1.0).abs() < 1e-6);
    /// ```
    pub fn rgb_to_xyz(&self) -> Mat3 {
        Mat3::from_dmat3(self.rgb_to_xyz_f64())
    }

    /// XYZ -> linear RGB matrix.
    pub fn xyz_to_rgb(&self) -> Mat3 {
        Mat3::from_dmat3(self.rgb_to_xyz_f64().inverse())
    }

    /// Luma weights (the Y row of [`Self::rgb_to_xyz`]).
    pub fn luma_weights(&self) -> [f32; 3] {
        self.rgb_to_xyz().m[1]
    }
}

impl Default for Primaries {
    fn default() -> Self {
        SRGB
    }
}
