/// 3×3 matrix stored as three column vectors (the WGSL/GLSL `mat3` layout).
pub type Mat3 = [[f32; 3]; 3];

/// Linear Display P3 → CIE XYZ (D65), columns for R, G, B.
pub const DISPLAY_P3_TO_XYZ: Mat3 = [
    [0.486_570_95, 0.228_974_56, 0.0],
    [0.265_667_69, 0.691_738_52, 0.045_113_38],
    [0.198_217_29, 0.079_286_91, 1.043_944_37],
];

/// CIE XYZ (D65) → linear sRGB, columns for X, Y, Z.
pub const XYZ_TO_SRGB: Mat3 = [
    [3.240_969_94, -0.969_243_64, 0.055_630_08],
    [-1.537_383_18, 1.875_967_5, -0.203_976_96],
    [-0.498_610_76, 0.041_555_06, 1.056_971_51],
];

/// `m × v` for a column-major `m`.
#[inline]
pub(crate) fn mul(m: &Mat3, v: [f32; 3]) -> [f32; 3] {
    let mut out = [0.0; 3];
    for (col, &s) in m.iter().zip(v.iter()) {
        out[0] += col[0] * s;
        out[1] += col[1] * s;
        out[2] += col[2] * s;
    }
    out
}

/// Linear Display P3 → linear sRGB through XYZ.
#[inline]
pub fn display_p3_to_srgb_linear(rgb: [f32; 3]) -> [f32; 3] {
    mul(&XYZ_TO_SRGB, mul(&DISPLAY_P3_TO_XYZ, rgb))
}
