//! Display-P3 → sRGB color conversion.
//!
//! CPU reference for the math the fragment stage runs per texel
//! (`render/shaders/p3_to_srgb.frag.wgsl`). Both sides use the same transfer
//! curves and the same matrix coefficients, so GPU output can be checked
//! against [`display_p3_to_srgb`] within floating-point tolerance.
//!
//! Pipeline per texel:
//! 1. decode R, G, B from the sRGB-shaped curve (Display P3 shares it)
//! 2. linear P3 → CIE XYZ
//! 3. XYZ → linear sRGB
//! 4. re-encode with the sRGB curve
//! 5. alpha passes through

mod gamut;
mod transfer;

pub use gamut::{Mat3, DISPLAY_P3_TO_XYZ, XYZ_TO_SRGB, display_p3_to_srgb_linear};
pub use transfer::{oetf_inverse_srgb, oetf_srgb};

/// Converts one straight-alpha RGBA sample from nonlinear Display P3 to
/// nonlinear sRGB.
///
/// Out-of-gamut results are not clamped; the framebuffer does that.
pub fn display_p3_to_srgb(rgba: [f32; 4]) -> [f32; 4] {
    let [r, g, b, a] = rgba;
    let linear = [oetf_inverse_srgb(r), oetf_inverse_srgb(g), oetf_inverse_srgb(b)];
    let srgb = display_p3_to_srgb_linear(linear);
    [oetf_srgb(srgb[0]), oetf_srgb(srgb[1]), oetf_srgb(srgb[2]), a]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: [f32; 4], b: [f32; 4], eps: f32) {
        for i in 0..4 {
            assert!(
                (a[i] - b[i]).abs() <= eps,
                "channel {i}: {} vs {} (eps {eps})",
                a[i],
                b[i]
            );
        }
    }

    #[test]
    fn white_maps_to_white() {
        assert_close(display_p3_to_srgb([1.0, 1.0, 1.0, 1.0]), [1.0, 1.0, 1.0, 1.0], 1e-4);
    }

    #[test]
    fn black_is_a_fixed_point() {
        assert_eq!(display_p3_to_srgb([0.0, 0.0, 0.0, 1.0]), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn alpha_passes_through() {
        for a in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(display_p3_to_srgb([0.3, 0.6, 0.9, a])[3], a);
        }
    }

    #[test]
    fn neutral_grays_stay_neutral() {
        for v in [0.1, 0.18, 0.5, 0.75] {
            let out = display_p3_to_srgb([v, v, v, 1.0]);
            assert_close(out, [v, v, v, 1.0], 1e-4);
        }
    }

    #[test]
    fn pure_p3_red_is_outside_srgb() {
        let out = display_p3_to_srgb([1.0, 0.0, 0.0, 1.0]);
        assert!(out[0] > 1.0, "red should exceed the sRGB range: {out:?}");
        assert!(out[1] < 0.0, "green should go negative: {out:?}");
    }
}
