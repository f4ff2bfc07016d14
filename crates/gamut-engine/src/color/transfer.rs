/// sRGB inverse OETF: nonlinear sample → linear light.
#[inline]
pub fn oetf_inverse_srgb(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB OETF: linear light → nonlinear sample.
#[inline]
pub fn oetf_srgb(linear: f32) -> f32 {
    if linear <= 0.003_130_8 {
        12.92 * linear
    } else {
        1.055 * linear.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_then_encode_is_identity() {
        for c in [0.0, 0.02, 0.1, 0.5, 0.9, 1.0] {
            let back = oetf_srgb(oetf_inverse_srgb(c));
            assert!((back - c).abs() <= 1e-6, "{c} -> {back}");
        }
    }

    #[test]
    fn zero_maps_to_zero_both_ways() {
        assert_eq!(oetf_inverse_srgb(0.0), 0.0);
        assert_eq!(oetf_srgb(0.0), 0.0);
    }

    #[test]
    fn linear_segment_below_threshold() {
        assert_eq!(oetf_inverse_srgb(0.02), 0.02 / 12.92);
        assert_eq!(oetf_srgb(0.002), 12.92 * 0.002);
    }

    #[test]
    fn curves_are_monotonic() {
        let mut prev_dec = -1.0;
        let mut prev_enc = -1.0;
        for i in 0..=100 {
            let c = i as f32 / 100.0;
            let dec = oetf_inverse_srgb(c);
            let enc = oetf_srgb(c);
            assert!(dec > prev_dec && enc > prev_enc, "not monotonic at {c}");
            prev_dec = dec;
            prev_enc = enc;
        }
    }
}
