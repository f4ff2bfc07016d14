//! Static geometry of the full-viewport quad.

/// Clip-space positions, `(x, y, z)` per vertex, in triangle-strip order.
pub const VERTICES: [f32; 12] = [
    -1.0, 1.0, 0.0, // top left
    -1.0, -1.0, 0.0, // bottom left
    1.0, 1.0, 0.0, // top right
    1.0, -1.0, 0.0, // bottom right
];

/// Texture coordinates, `(u, v)` per vertex, with `v` growing downwards so
/// the first bitmap row lands at the top.
pub const TEXCOORDS: [f32; 8] = [
    0.0, 0.0, //
    0.0, 1.0, //
    1.0, 0.0, //
    1.0, 1.0, //
];

pub const POSITION_COMPONENTS: u32 = 3;
pub const TEXCOORD_COMPONENTS: u32 = 2;
pub const VERTEX_COUNT: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space() {
        let xs: Vec<f32> = VERTICES.chunks(3).map(|v| v[0]).collect();
        let ys: Vec<f32> = VERTICES.chunks(3).map(|v| v[1]).collect();
        assert_eq!(VERTICES.len() as u32, VERTEX_COUNT * POSITION_COMPONENTS);
        assert!(xs.contains(&-1.0) && xs.contains(&1.0));
        assert!(ys.contains(&-1.0) && ys.contains(&1.0));
        assert!(VERTICES.chunks(3).all(|v| v[2] == 0.0));
    }

    #[test]
    fn corners_map_to_unit_square() {
        assert_eq!(TEXCOORDS.len() as u32, VERTEX_COUNT * TEXCOORD_COMPONENTS);
        for (pos, uv) in VERTICES.chunks(3).zip(TEXCOORDS.chunks(2)) {
            // x = -1 → u = 0, y = 1 → v = 0
            assert_eq!(uv[0], (pos[0] + 1.0) / 2.0);
            assert_eq!(uv[1], (1.0 - pos[1]) / 2.0);
        }
    }
}
