use crate::assets::Bitmap;
use crate::driver::{Driver, FilterMode};

/// Creates a texture holding `bitmap` as its complete base level, filtered
/// with `min`/`mag`. The bitmap stays with the caller.
pub fn upload_texture<D: Driver>(
    driver: &mut D,
    bitmap: &Bitmap,
    min: FilterMode,
    mag: FilterMode,
) -> Option<D::Texture> {
    let Some(mut texture) = driver.create_texture() else {
        log::error!("could not create texture object");
        return None;
    };
    driver.tex_image_2d(&mut texture, bitmap);
    driver.tex_filters(&mut texture, min, mag);
    log::debug!("uploaded {}x{} texture ({min:?}/{mag:?})", bitmap.width(), bitmap.height());
    Some(texture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;

    fn bitmap() -> Bitmap {
        Bitmap::from_rgba8(2, 3, vec![255; 2 * 3 * 4]).unwrap()
    }

    #[test]
    fn uploads_and_sets_filters() {
        let mut d = MockDriver::new();
        let tex = upload_texture(&mut d, &bitmap(), FilterMode::Nearest, FilterMode::Linear).unwrap();
        assert_eq!(tex.size, Some((2, 3)));
        assert_eq!(tex.filters, Some((FilterMode::Nearest, FilterMode::Linear)));
        assert_eq!(d.textures_created, 1);
    }

    #[test]
    fn creation_failure_is_none() {
        let mut d = MockDriver::new();
        d.fail_create_texture = true;
        assert!(upload_texture(&mut d, &bitmap(), FilterMode::Linear, FilterMode::Linear).is_none());
    }
}
