//! Asset access and image decode.
//!
//! The renderer reads exactly one named asset per surface generation and
//! needs it as a tightly packed RGBA8 bitmap. Where the bytes come from is
//! the [`AssetStore`]'s business.

mod bitmap;
mod store;

pub use bitmap::{decode_rgba8, Bitmap};
pub use store::{AssetError, AssetStore, DirAssets, MemoryAssets};

#[cfg(test)]
pub(crate) use bitmap::tests::png_bytes;

/// Opens `name` from `store` and decodes it to RGBA8.
pub fn load_bitmap<S: AssetStore + ?Sized>(store: &S, name: &str) -> Result<Bitmap, AssetError> {
    let bytes = store
        .read(name)
        .map_err(|source| AssetError::Read { name: name.to_string(), source })?;

    decode_rgba8(&bytes).map_err(|source| AssetError::Decode { name: name.to_string(), source })
}
