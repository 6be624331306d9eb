//! In-memory GeoTIFF decoding and encoding
//!
//! Exported imagery arrives as GeoTIFF bytes over HTTP; this module decodes
//! them into `Raster<T>` without touching the filesystem. The encoder exists
//! for tests and offline fixtures.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};

/// Decode a single-band GeoTIFF from a byte buffer.
///
/// Sample values are cast into `T`; values that do not fit become the
/// type's default nodata. A zero-element grid is reported as
/// [`Error::EmptyRaster`], never returned as a degenerate success.
pub fn decode_geotiff<T: RasterElement>(bytes: &[u8]) -> Result<Raster<T>> {
    let mut decoder =
        Decoder::new(Cursor::new(bytes)).map_err(|e| Error::Decode(e.to_string()))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Decode(format!("cannot read dimensions: {e}")))?;
    let (rows, cols) = (height as usize, width as usize);
    if rows == 0 || cols == 0 {
        return Err(Error::EmptyRaster);
    }

    let result = decoder
        .read_image()
        .map_err(|e| Error::Decode(format!("cannot read image data: {e}")))?;

    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_samples(&buf),
        DecodingResult::U16(buf) => cast_samples(&buf),
        DecodingResult::U32(buf) => cast_samples(&buf),
        DecodingResult::I16(buf) => cast_samples(&buf),
        DecodingResult::I32(buf) => cast_samples(&buf),
        DecodingResult::F32(buf) => cast_samples(&buf),
        DecodingResult::F64(buf) => cast_samples(&buf),
        other => {
            return Err(Error::UnsupportedPixelFormat(format!("{other:?}")));
        }
    };

    if data.is_empty() {
        return Err(Error::EmptyRaster);
    }
    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    Ok(raster)
}

fn cast_samples<S, T>(buf: &[S]) -> Vec<T>
where
    S: Copy + num_traits::NumCast,
    T: RasterElement,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

/// Read ModelPixelScale + ModelTiepoint into a north-up geotransform.
///
/// The decoder resolves well-known tag numbers to named variants, so the
/// lookups must use `Tag::ModelPixelScaleTag`/`Tag::ModelTiepointTag`;
/// `Tag::Unknown(33550)` never matches a parsed directory entry.
fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Decode("missing pixel scale tag".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Decode("missing tiepoint tag".into()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Decode("malformed georeferencing tags".into()));
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [sx, sy, sz]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Encode a raster as a single-band 32-bit float GeoTIFF buffer.
pub fn encode_geotiff<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut encoder =
            TiffEncoder::new(&mut buffer).map_err(|e| Error::Decode(e.to_string()))?;

        let (rows, cols) = raster.shape();
        let data: Vec<f32> = raster
            .data()
            .iter()
            .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
            .collect();

        let mut image = encoder
            .new_image::<Gray32Float>(cols as u32, rows as u32)
            .map_err(|e| Error::Decode(format!("cannot create TIFF image: {e}")))?;

        let gt = raster.transform();
        let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &scale[..])
            .map_err(|e| Error::Decode(format!("cannot write scale tag: {e}")))?;

        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        image
            .encoder()
            .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
            .map_err(|e| Error::Decode(format!("cannot write tiepoint tag: {e}")))?;

        image
            .write_data(&data)
            .map_err(|e| Error::Decode(format!("cannot write image data: {e}")))?;
    }
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip_preserves_grid_and_transform() {
        let mut r: Raster<f64> = Raster::new(4, 5);
        r.set_transform(GeoTransform::new(-74.01, 4.51, 0.0001, -0.0001));
        for row in 0..4 {
            for col in 0..5 {
                r.set(row, col, (row * 5 + col) as f64).unwrap();
            }
        }

        let bytes = encode_geotiff(&r).unwrap();
        let back: Raster<f64> = decode_geotiff(&bytes).unwrap();

        assert_eq!(back.shape(), (4, 5));
        assert_eq!(back.get(2, 3).unwrap(), 13.0);
        let gt = back.transform();
        assert!((gt.origin_x - -74.01).abs() < 1e-9);
        assert!((gt.origin_y - 4.51).abs() < 1e-9);
        assert!((gt.pixel_width - 0.0001).abs() < 1e-12);
        assert!((gt.pixel_height - -0.0001).abs() < 1e-12);
    }

    #[test]
    fn encoded_bytes_carry_georeferencing_tags() {
        let mut r: Raster<f64> = Raster::new(3, 3);
        r.set_transform(GeoTransform::new(10.0, 20.0, 0.5, -0.5));
        let bytes = encode_geotiff(&r).unwrap();

        let mut decoder = Decoder::new(Cursor::new(bytes.as_slice())).unwrap();
        let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).unwrap();
        let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).unwrap();
        assert_eq!(scale, vec![0.5, 0.5, 0.0]);
        assert_eq!(tiepoint, vec![0.0, 0.0, 0.0, 10.0, 20.0, 0.0]);
    }

    #[test]
    fn garbage_bytes_fail_typed() {
        let err = decode_geotiff::<f64>(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
