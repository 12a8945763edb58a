//! Native GeoTIFF reading/writing built on the `tiff` crate.
//!
//! Single-band rasters are read from the first sample of each pixel;
//! multi-sample (chunky) files are read whole as a [`SpectralCube`].
//! The decoder reports at most four samples per pixel, so cubes with more
//! bands are assembled by stacking several files (see
//! [`SpectralCube::from_bands`]). Only the pixel scale and tiepoint tags
//! are interpreted.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement, SpectralCube};
use ndarray::Array3;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tiff::ColorType;

const MODEL_PIXEL_SCALE: Tag = Tag::ModelPixelScaleTag;
const MODEL_TIEPOINT: Tag = Tag::ModelTiepointTag;
const GEO_KEY_DIRECTORY: Tag = Tag::Unknown(34735);

/// Read the first band of a GeoTIFF file
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_band(file)
}

/// Read the first band of an in-memory GeoTIFF
pub fn read_geotiff_from_buffer<T: RasterElement>(data: &[u8]) -> Result<Raster<T>> {
    decode_band(Cursor::new(data))
}

/// Read every sample of a GeoTIFF as the bands of a cube
pub fn read_cube<P: AsRef<Path>>(path: P) -> Result<SpectralCube> {
    let file = File::open(path.as_ref())?;
    let decoded = decode(file)?;
    let array = Array3::from_shape_vec((decoded.lines, decoded.samples, decoded.bands), decoded.values)
        .map_err(|e| Error::Other(e.to_string()))?;
    let mut cube = SpectralCube::from_array(array);
    if let Some(transform) = decoded.transform {
        cube.set_transform(transform);
    }
    Ok(cube)
}

struct Decoded {
    lines: usize,
    samples: usize,
    bands: usize,
    /// Pixel-interleaved values, `lines * samples * bands` long
    values: Vec<f64>,
    transform: Option<GeoTransform>,
}

fn decode_band<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let decoded = decode(reader)?;
    let data: Vec<T> = decoded
        .values
        .chunks_exact(decoded.bands)
        .map(|px| T::from_f64(px[0]))
        .collect();

    let mut raster = Raster::from_vec(data, decoded.lines, decoded.samples)?;
    if let Some(transform) = decoded.transform {
        raster.set_transform(transform);
    }
    Ok(raster)
}

fn decode<R: Read + Seek>(reader: R) -> Result<Decoded> {
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let colortype = decoder
        .colortype()
        .map_err(|e| Error::Other(format!("Cannot read color type: {}", e)))?;
    let bands = samples_per_pixel(colortype)?;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let values: Vec<f64> = match result {
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    let lines = height as usize;
    let samples = width as usize;
    if values.len() != lines * samples * bands {
        return Err(Error::InvalidDimensions { samples, lines });
    }

    Ok(Decoded {
        lines,
        samples,
        bands,
        values,
        transform: read_geotransform(&mut decoder),
    })
}

fn samples_per_pixel(colortype: ColorType) -> Result<usize> {
    match colortype {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) | ColorType::CMYK(_) => Ok(4),
        other => Err(Error::UnsupportedDataType(format!("{:?}", other))),
    }
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(MODEL_PIXEL_SCALE).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(MODEL_TIEPOINT).ok()?;

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }
    Some(GeoTransform::new(
        tiepoint[3] - tiepoint[0] * scale[0],
        tiepoint[4] + tiepoint[1] * scale[1],
        scale[0],
        -scale[1],
    ))
}

/// Write a raster to a 32-bit float GeoTIFF file.
///
/// Label rasters round-trip exactly for ids below 2^24.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode(raster, file)
}

/// Write a raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T: RasterElement>(raster: &Raster<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;
    let (lines, samples) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(samples as u32, lines as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    // Version 1.1.0 with two keys: projected model, pixel-is-area.
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];

    let tag_err = |e: tiff::TiffError| Error::Other(format!("Cannot write GeoTIFF tag: {}", e));
    image.encoder().write_tag(MODEL_PIXEL_SCALE, &scale[..]).map_err(tag_err)?;
    image.encoder().write_tag(MODEL_TIEPOINT, &tiepoint[..]).map_err(tag_err)?;
    image.encoder().write_tag(GEO_KEY_DIRECTORY, &geokeys[..]).map_err(tag_err)?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_roundtrip_keeps_values_and_transform() {
        let mut labels = Raster::from_vec(vec![0i32, 1, 1, 2, 7, 7], 2, 3).unwrap();
        labels.set_transform(GeoTransform::new(500.0, 900.0, 30.0, -30.0));

        let buf = write_geotiff_to_buffer(&labels).unwrap();
        let back: Raster<i32> = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.get(1, 1).unwrap(), 7);
        assert_eq!(back.transform(), labels.transform());
    }

    #[test]
    fn test_file_roundtrip_as_single_band_cube() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.tif");
        let edges = Raster::from_vec(vec![0.25, 0.5, 0.75, 1.0], 2, 2).unwrap();
        write_geotiff(&edges, &path).unwrap();

        let cube = read_cube(&path).unwrap();
        assert_eq!(cube.bands(), 1);
        assert_eq!(cube.spectrum(1, 1).unwrap(), &[1.0]);
    }

    #[test]
    fn test_file_roundtrip_keeps_transform() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.tif");
        let mut edges = Raster::from_vec(vec![0.0, 1.0, 2.0, 3.0], 2, 2).unwrap();
        let transform = GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0);
        edges.set_transform(transform);
        write_geotiff(&edges, &path).unwrap();

        let back: Raster<f64> = read_geotiff(&path).unwrap();
        assert_eq!(back.transform(), &transform);
        assert_eq!(read_cube(&path).unwrap().transform(), &transform);
    }

    #[test]
    fn test_read_cube_multi_sample() {
        use tiff::encoder::colortype::RGB32Float;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.tif");
        // 3 samples x 2 lines, 3 bands per pixel, pixel-interleaved
        let values: Vec<f32> = (0..18).map(|v| v as f32).collect();
        {
            let file = File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(file).unwrap();
            encoder.write_image::<RGB32Float>(3, 2, &values).unwrap();
        }

        let cube = read_cube(&path).unwrap();
        assert_eq!(cube.shape(), (2, 3));
        assert_eq!(cube.bands(), 3);
        assert_eq!(cube.spectrum(0, 0).unwrap(), &[0.0, 1.0, 2.0]);
        // x = 2, y = 1 is pixel 5
        assert_eq!(cube.spectrum(2, 1).unwrap(), &[15.0, 16.0, 17.0]);
        assert_eq!(cube.get_band(1).unwrap().get(1, 0).unwrap(), 10.0);

        let first: Raster<f64> = read_geotiff(&path).unwrap();
        assert_eq!(first.get(1, 2).unwrap(), 15.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result: Result<Raster<f64>> = read_geotiff("/nonexistent/edges.tif");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
