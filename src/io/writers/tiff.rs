use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use ndarray::Array2;
use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::Gray64Float;
use tiff::tags::Tag;

use crate::error::{Error, Result};
use crate::io::grid::GridGeometry;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

/// Write a single-band Float64 GeoTIFF georeferenced by `grid`.
///
/// `data` is `(rows, cols)` matching the grid; `nodata` goes to the GDAL_NODATA tag.
pub fn write_geotiff_f64(
    output: &Path,
    grid: &GridGeometry,
    data: &Array2<f64>,
    nodata: f64,
) -> Result<()> {
    let file = BufWriter::new(File::create(output)?);
    encode_geotiff_f64(file, grid, data, nodata)
}

fn encode_geotiff_f64<W: Write + Seek>(
    writer: W,
    grid: &GridGeometry,
    data: &Array2<f64>,
    nodata: f64,
) -> Result<()> {
    let (rows, cols) = data.dim();
    if rows != grid.rows() || cols != grid.cols() {
        return Err(Error::value(format!(
            "raster is {}x{} but grid is {}x{}",
            rows,
            cols,
            grid.rows(),
            grid.cols()
        )));
    }

    let mut encoder = TiffEncoder::new(writer)?;
    let mut image = encoder.new_image::<Gray64Float>(cols as u32, rows as u32)?;

    let scale = [grid.xres, grid.yres, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, grid.xmin, grid.ymax, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])?;

    // Version 1.1.0 with GTRasterTypeGeoKey = RasterPixelIsArea; the CRS
    // itself travels in the .prj sidecar.
    let geokeys: [u16; 8] = [1, 1, 0, 1, 1025, 0, 1, 1];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &geokeys[..])?;

    let nodata_str = format!("{}", nodata);
    image
        .encoder()
        .write_tag(Tag::Unknown(GDAL_NODATA), nodata_str.as_str())?;

    let samples: Vec<f64> = data.iter().copied().collect();
    image.write_data(&samples)?;
    Ok(())
}
