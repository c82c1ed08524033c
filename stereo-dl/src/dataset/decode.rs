//! Decoders for image, disparity and volume files.

use super::*;
use crate::common::*;
use image::{DynamicImage, GenericImageView as _};
use matfile::{MatFile, NumericData};
use std::{fs::File, io::BufReader};

/// The channel name of disparity values in EXR files.
pub const DISPARITY_CHANNEL: &str = "Disparity.Z";

/// The variable name of occupancy grids in MAT files.
pub const VOLUME_FIELD: &str = "Volume";

/// Load an image file in `[height, width, channels]` shape.
///
/// The pixel values are casted to float without scaling or color conversion, and
/// the channel count of the file is preserved, including the alpha channel.
pub fn load_rgb_image(path: impl AsRef<Path>) -> Result<Tensor> {
    let path = path.as_ref();
    let image = image::open(path)
        .with_context(|| format!("failed to load image file '{}'", path.display()))?;
    let (width, height) = image.dimensions();
    let channels = image.color().channel_count();

    let values: Vec<f32> = match &image {
        DynamicImage::ImageLuma16(buffer) => buffer.as_raw().iter().map(|&v| v as f32).collect(),
        DynamicImage::ImageLumaA16(buffer) => buffer.as_raw().iter().map(|&v| v as f32).collect(),
        DynamicImage::ImageRgb16(buffer) => buffer.as_raw().iter().map(|&v| v as f32).collect(),
        DynamicImage::ImageRgba16(buffer) => buffer.as_raw().iter().map(|&v| v as f32).collect(),
        image => image.as_bytes().iter().map(|&v| v as f32).collect(),
    };

    let tensor =
        Tensor::of_slice(&values).f_view([height as i64, width as i64, channels as i64])?;
    Ok(tensor)
}

/// Load a single channel of an EXR file in `[height, width]` shape.
///
/// The channel is matched by its full name, or by the layer name joined with the
/// channel name by a dot.
pub fn load_disparity_map(path: impl AsRef<Path>, channel: &str) -> Result<Tensor> {
    use exr::prelude::*;

    let path = path.as_ref();
    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .all_layers()
        .all_attributes()
        .from_file(path)
        .with_context(|| format!("failed to load disparity file '{}'", path.display()))?;

    let found = image.layer_data.iter().find_map(|layer| {
        let layer_name = layer
            .attributes
            .layer_name
            .as_ref()
            .map(|name| name.to_string());

        layer
            .channel_data
            .list
            .iter()
            .find(|candidate| {
                let name = candidate.name.to_string();
                name == channel
                    || layer_name
                        .as_ref()
                        .map(|layer_name| format!("{}.{}", layer_name, name) == channel)
                        .unwrap_or(false)
            })
            .map(|candidate| (layer.size, candidate))
    });

    let (size, found) = found.ok_or_else(|| DatasetError::MissingChannel {
        path: path.to_owned(),
        channel: channel.to_owned(),
    })?;
    let values: Vec<f32> = found.sample_data.values_as_f32().collect();
    let (width, height) = (size.0 as i64, size.1 as i64);

    let tensor = Tensor::of_slice(&values).f_view([height, width])?;
    Ok(tensor)
}

/// Load a 3-D numeric variable of a MAT file as a float tensor.
///
/// The column-major MATLAB layout is reordered so that the tensor dimensions
/// follow the MATLAB dimensions. A file without the variable, or with an empty
/// variable, results in [DatasetError::EmptyVolume].
pub fn load_volume(path: impl AsRef<Path>, field: &str) -> Result<Tensor> {
    let path = path.as_ref();
    let reader = BufReader::new(
        File::open(path)
            .with_context(|| format!("failed to open volume file '{}'", path.display()))?,
    );
    let mat = MatFile::parse(reader).map_err(|err| {
        format_err!(
            "failed to parse volume file '{}': {:?}",
            path.display(),
            err
        )
    })?;

    let empty_volume = || DatasetError::EmptyVolume {
        path: path.to_owned(),
    };
    let array = mat.find_by_name(field).ok_or_else(empty_volume)?;

    let values: Vec<f32> = match array.data() {
        NumericData::Int8 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::UInt8 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::Int16 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::UInt16 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::Int32 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::UInt32 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::Int64 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::UInt64 { real, .. } => real.iter().map(|&v| v as f32).collect(),
        NumericData::Single { real, .. } => real.clone(),
        NumericData::Double { real, .. } => real.iter().map(|&v| v as f32).collect(),
    };

    if values.is_empty() {
        return Err(empty_volume().into());
    }

    let dims: Vec<i64> = array.size().iter().map(|&dim| dim as i64).collect();
    ensure!(
        dims.len() == 3,
        "expect a 3-D volume in '{}', but get shape {:?}",
        path.display(),
        dims
    );

    // column-major to row-major
    let reversed: Vec<i64> = dims.iter().rev().cloned().collect();
    let tensor = Tensor::of_slice(&values)
        .f_view(reversed.as_slice())?
        .f_permute(&[2, 1, 0])?
        .contiguous();

    Ok(tensor)
}
