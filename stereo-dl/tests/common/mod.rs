#![allow(dead_code)]

use anyhow::Result;
use image::{Rgba, RgbaImage};
use std::{fs, path::Path};
use stereo_dl::dataset::{
    PathTemplate, PathTemplates, Taxonomy, TaxonomyManifest, DISPARITY_CHANNEL,
};

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MX_DOUBLE_CLASS: u32 = 6;

/// Write a little-endian MAT level 5 file with at most one double array.
///
/// `values` are given in column-major order.
pub fn write_mat_file(path: &Path, array: Option<(&str, &[usize], &[f64])>) -> Result<()> {
    let mut header = b"MATLAB 5.0 MAT-file, written by stereo-dl tests".to_vec();
    header.resize(116, b' ');
    header.extend_from_slice(&[0; 8]);
    header.extend_from_slice(&[0x00, 0x01]);
    header.extend_from_slice(b"IM");

    let mut bytes = header;

    if let Some((name, dims, values)) = array {
        let mut matrix = vec![];

        let flags: Vec<u8> = [MX_DOUBLE_CLASS, 0]
            .iter()
            .flat_map(|value| value.to_le_bytes())
            .collect();
        write_element(&mut matrix, MI_UINT32, &flags);

        let dims: Vec<u8> = dims
            .iter()
            .flat_map(|&dim| (dim as i32).to_le_bytes())
            .collect();
        write_element(&mut matrix, MI_INT32, &dims);

        write_element(&mut matrix, MI_INT8, name.as_bytes());

        let values: Vec<u8> = values.iter().flat_map(|value| value.to_le_bytes()).collect();
        write_element(&mut matrix, MI_DOUBLE, &values);

        write_element(&mut bytes, MI_MATRIX, &matrix);
    }

    fs::write(path, bytes)?;
    Ok(())
}

fn write_element(buffer: &mut Vec<u8>, data_type: u32, data: &[u8]) {
    buffer.extend_from_slice(&data_type.to_le_bytes());
    buffer.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buffer.extend_from_slice(data);
    let padding = (8 - data.len() % 8) % 8;
    buffer.extend(std::iter::repeat(0u8).take(padding));
}

/// Write a single channel EXR file with row-major `values`.
pub fn write_disparity_file(
    path: &Path,
    channel: &str,
    width: usize,
    height: usize,
    values: &[f32],
) -> Result<()> {
    use exr::prelude::*;

    assert_eq!(values.len(), width * height);
    let channel = AnyChannel::new(channel, FlatSamples::F32(values.to_vec()));
    let channels = AnyChannels::sort(vec![channel].into());
    let layer = Layer::new(
        (width, height),
        LayerAttributes::default(),
        Encoding::UNCOMPRESSED,
        channels,
    );
    Image::from_layer(layer).write().to_file(path)?;
    Ok(())
}

/// Write an opaque RGBA image filled with one color.
pub fn write_rgba_file(path: &Path, width: u32, height: u32, color: [u8; 3]) -> Result<()> {
    let [red, green, blue] = color;
    let image = RgbaImage::from_pixel(width, height, Rgba([red, green, blue, 255]));
    image.save(path)?;
    Ok(())
}

pub const IMAGE_WIDTH: usize = 4;
pub const IMAGE_HEIGHT: usize = 3;
pub const VOLUME_SIZE: usize = 4;

/// A sample written by [write_sample].
pub struct SampleFixture<'a> {
    pub taxonomy_id: &'a str,
    pub sample_name: &'a str,
    /// The fraction of occupied voxels, or `None` to omit the volume file.
    pub occupancy: Option<f64>,
}

pub fn templates(root: &Path) -> PathTemplates {
    let root = root.display();
    let parse = |text: String| -> PathTemplate { text.parse().unwrap() };
    PathTemplates {
        left_rgb: parse(format!("{}/%s/%s/render_%02d_l.png", root)),
        right_rgb: parse(format!("{}/%s/%s/render_%02d_r.png", root)),
        left_disparity: parse(format!("{}/%s/%s/disp_%02d_l.exr", root)),
        right_disparity: parse(format!("{}/%s/%s/disp_%02d_r.exr", root)),
        volume: parse(format!("{}/%s/%s/model.mat", root)),
    }
}

/// Write the files of a sample. The pixels of view `i` have value `10 * i` and the
/// disparity maps are filled with the view index.
pub fn write_sample(root: &Path, num_views: usize, sample: &SampleFixture) -> Result<()> {
    let SampleFixture {
        taxonomy_id,
        sample_name,
        occupancy,
    } = *sample;
    let templates = templates(root);
    fs::create_dir_all(root.join(taxonomy_id).join(sample_name))?;

    for view in 0..num_views {
        let value = (view * 10) as u8;
        let disparity = vec![view as f32; IMAGE_WIDTH * IMAGE_HEIGHT];

        write_rgba_file(
            &templates.left_rgb.view_path(taxonomy_id, sample_name, view)?,
            IMAGE_WIDTH as u32,
            IMAGE_HEIGHT as u32,
            [value; 3],
        )?;
        write_rgba_file(
            &templates.right_rgb.view_path(taxonomy_id, sample_name, view)?,
            IMAGE_WIDTH as u32,
            IMAGE_HEIGHT as u32,
            [value; 3],
        )?;
        write_disparity_file(
            &templates.left_disparity.view_path(taxonomy_id, sample_name, view)?,
            DISPARITY_CHANNEL,
            IMAGE_WIDTH,
            IMAGE_HEIGHT,
            &disparity,
        )?;
        write_disparity_file(
            &templates.right_disparity.view_path(taxonomy_id, sample_name, view)?,
            DISPARITY_CHANNEL,
            IMAGE_WIDTH,
            IMAGE_HEIGHT,
            &disparity,
        )?;
    }

    if let Some(occupancy) = occupancy {
        let num_voxels = VOLUME_SIZE.pow(3);
        let num_occupied = (num_voxels as f64 * occupancy).round() as usize;
        let values: Vec<f64> = (0..num_voxels)
            .map(|index| if index < num_occupied { 1.0 } else { 0.0 })
            .collect();
        write_mat_file(
            &templates.volume.sample_path(taxonomy_id, sample_name)?,
            Some(("Volume", &[VOLUME_SIZE; 3][..], &values[..])),
        )?;
    }

    Ok(())
}

/// Build a manifest where every sample is listed in the test split.
pub fn manifest(taxonomies: &[(&str, &str, &[&str])]) -> TaxonomyManifest {
    let taxonomies = taxonomies.iter().map(|&(id, name, samples)| Taxonomy {
        taxonomy_id: id.to_owned(),
        taxonomy_name: name.to_owned(),
        train: vec![],
        test: samples.iter().map(|&sample| sample.to_owned()).collect(),
        val: vec![],
    });
    TaxonomyManifest::new(taxonomies).unwrap()
}
