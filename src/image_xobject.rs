// This code is inspired by https://github.com/fschutt/printpdf/blob/2bebdc65d06dafbe926ed4b43fedd10f966c59d3/src/xobject.rs

use crate::Error;
use lopdf::ObjectId;
use png::{ColorType, Transformations};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageXObject {
    /// Width of the image (original width, not scaled width)
    pub width: u32,
    /// Height of the image (original height, not scaled height)
    pub height: u32,
    /// Only `Rgb` and `Grayscale` remain after decoding.
    pub color_space: ColorType,
    /// Should the image be interpolated when scaled?
    pub interpolate: bool,
    /// 8 bit samples, alpha already split off.
    pub image_data: Vec<u8>,
    /// Image used as a soft mask. (transparency)
    pub s_mask: Option<ObjectId>,
}

impl ImageXObject {
    /// Returns 1 or 2 images. The first is the color images.
    /// The second is (if present) the mask/alpha channel of the image.
    pub fn try_from<R: Read>(
        mut image_decoder: png::Decoder<R>,
    ) -> Result<(Self, Option<Self>), Error> {
        // Palette and sub-byte images are expanded, 16 bit samples are stripped,
        // so every sample below is exactly one byte.
        image_decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut image_reader = image_decoder.read_info()?;
        // Allocate the output buffer.
        let mut buf = vec![0; image_reader.output_buffer_size()];
        // Read the next frame. An APNG might contain multiple frames.
        let info = image_reader.next_frame(&mut buf)?;
        let image_data = &buf[..info.buffer_size()];

        let (color_type, image_color_data, alpha_data) = match info.color_type {
            ColorType::Rgba => {
                let (color, alpha) = split_alpha(image_data, 3);
                (ColorType::Rgb, color, Some(alpha))
            }
            ColorType::GrayscaleAlpha => {
                let (color, alpha) = split_alpha(image_data, 1);
                (ColorType::Grayscale, color, Some(alpha))
            }
            ColorType::Rgb => (ColorType::Rgb, image_data.to_vec(), None),
            ColorType::Grayscale => (ColorType::Grayscale, image_data.to_vec(), None),
            ColorType::Indexed => {
                return Err(Error::from("PNG palette was not expanded."));
            }
        };
        log::trace!(
            "Decoded {}x{} {:?} image (alpha: {}).",
            info.width,
            info.height,
            color_type,
            alpha_data.is_some()
        );

        Ok((
            Self {
                width: info.width,
                height: info.height,
                color_space: color_type,
                image_data: image_color_data,
                interpolate: false,
                s_mask: None, // This should be filled in later
            },
            alpha_data.map(|alpha_data| Self {
                width: info.width,
                height: info.height,
                color_space: ColorType::Grayscale,
                image_data: alpha_data,
                interpolate: false,
                s_mask: None,
            }),
        ))
    }
}

/// Split interleaved `color_channels + 1` byte pixels into color and alpha planes.
fn split_alpha(data: &[u8], color_channels: usize) -> (Vec<u8>, Vec<u8>) {
    let pixel_len = color_channels + 1;
    let pixels = data.len() / pixel_len;
    let mut color = Vec::with_capacity(pixels * color_channels);
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in data.chunks_exact(pixel_len) {
        color.extend_from_slice(&pixel[..color_channels]);
        alpha.push(pixel[color_channels]);
    }
    (color, alpha)
}

// Inspired and derived from: https://github.com/fschutt/printpdf/blob/2bebdc65d06dafbe926ed4b43fedd10f966c59d3/src/xobject.rs#L245
impl From<ImageXObject> for lopdf::Stream {
    fn from(image: ImageXObject) -> Self {
        use lopdf::Object::*;

        let cs: &'static str = match image.color_space {
            ColorType::Rgb | ColorType::Rgba => "DeviceRGB",
            _ => "DeviceGray",
        };

        let mut dict = lopdf::Dictionary::from_iter(vec![
            ("Type", Name("XObject".as_bytes().to_vec())),
            ("Subtype", Name("Image".as_bytes().to_vec())),
            ("Width", Integer(i64::from(image.width))),
            ("Height", Integer(i64::from(image.height))),
            ("Interpolate", image.interpolate.into()),
            ("BitsPerComponent", Integer(8)),
            ("ColorSpace", Name(cs.as_bytes().to_vec())),
        ]);
        if let Some(s_mask) = image.s_mask {
            dict.set("SMask", Reference(s_mask));
        }

        lopdf::Stream::new(dict, image.image_data)
    }
}

impl From<ImageXObject> for lopdf::Object {
    fn from(image: ImageXObject) -> Self {
        lopdf::Object::Stream(image.into())
    }
}
