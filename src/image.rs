//! RGBA8 pixel buffers for sprites and the sheets they're packed into.

use std::io::{Read, Write};

use thiserror::Error;

const RGBA_STRIDE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error(transparent)]
    Decode {
        #[from]
        source: png::DecodingError,
    },

    #[error(transparent)]
    Encode {
        #[from]
        source: png::EncodingError,
    },

    #[error("PNG images with color type {color_type:?} aren't supported")]
    UnsupportedColor { color_type: png::ColorType },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    size: (u32, u32),
    data: Vec<u8>,
}

impl Image {
    pub fn new_rgba8<D: Into<Vec<u8>>>(size: (u32, u32), data: D) -> Self {
        let data = data.into();

        assert_eq!(
            data.len(),
            size.0 as usize * size.1 as usize * RGBA_STRIDE,
            "pixel data doesn't match a {}x{} RGBA8 image",
            size.0,
            size.1
        );

        Self { size, data }
    }

    pub fn new_empty_rgba8(size: (u32, u32)) -> Self {
        let data = vec![0; size.0 as usize * size.1 as usize * RGBA_STRIDE];
        Self::new_rgba8(size, data)
    }

    /// Decodes a PNG, converting palette, grayscale, RGB, and 16-bit images
    /// to 8-bit RGBA.
    pub fn decode_png<R: Read>(input: R) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(input);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

        let (info, mut reader) = decoder.read_info()?;

        let mut raw = vec![0; info.buffer_size()];
        reader.next_frame(&mut raw)?;

        let channels = match info.color_type {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::RGB => 3,
            png::ColorType::RGBA => 4,
            color_type => return Err(ImageError::UnsupportedColor { color_type }),
        };

        let mut data = Vec::with_capacity(info.width as usize * info.height as usize * RGBA_STRIDE);
        for source in raw.chunks_exact(channels) {
            let pixel = match *source {
                [gray] => [gray, gray, gray, 255],
                [gray, alpha] => [gray, gray, gray, alpha],
                [r, g, b] => [r, g, b, 255],
                [r, g, b, a] => [r, g, b, a],
                _ => unreachable!("chunks_exact yields {} channels", channels),
            };

            data.extend_from_slice(&pixel);
        }

        Ok(Self::new_rgba8((info.width, info.height), data))
    }

    pub fn encode_png<W: Write>(&self, output: W) -> Result<(), ImageError> {
        let mut encoder = png::Encoder::new(output, self.size.0, self.size.1);
        encoder.set_color(png::ColorType::RGBA);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.data)?;

        // The final chunk is written when `writer` is dropped.
        Ok(())
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Copies all of `other` into this image with its top-left corner at
    /// `pos`. Rows or columns that would land outside of this image are
    /// clipped.
    pub fn blit(&mut self, other: &Image, pos: (u32, u32)) {
        if pos.0 >= self.size.0 || pos.1 >= self.size.1 {
            return;
        }

        let visible_width = other.size.0.min(self.size.0 - pos.0) as usize;
        let visible_height = other.size.1.min(self.size.1 - pos.1) as usize;

        let other_row_bytes = other.size.0 as usize * RGBA_STRIDE;
        let self_row_bytes = self.size.0 as usize * RGBA_STRIDE;
        let copied_bytes = visible_width * RGBA_STRIDE;

        for row in 0..visible_height {
            let source_start = row * other_row_bytes;
            let target_start =
                (pos.1 as usize + row) * self_row_bytes + pos.0 as usize * RGBA_STRIDE;

            self.data[target_start..target_start + copied_bytes]
                .copy_from_slice(&other.data[source_start..source_start + copied_bytes]);
        }
    }

    pub fn get_pixel(&self, pos: (u32, u32)) -> Pixel {
        let start = self.pixel_offset(pos);

        Pixel {
            r: self.data[start],
            g: self.data[start + 1],
            b: self.data[start + 2],
            a: self.data[start + 3],
        }
    }

    pub fn set_pixel(&mut self, pos: (u32, u32), pixel: Pixel) {
        let start = self.pixel_offset(pos);

        self.data[start..start + RGBA_STRIDE].copy_from_slice(&[pixel.r, pixel.g, pixel.b, pixel.a]);
    }

    fn pixel_offset(&self, pos: (u32, u32)) -> usize {
        assert!(pos.0 < self.size.0, "x {} is out of bounds", pos.0);
        assert!(pos.1 < self.size.1, "y {} is out of bounds", pos.1);

        RGBA_STRIDE * (pos.0 as usize + pos.1 as usize * self.size.0 as usize)
    }
}
