//! Shared test utilities: small generated images and GIFs on disk.

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, Frame, ImageBuffer, ImageFormat, Rgb, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

/// Write a gradient image; the format follows the extension.
pub fn create_test_image(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128u8])
    });
    img.save(path).unwrap();
}

/// Write a JPEG whose APP1 segment carries an EXIF orientation tag.
pub fn create_oriented_jpeg(path: &Path, width: u32, height: u32, orientation: u16) {
    let mut jpeg = Cursor::new(Vec::new());
    ImageBuffer::from_pixel(width, height, Rgb([200u8, 40, 40]))
        .write_to(&mut jpeg, ImageFormat::Jpeg)
        .unwrap();
    let jpeg = jpeg.into_inner();

    // Little-endian TIFF header, one IFD entry: 0x0112 SHORT x1
    let mut exif = b"Exif\0\0II\x2a\0\x08\0\0\0\x01\0\x12\x01\x03\0\x01\0\0\0".to_vec();
    exif.extend_from_slice(&orientation.to_le_bytes());
    exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    let segment_len = (exif.len() + 2) as u16;
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&exif);
    out.extend_from_slice(&jpeg[2..]);
    std::fs::write(path, out).unwrap();
}

/// Write an infinitely looping GIF with `frames` solid-colored frames.
pub fn create_animated_gif(path: &Path, width: u32, height: u32, frames: u32, delay_ms: u32) {
    let file = File::create(path).unwrap();
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite).unwrap();

    let delay = Delay::from_numer_denom_ms(delay_ms, 1);
    let gif_frames = (0..frames).map(|i| {
        // Distinct colors so the encoder can't merge frames
        let shade = ((i * 70) % 256) as u8;
        let buffer: RgbaImage =
            ImageBuffer::from_pixel(width, height, Rgba([shade, 255 - shade, 64, 255]));
        Frame::from_parts(buffer, 0, 0, delay)
    });
    encoder.encode_frames(gif_frames).unwrap();
}

/// Decode every frame of a GIF and return the count.
pub fn gif_frame_count(path: &Path) -> usize {
    let reader = BufReader::new(File::open(path).unwrap());
    GifDecoder::new(reader)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
        .len()
}
