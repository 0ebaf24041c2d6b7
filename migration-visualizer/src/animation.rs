use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::io::Write;

/// Encodes `frames` as a looping GIF, each shown for `delay_ms`.
///
/// `speed` trades quality for encoding time (1 = best, 30 = fastest).
pub fn encode_gif<W: Write>(writer: W, frames: Vec<RgbaImage>, delay_ms: u32, speed: i32) -> Result<()> {
    let mut encoder = GifEncoder::new_with_speed(writer, speed.clamp(1, 30));
    encoder
        .set_repeat(Repeat::Infinite)
        .context("Failed to set GIF repeat mode")?;

    let delay = Delay::from_numer_denom_ms(delay_ms, 1);
    encoder
        .encode_frames(frames.into_iter().map(|image| Frame::from_parts(image, 0, 0, delay)))
        .context("Failed to encode GIF frames")?;
    Ok(())
}
