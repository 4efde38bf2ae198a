//! H.264 encoder wrapper using openh264

use crate::errors::CameraError;
use openh264::encoder::{Encoder, FrameType};
use openh264::formats::YUVBuffer;

/// H.264 encoder for packed RGB8 frames of a fixed size
pub struct H264Encoder {
    encoder: Encoder,
    width: u32,
    height: u32,
}

impl H264Encoder {
    /// Dimensions must be even; openh264 infers them from each YUV buffer,
    /// so `fps` and `bitrate` only shape the muxer side.
    pub fn new(width: u32, height: u32, _fps: f64, _bitrate: u32) -> Result<Self, CameraError> {
        if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
            return Err(CameraError::EncodingError(format!(
                "H.264 needs even, non-zero dimensions, got {}x{}",
                width, height
            )));
        }

        let encoder = Encoder::new()
            .map_err(|e| CameraError::EncodingError(format!("Failed to create encoder: {}", e)))?;

        Ok(Self {
            encoder,
            width,
            height,
        })
    }

    /// Encode one RGB8 frame into Annex B NAL units
    pub fn encode_rgb(&mut self, rgb_data: &[u8]) -> Result<EncodedFrame, CameraError> {
        let expected_size = (self.width as usize) * (self.height as usize) * 3;
        if rgb_data.len() != expected_size {
            return Err(CameraError::EncodingError(format!(
                "Invalid frame size: expected {} bytes, got {}",
                expected_size,
                rgb_data.len()
            )));
        }

        let yuv = rgb_to_i420(rgb_data, self.width as usize, self.height as usize);
        let buffer = YUVBuffer::from_vec(yuv, self.width as usize, self.height as usize);

        let bitstream = self
            .encoder
            .encode(&buffer)
            .map_err(|e| CameraError::EncodingError(format!("Encoding failed: {}", e)))?;

        Ok(EncodedFrame {
            is_keyframe: matches!(bitstream.frame_type(), FrameType::IDR | FrameType::I),
            data: bitstream.to_vec(),
        })
    }
}

/// Result of encoding a single frame
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Encoded H.264 data in Annex B format (with start codes)
    pub data: Vec<u8>,
    pub is_keyframe: bool,
}

/// BT.601 limited-range RGB8 to planar I420; chroma averaged over each 2x2 block
fn rgb_to_i420(rgb: &[u8], w: usize, h: usize) -> Vec<u8> {
    let luma_len = w * h;
    let chroma_w = w / 2;
    let chroma_len = chroma_w * (h / 2);
    let mut out = vec![0u8; luma_len + 2 * chroma_len];
    let (luma, chroma) = out.split_at_mut(luma_len);
    let (cb, cr) = chroma.split_at_mut(chroma_len);

    for (row, luma_row) in luma.chunks_exact_mut(w).enumerate() {
        let src = &rgb[row * w * 3..(row + 1) * w * 3];
        for (dst, px) in luma_row.iter_mut().zip(src.chunks_exact(3)) {
            let (r, g, b) = (px[0] as i32, px[1] as i32, px[2] as i32);
            *dst = (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16).clamp(0, 255) as u8;
        }
    }

    for cy in 0..h / 2 {
        for cx in 0..chroma_w {
            let (mut r, mut g, mut b) = (0i32, 0i32, 0i32);
            for (dy, dx) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                let idx = ((cy * 2 + dy) * w + cx * 2 + dx) * 3;
                r += rgb[idx] as i32;
                g += rgb[idx + 1] as i32;
                b += rgb[idx + 2] as i32;
            }
            let (r, g, b) = (r / 4, g / 4, b / 4);
            let i = cy * chroma_w + cx;
            cb[i] = (((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
            cr[i] = (((112 * r - 94 * g - 18 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i420_size() {
        let yuv = rgb_to_i420(&vec![128u8; 640 * 480 * 3], 640, 480);
        assert_eq!(yuv.len(), 640 * 480 * 3 / 2);
    }

    #[test]
    fn test_i420_gray_is_neutral() {
        let yuv = rgb_to_i420(&vec![128u8; 4 * 4 * 3], 4, 4);
        // Gray has no chroma
        assert!(yuv[16..].iter().all(|&c| c == 128));
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        assert!(H264Encoder::new(641, 480, 30.0, 1_000_000).is_err());
    }

    #[test]
    fn test_encode_frame() {
        let mut encoder =
            H264Encoder::new(640, 480, 30.0, 1_000_000).expect("Encoder creation failed");
        let encoded = encoder.encode_rgb(&vec![128u8; 640 * 480 * 3]).unwrap();

        assert!(!encoded.data.is_empty());
        assert!(
            encoded.data.starts_with(&[0x00, 0x00, 0x00, 0x01])
                || encoded.data.starts_with(&[0x00, 0x00, 0x01]),
            "Should start with Annex B start code"
        );
        assert!(encoded.is_keyframe, "First frame should be a keyframe");
        assert!(encoder.encode_rgb(&[0u8; 10]).is_err());
    }
}
