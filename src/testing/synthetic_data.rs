//! Synthetic frame data for offline testing

use crate::types::CameraFrame;

/// Device id stamped on frames built outside a synthetic device
pub const SYNTHETIC_DEVICE_ID: &str = "synthetic";

/// RGB gradient frame whose content shifts with `frame_number`
pub fn synthetic_video_frame(frame_number: u64, width: u32, height: u32) -> CameraFrame {
    synthetic_frame_for(SYNTHETIC_DEVICE_ID, frame_number, width, height)
}

pub fn synthetic_frame_for(
    device_id: &str,
    frame_number: u64,
    width: u32,
    height: u32,
) -> CameraFrame {
    let (w, h) = (width as usize, height as usize);
    let base = (frame_number % 256) as u8;
    let mut data = vec![0u8; w * h * 3];

    for (y, row) in data.chunks_exact_mut(w * 3).enumerate() {
        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            px[0] = base.wrapping_add(x as u8);
            px[1] = base.wrapping_add(y as u8);
            px[2] = base.wrapping_add((x + y) as u8);
        }
    }

    CameraFrame::new(data, width, height, device_id.to_string()).with_format("RGB8".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_video_frame_correct_size() {
        let frame = synthetic_video_frame(0, 640, 480);
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_synthetic_video_frames_differ() {
        let frame0 = synthetic_video_frame(0, 32, 24);
        let frame1 = synthetic_video_frame(1, 32, 24);
        assert_ne!(frame0.data[0], frame1.data[0]);
    }

    #[test]
    fn test_frame_carries_device_id() {
        let frame = synthetic_frame_for("/dev/video4", 0, 8, 8);
        assert_eq!(frame.device_id, "/dev/video4");
    }
}
