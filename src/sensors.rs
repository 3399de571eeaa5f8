//! Camera capture.
//!
use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use rscam::{Camera, Config};

type CaptureFn = Box<dyn Fn() -> Option<rscam::Frame> + Send + Sync>;

const FRAME_FORMAT: &[u8] = b"MJPG";

/// Started camera exposing the live frame buffer one snapshot at a time.
pub struct FrameSource {
    capture_fn: CaptureFn,
    width: u32,
    height: u32,
}

impl FrameSource {
    /// Open a video device and start capturing.
    ///
    /// Without an explicit resolution, the highest discrete resolution the
    /// device offers for MJPG is used. On success the frame dimensions are
    /// final, so a returned `FrameSource` doubles as the capture-ready
    /// signal.
    pub fn open(device: &str, resolution: Option<(u32, u32)>) -> Result<Self> {
        let mut cam =
            Camera::new(device).with_context(|| format!("opening video device {device}"))?;

        let (width, height) = match resolution {
            Some(res) => res,
            None => max_resolution(&cam)?,
        };

        cam.start(&Config {
            interval: (1, 30),
            resolution: (width, height),
            format: FRAME_FORMAT,
            ..Default::default()
        })
        .map_err(|err| anyhow!("starting capture on {device}: {err}"))?;

        log::info!("Camera {device} capturing at {width}x{height}");

        Ok(Self {
            capture_fn: Box::new(move || cam.capture().ok()),
            width,
            height,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Copy the current frame out of the live buffer as an owned RGB image.
    pub fn snapshot(&self) -> Result<RgbImage> {
        let frame = (self.capture_fn)().ok_or_else(|| anyhow!("camera produced no frame"))?;
        let image = image::load_from_memory(&frame[..])
            .context("decoding captured frame")?
            .to_rgb8();

        Ok(image)
    }
}

/// Highest discrete resolution the camera supports for the frame format.
fn max_resolution(cam: &Camera) -> Result<(u32, u32)> {
    let resolution_info = cam
        .resolutions(FRAME_FORMAT)
        .map_err(|err| anyhow!("querying resolutions: {err}"))?;
    log::debug!("Found resolutions: {resolution_info:?}");

    match resolution_info {
        rscam::ResolutionInfo::Discretes(resolutions) => resolutions
            .into_iter()
            .max_by_key(|&(w, h)| w * h),
        rscam::ResolutionInfo::Stepwise { max, .. } => Some(max),
    }
    .ok_or_else(|| anyhow!("no resolution found"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn open_camera_if_available() {
        let device = "/dev/video0";

        match Camera::new(device) {
            Err(err) => println!("Could not initialize camera (maybe none available): {err}"),
            Ok(cam) => {
                let formats: Vec<_> = cam.formats().collect();
                println!("Supported formats: {formats:?}");

                if let Ok(resolution) = max_resolution(&cam) {
                    println!("Selected resolution: {resolution:?}");
                }
            }
        }
    }
}
