//! Built-in capture backends.
//!
//! Real device backends (V4L2, platform media APIs) plug in through
//! [`CaptureBackend`]; the backends here cover development, demos, and
//! machines without a camera.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use arview_core::capture::{
    deliver_or_release, CaptureBackend, CaptureHandle, CaptureTicket, MediaStream, VideoFrame,
};
use arview_core::error::ArViewError;

/// What the synthetic backend answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapturePolicy {
    /// Deliver a live test-pattern stream.
    #[default]
    Allow,
    /// Answer with [`ArViewError::CapturePermissionDenied`].
    Deny,
    /// Answer with [`ArViewError::CaptureDeviceUnavailable`].
    Unavailable,
}

/// A capture backend producing a moving test pattern.
#[derive(Debug, Clone)]
pub struct SyntheticCaptureBackend {
    policy: CapturePolicy,
    width: u32,
    height: u32,
}

impl SyntheticCaptureBackend {
    /// Creates a backend with the given answer policy at 640x480.
    #[must_use]
    pub fn new(policy: CapturePolicy) -> Self {
        Self {
            policy,
            width: 640,
            height: 480,
        }
    }

    /// Overrides the stream resolution.
    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl CaptureBackend for SyntheticCaptureBackend {
    fn acquire(&mut self) -> CaptureTicket {
        let (tx, rx) = mpsc::channel();
        let policy = self.policy;
        let (width, height) = (self.width, self.height);

        thread::spawn(move || {
            let result = match policy {
                CapturePolicy::Allow => Ok(CaptureHandle::new(Box::new(PatternStream {
                    width,
                    height,
                    tick: 0,
                    stopped: false,
                }))),
                CapturePolicy::Deny => Err(ArViewError::CapturePermissionDenied),
                CapturePolicy::Unavailable => Err(ArViewError::CaptureDeviceUnavailable(
                    "no capture device present".into(),
                )),
            };
            deliver_or_release(&tx, result);
        });

        CaptureTicket::new(rx)
    }
}

/// A scrolling gradient; cheap to generate and visibly alive.
struct PatternStream {
    width: u32,
    height: u32,
    tick: u32,
    stopped: bool,
}

impl MediaStream for PatternStream {
    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }

    fn poll_frame(&mut self) -> Option<VideoFrame> {
        if self.stopped {
            return None;
        }
        self.tick = self.tick.wrapping_add(1);

        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x.wrapping_add(self.tick)) % 256) as u8;
                let g = ((y.wrapping_add(self.tick / 2)) % 256) as u8;
                rgba.extend_from_slice(&[r, g, 128, 255]);
            }
        }
        VideoFrame::new(self.width, self.height, rgba).ok()
    }
}

/// A capture backend serving one decoded image file as a static stream.
#[derive(Debug, Clone)]
pub struct StillImageBackend {
    path: PathBuf,
}

impl StillImageBackend {
    /// Creates a backend reading the image at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureBackend for StillImageBackend {
    fn acquire(&mut self) -> CaptureTicket {
        let (tx, rx) = mpsc::channel();
        let path = self.path.clone();

        thread::spawn(move || {
            let result = match image::open(&path) {
                Ok(decoded) => {
                    let rgba = decoded.to_rgba8();
                    let (width, height) = rgba.dimensions();
                    match VideoFrame::new(width, height, rgba.into_raw()) {
                        Ok(frame) => Ok(CaptureHandle::new(Box::new(StillStream {
                            frame: Some(frame),
                            stopped: false,
                        }))),
                        Err(err) => Err(err),
                    }
                }
                Err(err) => Err(ArViewError::CaptureDeviceUnavailable(format!(
                    "cannot decode {}: {err}",
                    path.display()
                ))),
            };
            deliver_or_release(&tx, result);
        });

        CaptureTicket::new(rx)
    }
}

/// Serves its frame once; the texture keeps the last upload after that.
struct StillStream {
    frame: Option<VideoFrame>,
    stopped: bool,
}

impl MediaStream for StillStream {
    fn stop(&mut self) {
        self.stopped = true;
        self.frame = None;
    }

    fn is_live(&self) -> bool {
        !self.stopped
    }

    fn poll_frame(&mut self) -> Option<VideoFrame> {
        if self.stopped {
            None
        } else {
            self.frame.take()
        }
    }
}
