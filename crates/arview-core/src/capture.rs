//! Live camera capture contract.
//!
//! Acquisition is genuinely asynchronous (device permission prompts,
//! stream start-up), so backends complete on their own thread and hand
//! the result over an mpsc channel. The owning surface polls its
//! [`CaptureTicket`] from the render loop; a completion that arrives
//! after the owner is gone is released by the backend side via
//! [`deliver_or_release`], so no device is ever left open.

use std::sync::mpsc::{Receiver, Sender, TryRecvError};

use crate::error::{ArViewError, Result};

/// One decoded RGBA8 video frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Tightly packed RGBA8 pixel data, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Creates a frame, checking that the pixel buffer matches the
    /// dimensions.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ArViewError::CaptureDeviceUnavailable(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba.len()
            )));
        }
        Ok(Self { width, height, rgba })
    }
}

/// A live device stream owned by exactly one [`CaptureHandle`].
pub trait MediaStream: Send {
    /// Stops every underlying track. Called at most once.
    fn stop(&mut self);

    /// Whether the stream is still producing frames.
    fn is_live(&self) -> bool;

    /// Takes the newest decoded frame, if one arrived since the last
    /// poll. Frames are dropped, never queued.
    fn poll_frame(&mut self) -> Option<VideoFrame>;
}

/// Owns a device video stream.
///
/// At most one active handle exists per background surface; releasing
/// stops every track and is idempotent.
pub struct CaptureHandle {
    stream: Box<dyn MediaStream>,
    active: bool,
}

impl CaptureHandle {
    /// Wraps a freshly started stream.
    #[must_use]
    pub fn new(stream: Box<dyn MediaStream>) -> Self {
        Self {
            stream,
            active: true,
        }
    }

    /// Whether the handle still owns a running stream.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active && self.stream.is_live()
    }

    /// Takes the newest frame from the stream, if any.
    pub fn poll_frame(&mut self) -> Option<VideoFrame> {
        if self.active {
            self.stream.poll_frame()
        } else {
            None
        }
    }

    /// Stops all underlying tracks. Safe to call repeatedly.
    pub fn release(&mut self) {
        if self.active {
            self.stream.stop();
            self.active = false;
            log::debug!("capture handle released");
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for CaptureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHandle")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Outcome of one acquisition attempt.
pub type CaptureResult = Result<CaptureHandle>;

/// Receiving end of a pending acquisition.
#[derive(Debug)]
pub struct CaptureTicket {
    rx: Receiver<CaptureResult>,
}

impl CaptureTicket {
    /// Wraps the receiving end of an acquisition channel.
    #[must_use]
    pub fn new(rx: Receiver<CaptureResult>) -> Self {
        Self { rx }
    }

    /// Checks for a completed acquisition without blocking.
    ///
    /// Returns `None` while still pending. A backend that died without
    /// answering reports as [`ArViewError::CaptureDeviceUnavailable`].
    pub fn poll(&mut self) -> Option<CaptureResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ArViewError::CaptureDeviceUnavailable(
                "capture backend hung up before answering".into(),
            ))),
        }
    }
}

/// Acquires live camera streams.
///
/// Implementations run the actual device work on their own thread and
/// must deliver through [`deliver_or_release`] so an orphaned handle is
/// still stopped.
pub trait CaptureBackend: Send {
    /// Starts an acquisition and returns the ticket to poll for it.
    fn acquire(&mut self) -> CaptureTicket;
}

/// Delivers an acquisition result, releasing the handle if the requester
/// is already gone.
///
/// The send only fails when the owning surface dropped its ticket before
/// the device answered (unmount racing acquisition); in that case the
/// handle's tracks are stopped here instead of leaking.
pub fn deliver_or_release(tx: &Sender<CaptureResult>, result: CaptureResult) {
    if let Err(send_error) = tx.send(result) {
        if let Ok(mut handle) = send_error.0 {
            log::debug!("capture resolved after its owner unmounted; stopping tracks");
            handle.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;

    use super::*;

    struct TestStream {
        stopped: Arc<AtomicBool>,
        frame: Option<VideoFrame>,
    }

    impl MediaStream for TestStream {
        fn stop(&mut self) {
            self.stopped.store(true, Ordering::SeqCst);
        }

        fn is_live(&self) -> bool {
            !self.stopped.load(Ordering::SeqCst)
        }

        fn poll_frame(&mut self) -> Option<VideoFrame> {
            self.frame.take()
        }
    }

    fn test_handle() -> (CaptureHandle, Arc<AtomicBool>) {
        let stopped = Arc::new(AtomicBool::new(false));
        let frame = VideoFrame::new(2, 2, vec![0u8; 16]).expect("frame");
        let handle = CaptureHandle::new(Box::new(TestStream {
            stopped: Arc::clone(&stopped),
            frame: Some(frame),
        }));
        (handle, stopped)
    }

    #[test]
    fn test_frame_size_validation() {
        assert!(VideoFrame::new(2, 2, vec![0u8; 16]).is_ok());
        assert!(VideoFrame::new(2, 2, vec![0u8; 15]).is_err());
    }

    #[test]
    fn test_release_is_idempotent() {
        let (mut handle, stopped) = test_handle();
        assert!(handle.is_active());
        handle.release();
        assert!(stopped.load(Ordering::SeqCst));
        assert!(!handle.is_active());
        // Second release is a no-op, not an error.
        handle.release();
        assert!(!handle.is_active());
        assert!(handle.poll_frame().is_none());
    }

    #[test]
    fn test_drop_stops_tracks() {
        let (handle, stopped) = test_handle();
        drop(handle);
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_deliver_to_live_receiver() {
        let (tx, rx) = mpsc::channel();
        let mut ticket = CaptureTicket::new(rx);
        assert!(ticket.poll().is_none());

        let (handle, stopped) = test_handle();
        deliver_or_release(&tx, Ok(handle));
        let delivered = ticket.poll().expect("completed").expect("ok");
        assert!(delivered.is_active());
        assert!(!stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_deliver_to_dropped_receiver_stops_tracks() {
        let (tx, rx) = mpsc::channel::<CaptureResult>();
        drop(rx);

        let (handle, stopped) = test_handle();
        deliver_or_release(&tx, Ok(handle));
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_dead_backend_reports_unavailable() {
        let (tx, rx) = mpsc::channel::<CaptureResult>();
        let mut ticket = CaptureTicket::new(rx);
        drop(tx);
        match ticket.poll() {
            Some(Err(ArViewError::CaptureDeviceUnavailable(_))) => {}
            other => panic!("unexpected poll outcome: {other:?}"),
        }
    }
}
