//! The camera-facing video background quad.

use glam::{Quat, Vec3};

use arview_core::capture::{CaptureBackend, CaptureHandle, CaptureTicket};
use arview_core::config::BackgroundConfig;
use arview_core::pose::CameraPose;
use arview_render::{RenderEngine, VideoTexture};

/// Lifecycle of the background surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundStage {
    /// Created, capture not yet requested.
    Unmounted,
    /// Waiting for the capture backend to answer.
    Acquiring,
    /// Stream live; the quad tracks the camera every frame.
    Displaying,
    /// Stream stopped (released, or acquisition failed).
    Released,
}

/// A planar surface kept a fixed distance in front of the viewing
/// camera, textured with the live capture stream.
///
/// Acquisition failures are terminal but local: the surface goes
/// straight to [`BackgroundStage::Released`] with a warning, and the
/// owning viewer keeps rendering its 3D content.
pub struct VideoBackgroundSurface {
    plane_size: f32,
    plane_distance: f32,
    stage: BackgroundStage,
    ticket: Option<CaptureTicket>,
    handle: Option<CaptureHandle>,
    texture: Option<VideoTexture>,
    position: Vec3,
    orientation: Quat,
}

impl VideoBackgroundSurface {
    /// Creates an unmounted surface from its configuration.
    #[must_use]
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            plane_size: config.plane_size,
            plane_distance: config.plane_distance,
            stage: BackgroundStage::Unmounted,
            ticket: None,
            handle: None,
            texture: None,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    /// Requests the capture stream. Only valid once, from `Unmounted`.
    pub fn begin_capture(&mut self, backend: &mut dyn CaptureBackend) {
        if self.stage != BackgroundStage::Unmounted {
            return;
        }
        self.ticket = Some(backend.acquire());
        self.stage = BackgroundStage::Acquiring;
        log::debug!("background surface acquiring capture");
    }

    /// Current lifecycle stage.
    #[must_use]
    pub fn stage(&self) -> BackgroundStage {
        self.stage
    }

    /// Side length of the quad.
    #[must_use]
    pub fn plane_size(&self) -> f32 {
        self.plane_size
    }

    /// Distance kept in front of the camera.
    #[must_use]
    pub fn plane_distance(&self) -> f32 {
        self.plane_distance
    }

    /// Current world-space position of the quad.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current orientation of the quad (always the camera's).
    #[must_use]
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// The live video texture, once frames have arrived and a GPU is
    /// attached.
    #[must_use]
    pub fn texture(&self) -> Option<&VideoTexture> {
        self.texture.as_ref()
    }

    /// Whether the quad fills the camera frustum at its distance, so no
    /// edges become visible.
    #[must_use]
    pub fn covers_frustum(&self, fov_y_degrees: f32, aspect_ratio: f32) -> bool {
        let half_height = self.plane_distance * (fov_y_degrees.to_radians() * 0.5).tan();
        let half_width = half_height * aspect_ratio;
        self.plane_size * 0.5 >= half_height.max(half_width)
    }

    /// Per-frame update: finishes acquisition, repositions the quad to
    /// face the camera, and pumps the newest frame into the texture.
    ///
    /// Must run before the frame is presented.
    pub fn advance(&mut self, pose: &CameraPose, engine: Option<&RenderEngine>) {
        if self.stage == BackgroundStage::Acquiring {
            self.finish_acquisition();
        }
        if self.stage != BackgroundStage::Displaying {
            return;
        }

        self.position = pose.position + pose.forward() * self.plane_distance;
        self.orientation = pose.orientation;

        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let Some(frame) = handle.poll_frame() else {
            return;
        };
        let Some(engine) = engine else {
            return;
        };

        let needs_texture = match &self.texture {
            Some(texture) => texture.dimensions() != (frame.width, frame.height),
            None => true,
        };
        if needs_texture {
            if let Some(old) = self.texture.take() {
                old.destroy();
            }
            self.texture = Some(VideoTexture::new(&engine.device, frame.width, frame.height));
        }
        if let Some(texture) = &self.texture {
            if let Err(err) = texture.write_frame(&engine.queue, &frame) {
                log::warn!("dropping video frame: {err}");
            }
        }
    }

    /// Stops the stream and frees the texture. Idempotent; also drains a
    /// still-pending acquisition so a handle that already resolved is
    /// not leaked.
    pub fn release(&mut self) {
        if let Some(mut ticket) = self.ticket.take() {
            if let Some(Ok(mut handle)) = ticket.poll() {
                log::debug!("released capture that resolved during unmount");
                handle.release();
            }
            // A still-pending acquisition is released by the backend
            // when its send fails against the dropped ticket.
        }
        if let Some(mut handle) = self.handle.take() {
            handle.release();
        }
        if let Some(texture) = self.texture.take() {
            texture.destroy();
        }
        self.stage = BackgroundStage::Released;
    }

    fn finish_acquisition(&mut self) {
        let Some(ticket) = self.ticket.as_mut() else {
            self.stage = BackgroundStage::Released;
            return;
        };
        match ticket.poll() {
            None => {}
            Some(Ok(handle)) => {
                self.ticket = None;
                self.handle = Some(handle);
                self.stage = BackgroundStage::Displaying;
                log::info!("video background stream live");
            }
            Some(Err(err)) => {
                self.ticket = None;
                self.stage = BackgroundStage::Released;
                log::warn!("continuing without video background: {err}");
            }
        }
    }
}

impl Drop for VideoBackgroundSurface {
    fn drop(&mut self) {
        self.release();
    }
}
