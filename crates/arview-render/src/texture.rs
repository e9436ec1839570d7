//! Live-updating video texture.

use arview_core::capture::VideoFrame;

use crate::error::{RenderError, RenderResult};

/// An RGBA8 texture fed by decoded capture frames.
///
/// Lifetime is tied to the owning capture handle: the background surface
/// creates it when the first frame arrives and destroys it on release.
pub struct VideoTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
}

impl VideoTexture {
    /// Creates a texture sized to the stream's frames.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("video background texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Linear min/mag filtering, matching how a video quad is sampled.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("video background sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..wgpu::SamplerDescriptor::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Texture dimensions.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The sampled view handed to the external engine.
    #[must_use]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// The sampler handed to the external engine.
    #[must_use]
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Uploads one decoded frame.
    pub fn write_frame(&self, queue: &wgpu::Queue, frame: &VideoFrame) -> RenderResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(RenderError::TextureUploadMismatch(format!(
                "frame is {}x{}, texture is {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    /// Frees the GPU memory backing the texture.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
