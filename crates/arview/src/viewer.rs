//! The per-viewer composition root.
//!
//! A [`SceneViewer`] wires the video background, zero-or-more asset
//! instances, lighting, and (interactive variant) placement resolution
//! into one render graph, and drives the per-frame update through an
//! explicit [`advance`](SceneViewer::advance) call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Vec2, Vec3};

use arview_core::asset::{AssetBundle, BundleCache, LoadTicket};
use arview_core::capture::CaptureBackend;
use arview_core::config::{ViewerConfig, ViewerVariant};
use arview_core::error::{ArViewError, Result};
use arview_core::pose::CameraPose;
use arview_render::RenderEngine;
use arview_structures::{
    AssetInstance, GroundPlane, LightingRig, VideoBackgroundSurface,
};

use crate::placement::PlacementResolver;

/// Aspect ratio assumed until the embedder reports its viewport.
const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;

static NEXT_VIEWER_ID: AtomicU64 = AtomicU64::new(0);

/// One mounted viewer.
///
/// Mount it, feed it the camera pose once per render frame via
/// [`advance`](Self::advance), forward pointer-down events on the
/// interactive variant, and unmount it (or drop it) when done; unmount
/// synchronously releases the capture stream and disposes every owned
/// instance.
pub struct SceneViewer {
    id: u64,
    variant: ViewerVariant,
    config: ViewerConfig,
    lighting: LightingRig,
    background: Option<VideoBackgroundSurface>,
    ground: Option<GroundPlane>,
    resolver: Option<PlacementResolver>,
    pending_load: Option<LoadTicket>,
    pending_placement: Option<Vec3>,
    bundle: Option<Arc<AssetBundle>>,
    instance: Option<AssetInstance>,
    engine: Option<Arc<RenderEngine>>,
    aspect_ratio: f32,
    error: Option<ArViewError>,
    mounted: bool,
}

impl SceneViewer {
    /// Mounts a viewer.
    ///
    /// The configuration is resolved here, once. The asset load is
    /// requested immediately (for the interactive variant this only
    /// warms the cache; no instance exists until a placement resolves).
    /// When a capture backend is given and the background is enabled,
    /// stream acquisition starts now and completes asynchronously.
    pub fn mount(
        variant: ViewerVariant,
        config: ViewerConfig,
        assets: &BundleCache,
        capture: Option<&mut dyn CaptureBackend>,
    ) -> Result<Self> {
        if config.model.path.is_empty() {
            return Err(ArViewError::AssetLoadFailure {
                path: String::new(),
                reason: "model path is required".into(),
            });
        }

        let id = NEXT_VIEWER_ID.fetch_add(1, Ordering::Relaxed);

        let mut lighting = LightingRig::from_config(&config.lighting);
        let ground = if variant == ViewerVariant::SurfaceAnchored {
            lighting.enable_shadows();
            Some(GroundPlane::sized_for_orbit(
                config.background.plane_size,
                config.controls.max_orbit_distance(),
            ))
        } else {
            None
        };

        let background = match capture {
            Some(backend) if config.background.enabled => {
                let mut surface = VideoBackgroundSurface::new(&config.background);
                surface.begin_capture(backend);
                Some(surface)
            }
            _ => None,
        };

        let resolver = (variant == ViewerVariant::Interactive)
            .then(|| PlacementResolver::new(&config.interaction, &config.camera));

        let pending_load = Some(assets.request(&config.model.path));

        log::info!(
            "viewer {id} mounted ({variant:?}, asset '{}')",
            config.model.path
        );

        Ok(Self {
            id,
            variant,
            config,
            lighting,
            background,
            ground,
            resolver,
            pending_load,
            pending_placement: None,
            bundle: None,
            instance: None,
            engine: None,
            aspect_ratio: DEFAULT_ASPECT_RATIO,
            error: None,
            mounted: true,
        })
    }

    /// This viewer's unique id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The variant this viewer was mounted as.
    #[must_use]
    pub fn variant(&self) -> ViewerVariant {
        self.variant
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// The lighting rig.
    #[must_use]
    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    /// The ground plane (surface-anchored variant only).
    #[must_use]
    pub fn ground(&self) -> Option<&GroundPlane> {
        self.ground.as_ref()
    }

    /// The video background surface, if one was mounted.
    #[must_use]
    pub fn background(&self) -> Option<&VideoBackgroundSurface> {
        self.background.as_ref()
    }

    /// The current asset instance, if one exists.
    #[must_use]
    pub fn instance(&self) -> Option<&AssetInstance> {
        self.instance.as_ref()
    }

    /// Mutable access to the current instance (repositioning and
    /// playback control belong to the embedder).
    #[must_use]
    pub fn instance_mut(&mut self) -> Option<&mut AssetInstance> {
        self.instance.as_mut()
    }

    /// The loaded bundle, once the load completed.
    #[must_use]
    pub fn bundle(&self) -> Option<&Arc<AssetBundle>> {
        self.bundle.as_ref()
    }

    /// The surfaced error, if the asset load failed.
    #[must_use]
    pub fn error(&self) -> Option<&ArViewError> {
        self.error.as_ref()
    }

    /// Whether the viewer is mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Current placement (interactive variant only).
    #[must_use]
    pub fn placement(&self) -> Option<Vec3> {
        self.resolver.as_ref().and_then(PlacementResolver::placement)
    }

    /// Attaches the GPU context; already-instantiated meshes upload now,
    /// later ones upload as they are created.
    pub fn attach_engine(&mut self, engine: Arc<RenderEngine>) {
        if let Some(instance) = &mut self.instance {
            instance.upload(&engine);
        }
        self.engine = Some(engine);
    }

    /// Reports the embedder's viewport aspect ratio (width / height),
    /// used for pointer-ray construction.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    /// Advances one render frame.
    ///
    /// In order: finish pending async completions, sync the background
    /// quad to the camera (always before the frame is presented), and
    /// advance animation playback. Nothing else mutates per frame.
    pub fn advance(&mut self, dt: f32, pose: &CameraPose) {
        if !self.mounted {
            return;
        }

        self.finish_pending_load();

        if let Some(background) = &mut self.background {
            background.advance(pose, self.engine.as_deref());
        }

        if let Some(instance) = &mut self.instance {
            instance.advance(dt);
        }
    }

    /// Handles a pointer-down event (interactive variant only; other
    /// variants ignore pointers).
    ///
    /// `ndc` is the pointer position in normalized device coordinates.
    /// On a successful resolve the previous instance is disposed and a
    /// new one is placed; if the bundle is still loading the placement
    /// is remembered and materialized on load completion. Returns the
    /// placement point, or `None` when the ray missed the interaction
    /// plane.
    pub fn pointer_down(&mut self, ndc: Vec2, pose: &CameraPose) -> Option<Vec3> {
        if !self.mounted {
            return None;
        }
        let resolver = self.resolver.as_mut()?;
        let point = resolver.resolve(ndc, pose, self.aspect_ratio)?;

        if self.bundle.is_some() {
            self.spawn_instance_at(point);
        } else {
            self.pending_placement = Some(point);
        }
        Some(point)
    }

    /// Unmounts the viewer: releases the capture stream, disposes the
    /// instance, and drops any pending load (a load that completes later
    /// only fills the shared cache). Idempotent; also runs on drop.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.pending_load = None;
        self.pending_placement = None;

        if let Some(background) = &mut self.background {
            background.release();
        }
        if let Some(mut instance) = self.instance.take() {
            instance.dispose();
        }
        log::info!("viewer {} unmounted", self.id);
    }

    fn finish_pending_load(&mut self) {
        let Some(ticket) = self.pending_load.as_mut() else {
            return;
        };
        let Some(outcome) = ticket.poll() else {
            return;
        };
        self.pending_load = None;

        match outcome {
            Err(err) => {
                log::error!("viewer {}: {err}", self.id);
                self.error = Some(err);
            }
            Ok(bundle) => {
                if self.variant == ViewerVariant::Animated && bundle.clip_count() == 0 {
                    let err = ArViewError::AssetLoadFailure {
                        path: bundle.path.clone(),
                        reason: "bundle has no animation clips".into(),
                    };
                    log::error!("viewer {}: {err}", self.id);
                    self.error = Some(err);
                    return;
                }

                self.bundle = Some(bundle);
                match self.variant {
                    ViewerVariant::Interactive => {
                        if let Some(point) = self.pending_placement.take() {
                            self.spawn_instance_at(point);
                        }
                    }
                    _ => self.spawn_instance_at(self.config.model.position),
                }
            }
        }
    }

    /// Replaces the current instance with a fresh clone of the bundle at
    /// `position`, disposing the old instance first.
    fn spawn_instance_at(&mut self, position: Vec3) {
        let Some(bundle) = &self.bundle else {
            return;
        };

        if let Some(mut old) = self.instance.take() {
            old.dispose();
        }

        let mut instance = AssetInstance::instantiate_animated(
            Arc::clone(bundle),
            position,
            self.config.model.scale,
            self.config.model.clip_index,
            self.config.model.fade_in_seconds,
        );
        if let Some(engine) = &self.engine {
            instance.upload(engine);
        }
        log::debug!("viewer {} placed instance at {position}", self.id);
        self.instance = Some(instance);
    }
}

impl Drop for SceneViewer {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for SceneViewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneViewer")
            .field("id", &self.id)
            .field("variant", &self.variant)
            .field("mounted", &self.mounted)
            .field("has_instance", &self.instance.is_some())
            .finish_non_exhaustive()
    }
}
