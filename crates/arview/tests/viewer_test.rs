//! Integration scenarios for the viewer composition root.
//!
//! Asset loads and capture acquisition complete on worker threads, so
//! each scenario pumps `advance` until the completion lands (bounded, so
//! a hang fails fast instead of deadlocking the suite).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arview::*;
use arview_core::animation::{AnimationChannel, AnimationClip, ChannelOutput};
use arview_core::asset::{BundleNode, GeometryData, MaterialBinding, MaterialSpec, MeshPrototype};
use arview_core::capture::{deliver_or_release, CaptureTicket};

/// In-memory asset source: one mesh on one node, configurable clips.
struct StubSource {
    clips: usize,
    delay: Duration,
}

impl StubSource {
    fn instant(clips: usize) -> Self {
        Self {
            clips,
            delay: Duration::ZERO,
        }
    }
}

impl AssetSource for StubSource {
    fn load_bundle(&self, path: &str) -> Result<AssetBundle> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let geometry = Arc::new(GeometryData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
        });
        let clips = (0..self.clips)
            .map(|i| {
                AnimationClip::new(
                    format!("clip_{i}"),
                    vec![AnimationChannel {
                        node: 0,
                        times: vec![0.0, 1.0],
                        output: ChannelOutput::Translations(vec![
                            Vec3::ZERO,
                            Vec3::new(1.0, 0.0, 0.0),
                        ]),
                    }],
                )
            })
            .collect();
        Ok(AssetBundle {
            path: path.to_string(),
            nodes: vec![BundleNode {
                name: "root".into(),
                parent: None,
                base_pose: arview_core::animation::NodePose::IDENTITY,
            }],
            meshes: vec![MeshPrototype {
                name: "tri".into(),
                node: 0,
                geometry,
                materials: MaterialBinding::Single(MaterialSpec::default()),
            }],
            clips,
        })
    }
}

/// Backend that answers instantly with a stream whose stop flag the test
/// can watch.
struct TrackedBackend {
    stopped: Arc<AtomicBool>,
}

struct TrackedStream {
    stopped: Arc<AtomicBool>,
}

impl MediaStream for TrackedStream {
    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    fn poll_frame(&mut self) -> Option<VideoFrame> {
        None
    }
}

impl CaptureBackend for TrackedBackend {
    fn acquire(&mut self) -> CaptureTicket {
        let (tx, rx) = mpsc::channel();
        let handle = CaptureHandle::new(Box::new(TrackedStream {
            stopped: Arc::clone(&self.stopped),
        }));
        deliver_or_release(&tx, Ok(handle));
        CaptureTicket::new(rx)
    }
}

fn cache(source: StubSource) -> BundleCache {
    BundleCache::new(Arc::new(source))
}

fn pose() -> CameraPose {
    CameraPose::look_at(Vec3::new(0.0, 1.5, 5.0), Vec3::ZERO, Vec3::Y)
}

/// Pumps frames until the load completes one way or the other.
fn pump_until_loaded(viewer: &mut SceneViewer) {
    let pose = pose();
    for _ in 0..400 {
        viewer.advance(1.0 / 60.0, &pose);
        if viewer.bundle().is_some() || viewer.error().is_some() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("bundle never finished loading");
}

#[test]
fn test_static_viewer_places_instance_at_configured_position() {
    let assets = cache(StubSource::instant(0));
    let config = ViewerConfig::new("models/a.glb");
    let expected = config.model.position;

    let mut viewer =
        SceneViewer::mount(ViewerVariant::Static, config, &assets, None).expect("mount");
    assert!(viewer.instance().is_none());

    pump_until_loaded(&mut viewer);
    let instance = viewer.instance().expect("instance");
    assert_eq!(instance.position(), expected);
    assert_eq!(instance.scale(), 1.5);
    // A clipless bundle simply plays nothing on the static variant.
    assert!(instance.action().is_none());
    assert!(viewer.error().is_none());
}

#[test]
fn test_two_viewers_share_bundle_but_not_instances() {
    let assets = cache(StubSource::instant(1));

    let mut a = SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::new("models/shared.glb"),
        &assets,
        None,
    )
    .expect("mount a");
    let mut b = SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::new("models/shared.glb"),
        &assets,
        None,
    )
    .expect("mount b");

    pump_until_loaded(&mut a);
    pump_until_loaded(&mut b);

    // One cached bundle serves both viewers.
    assert!(Arc::ptr_eq(a.bundle().expect("a"), b.bundle().expect("b")));

    // Moving one viewer's instance leaves the other untouched.
    let moved = Vec3::new(7.0, 0.0, 0.0);
    a.instance_mut().expect("a instance").set_position(moved);
    assert_eq!(a.instance().expect("a instance").position(), moved);
    assert_eq!(
        b.instance().expect("b instance").position(),
        b.config().model.position
    );

    let a_world = a.instance().expect("a").meshes()[0].world_transform;
    let b_world = b.instance().expect("b").meshes()[0].world_transform;
    assert_ne!(a_world, b_world);
}

#[test]
fn test_interactive_placement_replaces_prior_instance() {
    let assets = cache(StubSource::instant(1));
    let mut viewer = SceneViewer::mount(
        ViewerVariant::Interactive,
        ViewerConfig::for_variant("models/i.glb", ViewerVariant::Interactive),
        &assets,
        None,
    )
    .expect("mount");

    pump_until_loaded(&mut viewer);
    // No instance until the first successful resolve.
    assert!(viewer.instance().is_none());
    assert!(viewer.placement().is_none());

    let geometry = Arc::clone(&viewer.bundle().expect("bundle").meshes[0].geometry);
    let without_instance = Arc::strong_count(&geometry);

    let pose = pose();
    let p1 = viewer.pointer_down(Vec2::ZERO, &pose).expect("first hit");
    let expected = pose.position + pose.forward() * 2.0;
    assert!((p1 - expected).length() < 1e-5);
    assert_eq!(viewer.instance().expect("placed").position(), p1);
    assert_eq!(Arc::strong_count(&geometry), without_instance + 1);

    viewer.advance(1.0 / 60.0, &pose);

    let p2 = viewer
        .pointer_down(Vec2::new(0.3, -0.2), &pose)
        .expect("second hit");
    assert_ne!(p1, p2);

    // Exactly one instance exists, at the second point; the first
    // instance's cloned resources are gone again.
    assert_eq!(viewer.instance().expect("replaced").position(), p2);
    assert_eq!(viewer.placement(), Some(p2));
    assert_eq!(Arc::strong_count(&geometry), without_instance + 1);
}

#[test]
fn test_interactive_miss_changes_nothing() {
    let assets = cache(StubSource::instant(1));
    let mut viewer = SceneViewer::mount(
        ViewerVariant::Interactive,
        ViewerConfig::for_variant("models/i.glb", ViewerVariant::Interactive),
        &assets,
        None,
    )
    .expect("mount");
    pump_until_loaded(&mut viewer);

    let facing = pose();
    let p1 = viewer.pointer_down(Vec2::ZERO, &facing).expect("hit");

    // Looking away from the interaction plane, the ray cannot hit it.
    let away = CameraPose::look_at(
        Vec3::new(0.0, 1.5, 5.0),
        Vec3::new(0.0, 1.5, 100.0),
        Vec3::Y,
    );
    assert!(viewer.pointer_down(Vec2::ZERO, &away).is_none());
    assert_eq!(viewer.placement(), Some(p1));
    assert_eq!(viewer.instance().expect("kept").position(), p1);
}

#[test]
fn test_placement_before_load_materializes_on_completion() {
    let assets = cache(StubSource {
        clips: 1,
        delay: Duration::from_millis(50),
    });
    let mut viewer = SceneViewer::mount(
        ViewerVariant::Interactive,
        ViewerConfig::for_variant("models/slow.glb", ViewerVariant::Interactive),
        &assets,
        None,
    )
    .expect("mount");

    let pose = pose();
    let point = viewer.pointer_down(Vec2::ZERO, &pose).expect("hit");
    assert!(viewer.instance().is_none());

    pump_until_loaded(&mut viewer);
    viewer.advance(1.0 / 60.0, &pose);
    assert_eq!(viewer.instance().expect("materialized").position(), point);
}

#[test]
fn test_animated_variant_requires_clips() {
    let assets = cache(StubSource::instant(0));
    let mut viewer = SceneViewer::mount(
        ViewerVariant::Animated,
        ViewerConfig::new("models/still.glb"),
        &assets,
        None,
    )
    .expect("mount");
    pump_until_loaded(&mut viewer);

    match viewer.error() {
        Some(ArViewError::AssetLoadFailure { path, .. }) => assert_eq!(path, "models/still.glb"),
        other => panic!("unexpected error state: {other:?}"),
    }
    assert!(viewer.instance().is_none());
}

#[test]
fn test_out_of_range_clip_falls_back_to_first() {
    let assets = cache(StubSource::instant(2));
    let mut config = ViewerConfig::new("models/anim.glb");
    config.model.clip_index = 9;

    let mut viewer =
        SceneViewer::mount(ViewerVariant::Animated, config, &assets, None).expect("mount");
    pump_until_loaded(&mut viewer);

    let action = viewer
        .instance()
        .expect("instance")
        .action()
        .expect("action");
    assert_eq!(action.clip_index(), 0);
    assert!(viewer.error().is_none());
}

#[test]
fn test_denied_capture_keeps_viewer_alive() {
    let assets = cache(StubSource::instant(1));
    let mut backend = SyntheticCaptureBackend::new(CapturePolicy::Deny);
    let mut viewer = SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::new("models/a.glb"),
        &assets,
        Some(&mut backend),
    )
    .expect("mount");

    pump_until_loaded(&mut viewer);
    let pose = pose();
    for _ in 0..100 {
        viewer.advance(1.0 / 60.0, &pose);
        if viewer.background().expect("surface").stage() == BackgroundStage::Released {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    // Capture failure is terminal-but-local: no background, no error,
    // and the 3D content is still there.
    assert_eq!(
        viewer.background().expect("surface").stage(),
        BackgroundStage::Released
    );
    assert!(viewer.error().is_none());
    assert!(viewer.instance().is_some());
}

#[test]
fn test_unmount_before_first_frame_stops_capture() {
    let assets = cache(StubSource::instant(0));
    let stopped = Arc::new(AtomicBool::new(false));
    let mut backend = TrackedBackend {
        stopped: Arc::clone(&stopped),
    };

    let mut viewer = SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::new("models/a.glb"),
        &assets,
        Some(&mut backend),
    )
    .expect("mount");

    // Unmount races acquisition: the handle already sits in the channel
    // and must still be stopped.
    viewer.unmount();
    assert!(stopped.load(Ordering::SeqCst));
    assert!(!viewer.is_mounted());
    assert!(viewer.instance().is_none());

    // Unmounting again is a no-op.
    viewer.unmount();
}

#[test]
fn test_background_tracks_camera_every_frame() {
    let assets = cache(StubSource::instant(0));
    let mut backend = SyntheticCaptureBackend::new(CapturePolicy::Allow).with_resolution(4, 4);
    let mut viewer = SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::new("models/a.glb"),
        &assets,
        Some(&mut backend),
    )
    .expect("mount");

    let first = pose();
    for _ in 0..200 {
        viewer.advance(1.0 / 60.0, &first);
        if viewer.background().expect("surface").stage() == BackgroundStage::Displaying {
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    let distance = viewer.config().background.plane_distance;
    for pose in [
        first,
        CameraPose::look_at(Vec3::new(3.0, 0.5, -2.0), Vec3::ZERO, Vec3::Y),
    ] {
        viewer.advance(1.0 / 60.0, &pose);
        let background = viewer.background().expect("surface");
        let expected = pose.position + pose.forward() * distance;
        assert!((background.position() - expected).length() < 1e-4);
        assert!(background.orientation().angle_between(pose.orientation) < 1e-4);
    }
}

#[test]
fn test_empty_model_path_is_rejected() {
    let assets = cache(StubSource::instant(0));
    match SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::default(),
        &assets,
        None,
    ) {
        Err(ArViewError::AssetLoadFailure { reason, .. }) => {
            assert!(reason.contains("path"));
        }
        other => panic!("unexpected mount outcome: {other:?}"),
    }
}

#[test]
fn test_surface_variant_wires_ground_and_shadows() {
    let assets = cache(StubSource::instant(1));
    let config = ViewerConfig::for_variant("models/a.glb", ViewerVariant::SurfaceAnchored);
    let viewer =
        SceneViewer::mount(ViewerVariant::SurfaceAnchored, config, &assets, None).expect("mount");

    let ground = viewer.ground().expect("ground plane");
    // max(configured 20, max orbit 100 * 2)
    assert_eq!(ground.size(), 200.0);
    assert!(viewer.lighting().key_light.cast_shadow);

    // Non-surface variants get neither.
    let plain = SceneViewer::mount(
        ViewerVariant::Static,
        ViewerConfig::new("models/a.glb"),
        &assets,
        None,
    )
    .expect("mount");
    assert!(plain.ground().is_none());
    assert!(!plain.lighting().key_light.cast_shadow);
}
