//! Drives one viewer of each variant headlessly and prints what the
//! render graph would contain.
//!
//! Usage: `cargo run --example viewer_demo -- path/to/model.glb`

use std::sync::Arc;

use arview::*;

fn main() -> Result<()> {
    init_logging();

    let model_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "models/fox.glb".to_string());

    let assets = BundleCache::new(Arc::new(GltfAssetSource::new()));
    let engine = RenderEngine::try_new().map(Arc::new);
    let mut capture = SyntheticCaptureBackend::new(CapturePolicy::Allow);

    for variant in [
        ViewerVariant::Static,
        ViewerVariant::Animated,
        ViewerVariant::SurfaceAnchored,
        ViewerVariant::Interactive,
    ] {
        let config = ViewerConfig::for_variant(&model_path, variant);
        let mut viewer = SceneViewer::mount(variant, config, &assets, Some(&mut capture))?;
        if let Some(engine) = &engine {
            viewer.attach_engine(Arc::clone(engine));
        }

        // Simulate a few seconds of a camera rig orbiting the origin.
        let mut placed = false;
        for frame in 0..240 {
            let angle = frame as f32 * 0.01;
            let eye = Vec3::new(5.0 * angle.sin(), 1.5, 5.0 * angle.cos());
            let pose = CameraPose::look_at(eye, Vec3::ZERO, Vec3::Y);
            viewer.advance(1.0 / 60.0, &pose);

            // Tap the center of the view once the bundle is ready.
            if variant == ViewerVariant::Interactive && !placed && viewer.bundle().is_some() {
                placed = viewer.pointer_down(Vec2::ZERO, &pose).is_some();
            }
            std::thread::sleep(std::time::Duration::from_millis(4));
        }

        if let Some(err) = viewer.error() {
            println!("{variant:?}: failed ({err})");
            continue;
        }
        let background = viewer
            .background()
            .map_or("none".to_string(), |bg| format!("{:?}", bg.stage()));
        let instance = viewer.instance().map_or("none".to_string(), |instance| {
            format!(
                "'{}' at {} ({} meshes)",
                instance.bundle().path,
                instance.position(),
                instance.meshes().len()
            )
        });
        println!("{variant:?}: background {background}, instance {instance}");
        if let Some(point) = viewer.placement() {
            println!("  placement: {point}");
        }

        viewer.unmount();
    }

    Ok(())
}
