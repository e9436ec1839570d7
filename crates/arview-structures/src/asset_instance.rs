//! One placed, animated copy of an asset bundle.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use arview_core::animation::{select_clip, ClipAction, NodePose};
use arview_core::asset::AssetBundle;
use arview_render::RenderEngine;

use crate::mesh::MeshNode;

/// Resources released by one disposal call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposalStats {
    /// Geometry resources released.
    pub geometries: usize,
    /// Materials released (single values and list entries alike).
    pub materials: usize,
}

/// One render-graph subtree wrapping a clone of a bundle's geometry
/// graph.
///
/// Cloning at instantiation is what keeps simultaneous instances of the
/// same asset independently transformable and independently disposable;
/// only the CPU geometry stays shared, read-only, with the bundle.
pub struct AssetInstance {
    bundle: Arc<AssetBundle>,
    position: Vec3,
    scale: f32,
    node_poses: Vec<NodePose>,
    global_transforms: Vec<Mat4>,
    meshes: Vec<MeshNode>,
    action: Option<ClipAction>,
    disposed: bool,
}

impl AssetInstance {
    /// Clones the bundle's graph into a new instance at `position`.
    ///
    /// No clip is played; use [`Self::instantiate_animated`] for
    /// playback.
    #[must_use]
    pub fn instantiate(bundle: Arc<AssetBundle>, position: Vec3, scale: f32) -> Self {
        let node_poses: Vec<NodePose> = bundle.nodes.iter().map(|node| node.base_pose).collect();
        let meshes = bundle.meshes.iter().map(MeshNode::from_prototype).collect();
        let mut instance = Self {
            global_transforms: vec![Mat4::IDENTITY; node_poses.len()],
            node_poses,
            meshes,
            bundle,
            position,
            scale,
            action: None,
            disposed: false,
        };
        instance.refresh_transforms();
        instance
    }

    /// Clones the bundle and starts playing the requested clip, reset to
    /// its beginning and fading in over `fade_in_seconds`.
    ///
    /// An out-of-range clip index falls back to clip 0 with a warning; a
    /// bundle without clips yields a still instance.
    #[must_use]
    pub fn instantiate_animated(
        bundle: Arc<AssetBundle>,
        position: Vec3,
        scale: f32,
        clip_index: usize,
        fade_in_seconds: f32,
    ) -> Self {
        let mut instance = Self::instantiate(bundle, position, scale);
        let available = instance.bundle.clip_count();
        if available > 0 {
            let selected = select_clip(clip_index, available);
            instance.action = Some(ClipAction::new(selected, fade_in_seconds));
        }
        instance
    }

    /// The bundle this instance was cloned from.
    #[must_use]
    pub fn bundle(&self) -> &Arc<AssetBundle> {
        &self.bundle
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the instance.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh_transforms();
    }

    /// Uniform scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Playback state, if a clip is playing.
    #[must_use]
    pub fn action(&self) -> Option<&ClipAction> {
        self.action.as_ref()
    }

    /// The instance's mesh nodes.
    #[must_use]
    pub fn meshes(&self) -> &[MeshNode] {
        &self.meshes
    }

    /// Whether the instance has been disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Root transform applied above the node hierarchy.
    #[must_use]
    pub fn root_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::IDENTITY,
            self.position,
        )
    }

    /// Uploads every mesh node's GPU buffers.
    pub fn upload(&mut self, engine: &RenderEngine) {
        if self.disposed {
            return;
        }
        for mesh in &mut self.meshes {
            mesh.upload(engine);
        }
    }

    /// Advances animation playback by `dt` seconds.
    ///
    /// Sampled poses are blended over the rest pose by the action's
    /// fade-in weight, then node and mesh world transforms are refreshed.
    pub fn advance(&mut self, dt: f32) {
        if self.disposed {
            return;
        }
        let Some(action) = self.action.as_mut() else {
            return;
        };
        let Some(clip) = self.bundle.clips.get(action.clip_index()) else {
            return;
        };

        action.advance(dt, clip.duration);
        let weight = action.weight();
        let time = action.time();

        for (pose, node) in self.node_poses.iter_mut().zip(&self.bundle.nodes) {
            *pose = node.base_pose;
        }
        let mut sampled: Vec<NodePose> = self.node_poses.clone();
        clip.sample_into(time, &mut sampled);
        for (pose, target) in self.node_poses.iter_mut().zip(&sampled) {
            pose.translation = pose.translation.lerp(target.translation, weight);
            pose.rotation = pose.rotation.slerp(target.rotation, weight);
            pose.scale = pose.scale.lerp(target.scale, weight);
        }

        self.refresh_transforms();
    }

    /// Releases every owned mesh resource.
    ///
    /// Runs exactly once; repeat calls return zeroed stats. Also runs on
    /// drop, so replacing an instance before a frame was ever rendered
    /// still frees its resources.
    pub fn dispose(&mut self) -> DisposalStats {
        if self.disposed {
            return DisposalStats::default();
        }
        self.disposed = true;

        let mut stats = DisposalStats::default();
        for mesh in &mut self.meshes {
            let (geometries, materials) = mesh.release_resources();
            stats.geometries += geometries;
            stats.materials += materials;
        }
        log::debug!(
            "disposed instance of '{}': {} geometries, {} materials",
            self.bundle.path,
            stats.geometries,
            stats.materials
        );
        stats
    }

    /// Recomputes global node transforms and mesh world transforms.
    fn refresh_transforms(&mut self) {
        let root = self.root_transform();
        for index in 0..self.node_poses.len() {
            let local = self.node_poses[index].to_matrix();
            // Parents precede children, so the parent is up to date.
            let global = match self.bundle.nodes[index].parent {
                Some(parent) => self.global_transforms[parent] * local,
                None => local,
            };
            self.global_transforms[index] = global;
        }
        for mesh in &mut self.meshes {
            let node_global = self
                .global_transforms
                .get(mesh.node)
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            mesh.world_transform = root * node_global;
        }
    }
}

impl Drop for AssetInstance {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for AssetInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetInstance")
            .field("path", &self.bundle.path)
            .field("position", &self.position)
            .field("scale", &self.scale)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use arview_core::animation::{AnimationChannel, AnimationClip, ChannelOutput};
    use arview_core::asset::{
        BundleNode, GeometryData, MaterialBinding, MaterialSpec, MeshPrototype,
    };

    use super::*;

    fn test_bundle(clips: Vec<AnimationClip>) -> Arc<AssetBundle> {
        let geometry = Arc::new(GeometryData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            uvs: vec![[0.0, 0.0]; 3],
            indices: vec![0, 1, 2],
        });
        Arc::new(AssetBundle {
            path: "models/test.glb".into(),
            nodes: vec![
                BundleNode {
                    name: "root".into(),
                    parent: None,
                    base_pose: NodePose::IDENTITY,
                },
                BundleNode {
                    name: "child".into(),
                    parent: Some(0),
                    base_pose: NodePose {
                        translation: Vec3::new(0.0, 1.0, 0.0),
                        ..NodePose::IDENTITY
                    },
                },
            ],
            meshes: vec![
                MeshPrototype {
                    name: "body".into(),
                    node: 1,
                    geometry: Arc::clone(&geometry),
                    materials: MaterialBinding::Single(MaterialSpec::default()),
                },
                MeshPrototype {
                    name: "trim".into(),
                    node: 1,
                    geometry,
                    materials: MaterialBinding::List(vec![
                        MaterialSpec::default(),
                        MaterialSpec::default(),
                    ]),
                },
            ],
            clips,
        })
    }

    fn slide_clip() -> AnimationClip {
        AnimationClip::new(
            "slide",
            vec![AnimationChannel {
                node: 0,
                times: vec![0.0, 1.0],
                output: ChannelOutput::Translations(vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]),
            }],
        )
    }

    #[test]
    fn test_dispose_releases_everything_exactly_once() {
        let mut instance = AssetInstance::instantiate(test_bundle(vec![]), Vec3::ZERO, 1.0);
        let stats = instance.dispose();
        assert_eq!(
            stats,
            DisposalStats {
                geometries: 2,
                materials: 3,
            }
        );
        assert!(instance.is_disposed());
        assert_eq!(instance.dispose(), DisposalStats::default());
    }

    #[test]
    fn test_instances_do_not_share_transform_state() {
        let bundle = test_bundle(vec![]);
        let mut a = AssetInstance::instantiate(Arc::clone(&bundle), Vec3::ZERO, 1.0);
        let b = AssetInstance::instantiate(bundle, Vec3::ZERO, 1.0);

        a.set_position(Vec3::new(5.0, 0.0, 0.0));
        let a_world = a.meshes()[0].world_transform;
        let b_world = b.meshes()[0].world_transform;
        assert_ne!(a_world, b_world);
        assert_eq!(b.position(), Vec3::ZERO);
    }

    #[test]
    fn test_clip_fallback_on_out_of_range_index() {
        let instance = AssetInstance::instantiate_animated(
            test_bundle(vec![slide_clip()]),
            Vec3::ZERO,
            1.0,
            9,
            0.5,
        );
        assert_eq!(instance.action().map(ClipAction::clip_index), Some(0));
    }

    #[test]
    fn test_clipless_bundle_yields_still_instance() {
        let mut instance =
            AssetInstance::instantiate_animated(test_bundle(vec![]), Vec3::ZERO, 1.0, 0, 0.5);
        assert!(instance.action().is_none());
        // Advancing without a clip is a no-op, not a panic.
        instance.advance(0.1);
    }

    #[test]
    fn test_animation_moves_nodes_after_fade_in() {
        let mut instance = AssetInstance::instantiate_animated(
            test_bundle(vec![slide_clip()]),
            Vec3::ZERO,
            1.0,
            0,
            0.0,
        );
        let before = instance.meshes()[0].world_transform;
        instance.advance(0.5);
        let after = instance.meshes()[0].world_transform;
        assert_ne!(before, after);
        // Full weight from the zero-length fade; the root channel moved
        // +1 on x at t=0.5.
        let moved = after.w_axis.x - before.w_axis.x;
        assert!((moved - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_scale_and_position_compose_into_root_transform() {
        let instance =
            AssetInstance::instantiate(test_bundle(vec![]), Vec3::new(0.0, -1.0, 1.0), 1.5);
        let root = instance.root_transform();
        assert_eq!(root.w_axis.y, -1.0);
        assert_eq!(root.x_axis.x, 1.5);
    }
}
