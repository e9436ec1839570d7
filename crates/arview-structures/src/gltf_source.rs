//! Built-in glTF asset source.
//!
//! Reads a `.gltf`/`.glb` file into an [`AssetBundle`]: the node
//! hierarchy (parents before children), one mesh per glTF mesh with its
//! per-primitive materials, and every animation as a named clip in
//! authoring order.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};

use arview_core::animation::{AnimationChannel, AnimationClip, ChannelOutput, NodePose};
use arview_core::asset::{
    AssetBundle, AssetSource, BundleNode, GeometryData, MaterialBinding, MaterialSpec,
    MeshPrototype,
};
use arview_core::error::{ArViewError, Result};

/// Loads asset bundles from glTF files on disk.
#[derive(Debug, Clone, Default)]
pub struct GltfAssetSource {
    base_dir: Option<PathBuf>,
}

impl GltfAssetSource {
    /// Creates a source resolving paths relative to the working
    /// directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source resolving paths relative to `base_dir`.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.base_dir {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        }
    }
}

impl AssetSource for GltfAssetSource {
    fn load_bundle(&self, path: &str) -> Result<AssetBundle> {
        let resolved = self.resolve(path);
        let (document, buffers, _images) =
            gltf::import(&resolved).map_err(|err| load_failure(path, &err.to_string()))?;

        let mut nodes = Vec::new();
        let mut meshes = Vec::new();
        // glTF node index -> index in our parents-first node list.
        let mut node_map = HashMap::new();

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| load_failure(path, "file contains no scene"))?;

        let mut stack: Vec<_> = scene.nodes().map(|node| (node, None::<usize>)).collect();
        while let Some((node, parent)) = stack.pop() {
            let index = nodes.len();
            node_map.insert(node.index(), index);

            let (translation, rotation, scale) = node.transform().decomposed();
            nodes.push(BundleNode {
                name: node.name().unwrap_or_default().to_string(),
                parent,
                base_pose: NodePose {
                    translation: Vec3::from_array(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from_array(scale),
                },
            });

            if let Some(mesh) = node.mesh() {
                if let Some(prototype) = read_mesh(&mesh, &node, index, &buffers) {
                    meshes.push(prototype);
                }
            }

            for child in node.children() {
                stack.push((child, Some(index)));
            }
        }

        let clips = read_clips(&document, &buffers, &node_map);

        if meshes.is_empty() {
            log::warn!("asset '{path}' contains no mesh geometry");
        }
        log::debug!(
            "loaded '{path}': {} nodes, {} meshes, {} clips",
            nodes.len(),
            meshes.len(),
            clips.len()
        );

        Ok(AssetBundle {
            path: path.to_string(),
            nodes,
            meshes,
            clips,
        })
    }
}

fn load_failure(path: &str, reason: &str) -> ArViewError {
    ArViewError::AssetLoadFailure {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Merges a glTF mesh's primitives into one geometry with one material
/// per primitive: a single value when the mesh has one primitive, an
/// ordered list otherwise.
fn read_mesh(
    mesh: &gltf::Mesh,
    node: &gltf::Node,
    node_index: usize,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshPrototype> {
    let mut geometry = GeometryData::default();
    let mut materials = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };

        let base = u32::try_from(geometry.positions.len()).ok()?;
        let position_count = {
            let before = geometry.positions.len();
            geometry.positions.extend(positions);
            geometry.positions.len() - before
        };

        if let Some(normals) = reader.read_normals() {
            geometry.normals.extend(normals);
        } else {
            geometry
                .normals
                .extend(std::iter::repeat([0.0, 0.0, 0.0]).take(position_count));
        }
        if let Some(uvs) = reader.read_tex_coords(0) {
            geometry.uvs.extend(uvs.into_f32());
        } else {
            geometry
                .uvs
                .extend(std::iter::repeat([0.0, 0.0]).take(position_count));
        }

        match reader.read_indices() {
            Some(indices) => geometry
                .indices
                .extend(indices.into_u32().map(|index| index + base)),
            None => {
                let count = u32::try_from(position_count).ok()?;
                geometry.indices.extend(base..base + count);
            }
        }

        let material = primitive.material();
        materials.push(MaterialSpec {
            name: material.name().unwrap_or_default().to_string(),
            base_color: Vec4::from_array(material.pbr_metallic_roughness().base_color_factor()),
            unlit: false,
            double_sided: material.double_sided(),
        });
    }

    if geometry.positions.is_empty() {
        return None;
    }

    let binding = if materials.len() == 1 {
        MaterialBinding::Single(materials.remove(0))
    } else {
        MaterialBinding::List(materials)
    };

    let name = mesh
        .name()
        .or_else(|| node.name())
        .unwrap_or("mesh")
        .to_string();

    Some(MeshPrototype {
        name,
        node: node_index,
        geometry: Arc::new(geometry),
        materials: binding,
    })
}

/// Reads every animation into a clip, preserving authoring order.
/// Channels targeting nodes outside the default scene are skipped.
fn read_clips(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    node_map: &HashMap<usize, usize>,
) -> Vec<AnimationClip> {
    document
        .animations()
        .enumerate()
        .map(|(clip_index, animation)| {
            let mut channels = Vec::new();
            for channel in animation.channels() {
                let Some(&node) = node_map.get(&channel.target().node().index()) else {
                    continue;
                };
                let reader = channel
                    .reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
                let Some(times) = reader.read_inputs() else {
                    continue;
                };
                let times: Vec<f32> = times.collect();

                let output = match reader.read_outputs() {
                    Some(gltf::animation::util::ReadOutputs::Translations(values)) => {
                        ChannelOutput::Translations(values.map(Vec3::from_array).collect())
                    }
                    Some(gltf::animation::util::ReadOutputs::Rotations(values)) => {
                        ChannelOutput::Rotations(
                            values.into_f32().map(Quat::from_array).collect(),
                        )
                    }
                    Some(gltf::animation::util::ReadOutputs::Scales(values)) => {
                        ChannelOutput::Scales(values.map(Vec3::from_array).collect())
                    }
                    // Morph target weights are not part of the playback
                    // model.
                    _ => continue,
                };

                channels.push(AnimationChannel {
                    node,
                    times,
                    output,
                });
            }

            let name = animation
                .name()
                .map_or_else(|| format!("clip_{clip_index}"), str::to_string);
            AnimationClip::new(name, channels)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_missing_file_is_a_load_failure() {
        let source = GltfAssetSource::new();
        match source.load_bundle("does/not/exist.glb") {
            Err(ArViewError::AssetLoadFailure { path, .. }) => {
                assert_eq!(path, "does/not/exist.glb");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_base_dir_resolution() {
        let source = GltfAssetSource::with_base_dir("/assets");
        assert_eq!(source.resolve("fox.glb"), Path::new("/assets/fox.glb"));
        let bare = GltfAssetSource::new();
        assert_eq!(bare.resolve("fox.glb"), Path::new("fox.glb"));
    }
}
