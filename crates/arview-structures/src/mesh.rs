//! Instance-owned mesh nodes.
//!
//! Every mesh node belongs to exactly one [`AssetInstance`]; the only
//! thing shared with the bundle is the read-only CPU geometry behind an
//! `Arc`. Materials and GPU buffers are cloned/uploaded per instance so
//! disposal is unambiguous.
//!
//! [`AssetInstance`]: crate::asset_instance::AssetInstance

use std::sync::Arc;

use glam::Mat4;

use arview_core::asset::{GeometryData, MaterialBinding, MaterialSpec, MeshPrototype};
use arview_render::{upload_geometry, GpuGeometry, RenderEngine};

/// One instance-owned material.
#[derive(Debug, Clone)]
pub struct Material {
    spec: MaterialSpec,
    released: bool,
}

impl Material {
    /// Creates a live material from its spec.
    #[must_use]
    pub fn new(spec: MaterialSpec) -> Self {
        Self {
            spec,
            released: false,
        }
    }

    /// The authored shading parameters.
    #[must_use]
    pub fn spec(&self) -> &MaterialSpec {
        &self.spec
    }

    /// Whether this material has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Releases the material. Returns `true` the first time only.
    pub fn release(&mut self) -> bool {
        if self.released {
            false
        } else {
            self.released = true;
            true
        }
    }
}

/// Material assignment of one mesh node: a single value or an ordered
/// list. Both shapes must be released on disposal.
#[derive(Debug, Clone)]
pub enum MaterialSlot {
    /// One material covering the whole mesh.
    Single(Material),
    /// One material per submesh, in authoring order.
    List(Vec<Material>),
}

impl MaterialSlot {
    /// Clones fresh materials out of a bundle's binding.
    #[must_use]
    pub fn from_binding(binding: &MaterialBinding) -> Self {
        match binding {
            MaterialBinding::Single(spec) => MaterialSlot::Single(Material::new(spec.clone())),
            MaterialBinding::List(specs) => {
                MaterialSlot::List(specs.iter().cloned().map(Material::new).collect())
            }
        }
    }

    /// Number of materials in the slot.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            MaterialSlot::Single(_) => 1,
            MaterialSlot::List(list) => list.len(),
        }
    }

    /// Releases every material, returning how many were newly released.
    pub fn release_all(&mut self) -> usize {
        match self {
            MaterialSlot::Single(material) => usize::from(material.release()),
            MaterialSlot::List(list) => list
                .iter_mut()
                .map(|material| usize::from(material.release()))
                .sum(),
        }
    }

    /// Whether every material in the slot has been released.
    #[must_use]
    pub fn all_released(&self) -> bool {
        match self {
            MaterialSlot::Single(material) => material.is_released(),
            MaterialSlot::List(list) => list.iter().all(Material::is_released),
        }
    }
}

/// Geometry of one mesh node: shared CPU data, exclusive GPU buffers.
#[derive(Debug)]
pub struct InstanceGeometry {
    data: Arc<GeometryData>,
    gpu: Option<GpuGeometry>,
    released: bool,
}

impl InstanceGeometry {
    /// Wraps shared CPU geometry; GPU buffers are uploaded lazily.
    #[must_use]
    pub fn new(data: Arc<GeometryData>) -> Self {
        Self {
            data,
            gpu: None,
            released: false,
        }
    }

    /// The shared CPU-side vertex data.
    #[must_use]
    pub fn data(&self) -> &GeometryData {
        &self.data
    }

    /// Whether GPU buffers are currently uploaded.
    #[must_use]
    pub fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Whether this geometry has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Uploads vertex/index buffers. No-op once released or uploaded.
    pub fn upload(&mut self, engine: &RenderEngine, label: &str) {
        if self.released || self.gpu.is_some() {
            return;
        }
        self.gpu = Some(upload_geometry(&engine.device, &self.data, label));
    }

    /// Releases the geometry, destroying GPU buffers when present.
    /// Returns `true` the first time only.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        if let Some(gpu) = self.gpu.take() {
            gpu.destroy();
        }
        self.released = true;
        true
    }
}

/// One render-graph mesh owned by an asset instance.
#[derive(Debug)]
pub struct MeshNode {
    /// Mesh name as authored.
    pub name: String,
    /// Index of the hierarchy node the mesh follows.
    pub node: usize,
    /// World transform, refreshed each frame by the owning instance.
    pub world_transform: Mat4,
    geometry: InstanceGeometry,
    materials: MaterialSlot,
}

impl MeshNode {
    /// Clones a bundle prototype into an instance-owned node.
    #[must_use]
    pub fn from_prototype(prototype: &MeshPrototype) -> Self {
        Self {
            name: prototype.name.clone(),
            node: prototype.node,
            world_transform: Mat4::IDENTITY,
            geometry: InstanceGeometry::new(Arc::clone(&prototype.geometry)),
            materials: MaterialSlot::from_binding(&prototype.materials),
        }
    }

    /// The node's geometry.
    #[must_use]
    pub fn geometry(&self) -> &InstanceGeometry {
        &self.geometry
    }

    /// The node's material slot.
    #[must_use]
    pub fn materials(&self) -> &MaterialSlot {
        &self.materials
    }

    /// Uploads the node's GPU buffers.
    pub fn upload(&mut self, engine: &RenderEngine) {
        let label = self.name.clone();
        self.geometry.upload(engine, &label);
    }

    /// Releases the node's geometry and every material it holds.
    ///
    /// Returns `(geometries, materials)` newly released; a second call
    /// returns zeroes.
    pub fn release_resources(&mut self) -> (usize, usize) {
        let geometries = usize::from(self.geometry.release());
        let materials = self.materials.release_all();
        (geometries, materials)
    }
}
