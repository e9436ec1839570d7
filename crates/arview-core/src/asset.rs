//! Asset bundles and the path-keyed bundle cache.
//!
//! An [`AssetBundle`] is immutable once loaded and shared read-only
//! across instances through `Arc`; everything an instance can mutate or
//! dispose (transforms, materials, GPU buffers) is cloned out of the
//! bundle at instantiation time.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;

use glam::Vec4;

use crate::animation::{AnimationClip, NodePose};
use crate::error::{ArViewError, Result};

/// Shading parameters of one authored material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSpec {
    /// Material name as authored (empty if unnamed).
    pub name: String,
    /// Base color factor (RGBA).
    pub base_color: Vec4,
    /// Whether the material ignores lighting.
    pub unlit: bool,
    /// Whether back faces are shaded too.
    pub double_sided: bool,
}

impl Default for MaterialSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_color: Vec4::ONE,
            unlit: false,
            double_sided: false,
        }
    }
}

/// Material assignment of one mesh: a single value or an ordered list.
#[derive(Debug, Clone)]
pub enum MaterialBinding {
    /// One material covering the whole mesh.
    Single(MaterialSpec),
    /// One material per submesh, in authoring order.
    List(Vec<MaterialSpec>),
}

impl MaterialBinding {
    /// Number of materials bound.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            MaterialBinding::Single(_) => 1,
            MaterialBinding::List(list) => list.len(),
        }
    }
}

/// CPU-side geometry of one mesh.
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// Texture coordinates, one per position.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// One node of the bundle's transform hierarchy.
#[derive(Debug, Clone)]
pub struct BundleNode {
    /// Node name as authored (empty if unnamed).
    pub name: String,
    /// Parent node index; `None` for roots. Parents always precede
    /// children in the node list.
    pub parent: Option<usize>,
    /// Rest pose of the node.
    pub base_pose: NodePose,
}

/// A mesh attached to one node of the hierarchy.
#[derive(Debug, Clone)]
pub struct MeshPrototype {
    /// Mesh name as authored.
    pub name: String,
    /// Index of the node the mesh is attached to.
    pub node: usize,
    /// Shared, read-only vertex data.
    pub geometry: Arc<GeometryData>,
    /// Material assignment.
    pub materials: MaterialBinding,
}

/// A loaded 3D asset: node hierarchy, meshes, and animation clips,
/// keyed by source path. Immutable after load.
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    /// The path the bundle was loaded from.
    pub path: String,
    /// Transform hierarchy, parents before children.
    pub nodes: Vec<BundleNode>,
    /// Meshes bound to nodes.
    pub meshes: Vec<MeshPrototype>,
    /// Animation clips in authoring order.
    pub clips: Vec<AnimationClip>,
}

impl AssetBundle {
    /// Number of animation clips.
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Clip names in authoring order.
    #[must_use]
    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|clip| clip.name.as_str()).collect()
    }
}

/// Loads asset bundles from opaque paths.
///
/// The source is the external side of the asset seam; callers go through
/// [`BundleCache`], which adds path-keyed caching and threaded delivery.
pub trait AssetSource: Send + Sync {
    /// Loads the bundle at `path`.
    fn load_bundle(&self, path: &str) -> Result<AssetBundle>;
}

/// Outcome of one load request.
pub type LoadResult = Result<Arc<AssetBundle>>;

/// Receiving end of a pending bundle load.
#[derive(Debug)]
pub struct LoadTicket {
    rx: Receiver<LoadResult>,
}

impl LoadTicket {
    /// Checks for a completed load without blocking.
    pub fn poll(&mut self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ArViewError::AssetLoadFailure {
                path: String::new(),
                reason: "asset loader hung up before answering".into(),
            })),
        }
    }
}

struct CacheInner {
    bundles: HashMap<String, Arc<AssetBundle>>,
    pending: HashMap<String, Vec<mpsc::Sender<LoadResult>>>,
}

/// Path-keyed cache in front of an [`AssetSource`].
///
/// Loads run on a worker thread; concurrent requests for the same path
/// share one load. A load that completes after every requester dropped
/// its ticket still lands in the cache, and its per-requester copies are
/// simply discarded.
#[derive(Clone)]
pub struct BundleCache {
    source: Arc<dyn AssetSource>,
    inner: Arc<Mutex<CacheInner>>,
}

impl BundleCache {
    /// Creates an empty cache over the given source.
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self {
            source,
            inner: Arc::new(Mutex::new(CacheInner {
                bundles: HashMap::new(),
                pending: HashMap::new(),
            })),
        }
    }

    /// Requests the bundle at `path`.
    ///
    /// Cache hits resolve on the first poll; misses start (or join) a
    /// background load.
    pub fn request(&self, path: &str) -> LoadTicket {
        let (tx, rx) = mpsc::channel();

        let mut inner = self.inner.lock().expect("bundle cache lock poisoned");
        if let Some(bundle) = inner.bundles.get(path) {
            let _ = tx.send(Ok(Arc::clone(bundle)));
            return LoadTicket { rx };
        }

        if let Some(waiters) = inner.pending.get_mut(path) {
            // A load for this path is already in flight; join it.
            waiters.push(tx);
            return LoadTicket { rx };
        }

        inner.pending.insert(path.to_string(), vec![tx]);
        drop(inner);

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.inner);
        let path = path.to_string();
        thread::spawn(move || {
            let outcome = source.load_bundle(&path).map(Arc::new);

            let mut inner = shared.lock().expect("bundle cache lock poisoned");
            if let Ok(bundle) = &outcome {
                inner.bundles.insert(path.clone(), Arc::clone(bundle));
            }
            let waiters = inner.pending.remove(&path).unwrap_or_default();
            drop(inner);

            for waiter in waiters {
                let _ = waiter.send(duplicate_outcome(&path, &outcome));
            }
        });

        LoadTicket { rx }
    }

    /// Whether a bundle for `path` is already cached.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.inner
            .lock()
            .expect("bundle cache lock poisoned")
            .bundles
            .contains_key(path)
    }

    /// Number of cached bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("bundle cache lock poisoned")
            .bundles
            .len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clones a load outcome for fan-out to multiple waiters.
fn duplicate_outcome(path: &str, outcome: &LoadResult) -> LoadResult {
    match outcome {
        Ok(bundle) => Ok(Arc::clone(bundle)),
        Err(ArViewError::AssetLoadFailure { path, reason }) => Err(ArViewError::AssetLoadFailure {
            path: path.clone(),
            reason: reason.clone(),
        }),
        Err(other) => Err(ArViewError::AssetLoadFailure {
            path: path.to_string(),
            reason: other.to_string(),
        }),
    }
}
