//! Introspection cache
//!
//! Answers "which textures does this material use" and "how big are this
//! mesh's submeshes" without decoding the same bytes twice. Entries are keyed
//! by [`ContentFingerprint`], so the cache is content-addressed: a file read
//! twice, mapped once and copied once all share one entry.
//!
//! Concurrent lookups of the same uncached content wait on a per-fingerprint
//! gate so that only one of them decodes. Decode failures are never stored.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cal_common::{CodecError, Resource};
use cal_shared::{Encoding, MARKUP_DOCUMENT_MARKER, ResourceKind};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::DecodeError;
use crate::fingerprint::ContentFingerprint;
use crate::registry::Registry;
use crate::summary::{MaterialSummary, MeshSummary};

/// Backing storage for one summary namespace.
///
/// Writes are idempotent: inserting a value for a fingerprint that already has
/// one replaces it with an equal value.
pub trait SummaryStore<T>: Send + Sync {
    fn get(&self, fingerprint: &ContentFingerprint) -> Option<Arc<T>>;

    fn insert(&self, fingerprint: ContentFingerprint, summary: Arc<T>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

/// Sharded concurrent map; the default store.
#[derive(Debug)]
pub struct DashMapStore<T> {
    map: DashMap<ContentFingerprint, Arc<T>>,
}

impl<T> DashMapStore<T> {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }
}

impl<T> Default for DashMapStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync> SummaryStore<T> for DashMapStore<T> {
    fn get(&self, fingerprint: &ContentFingerprint) -> Option<Arc<T>> {
        self.map.get(fingerprint).map(|entry| Arc::clone(entry.value()))
    }

    fn insert(&self, fingerprint: ContentFingerprint, summary: Arc<T>) {
        self.map.insert(fingerprint, summary);
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&self) {
        self.map.clear();
    }
}

type Gate = Arc<Mutex<()>>;

pub struct IntrospectionCache {
    registry: Arc<Registry>,
    materials: Arc<dyn SummaryStore<MaterialSummary>>,
    meshes: Arc<dyn SummaryStore<MeshSummary>>,
    gates: DashMap<(ResourceKind, ContentFingerprint), Gate>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl IntrospectionCache {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_stores(
            registry,
            Arc::new(DashMapStore::new()),
            Arc::new(DashMapStore::new()),
        )
    }

    pub fn with_stores(
        registry: Arc<Registry>,
        materials: Arc<dyn SummaryStore<MaterialSummary>>,
        meshes: Arc<dyn SummaryStore<MeshSummary>>,
    ) -> Self {
        Self {
            registry,
            materials,
            meshes,
            gates: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Texture bindings of the material encoded in `bytes` (either encoding).
    pub fn material_summary(&self, bytes: &[u8]) -> Result<Arc<MaterialSummary>, DecodeError> {
        self.summarise(
            ResourceKind::Material,
            self.materials.as_ref(),
            bytes,
            |resource| resource.as_material().map(MaterialSummary::of),
        )
    }

    /// Submesh statistics of the mesh encoded in `bytes` (either encoding).
    pub fn mesh_summary(&self, bytes: &[u8]) -> Result<Arc<MeshSummary>, DecodeError> {
        self.summarise(
            ResourceKind::Mesh,
            self.meshes.as_ref(),
            bytes,
            |resource| resource.as_mesh().map(MeshSummary::of),
        )
    }

    /// Lookups answered from a store.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that had to decode, successfully or not.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Cached summaries across both namespaces.
    pub fn len(&self) -> usize {
        self.materials.len() + self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.materials.clear();
        self.meshes.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn summarise<T>(
        &self,
        kind: ResourceKind,
        store: &dyn SummaryStore<T>,
        bytes: &[u8],
        extract: impl FnOnce(&Resource) -> Option<T>,
    ) -> Result<Arc<T>, DecodeError> {
        let fingerprint = ContentFingerprint::of(bytes);
        if let Some(summary) = self.lookup(kind, store, &fingerprint) {
            return Ok(summary);
        }

        let key = (kind, fingerprint);
        let gate: Gate = Arc::clone(self.gates.entry(key).or_default().value());
        let result = {
            let _held = gate.lock();
            // Whoever held the gate before us may have filled the store.
            match self.lookup(kind, store, &fingerprint) {
                Some(summary) => Ok(summary),
                None => self.decode_into(kind, store, fingerprint, bytes, extract),
            }
        };
        self.gates.remove_if(&key, |_, current| Arc::ptr_eq(current, &gate));
        result
    }

    fn decode_into<T>(
        &self,
        kind: ResourceKind,
        store: &dyn SummaryStore<T>,
        fingerprint: ContentFingerprint,
        bytes: &[u8],
        extract: impl FnOnce(&Resource) -> Option<T>,
    ) -> Result<Arc<T>, DecodeError> {
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("{kind} cache miss for {fingerprint}, decoding {} bytes", bytes.len());

        let resource = self.decode(kind, bytes)?;
        let summary = extract(&resource).map(Arc::new).ok_or(DecodeError {
            kind,
            source: CodecError::WrongKind {
                expected: kind,
                found: resource.kind(),
            },
        })?;
        store.insert(fingerprint, Arc::clone(&summary));
        Ok(summary)
    }

    fn lookup<T>(
        &self,
        kind: ResourceKind,
        store: &dyn SummaryStore<T>,
        fingerprint: &ContentFingerprint,
    ) -> Option<Arc<T>> {
        let summary = store.get(fingerprint)?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("{kind} cache hit for {fingerprint}");
        Some(summary)
    }

    /// Binary first, then markup. On double failure the error of the codec
    /// matching the input's shape is reported.
    fn decode(&self, kind: ResourceKind, bytes: &[u8]) -> Result<Resource, DecodeError> {
        let descriptor = self.registry.describe(kind);
        let binary_error = match descriptor.codec(Encoding::Binary).decode(bytes) {
            Ok(resource) => return Ok(resource),
            Err(e) => e,
        };
        match descriptor.codec(Encoding::Markup).decode(bytes) {
            Ok(resource) => Ok(resource),
            Err(markup_error) => Err(DecodeError {
                kind,
                source: if bytes.starts_with(MARKUP_DOCUMENT_MARKER) {
                    markup_error
                } else {
                    binary_error
                },
            }),
        }
    }
}

impl Default for IntrospectionCache {
    fn default() -> Self {
        Self::new(Arc::new(Registry::standard().clone()))
    }
}
