//! Introspection cache over memory-mapped and in-memory resources.

mod fixtures;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cal_common::{CodecResult, builtin_codec};
use cal_export::{
    ByteSource, Codec, Encoding, IntrospectionCache, Registry, Resource, ResourceKind,
};
use tempfile::tempdir;

/// Counts decodes before delegating to the built-in codec.
struct Counting {
    inner: Arc<dyn Codec>,
    decodes: Arc<AtomicUsize>,
}

impl Codec for Counting {
    fn kind(&self) -> ResourceKind {
        self.inner.kind()
    }

    fn encoding(&self) -> Encoding {
        self.inner.encoding()
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Resource> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        self.inner.decode(bytes)
    }

    fn encode(&self, resource: &Resource) -> CodecResult<Vec<u8>> {
        self.inner.encode(resource)
    }
}

/// A cache whose codecs for `kind` share one decode counter.
fn counting_cache(kind: ResourceKind) -> (IntrospectionCache, Arc<AtomicUsize>) {
    let decodes = Arc::new(AtomicUsize::new(0));
    let registry = [Encoding::Binary, Encoding::Markup]
        .into_iter()
        .fold(Registry::builder(), |builder, encoding| {
            builder.with_codec(Arc::new(Counting {
                inner: builtin_codec(kind, encoding),
                decodes: Arc::clone(&decodes),
            }))
        })
        .build();
    (IntrospectionCache::new(Arc::new(registry)), decodes)
}

#[test]
fn test_material_bindings() {
    let cache = IntrospectionCache::default();
    let summary = cache
        .material_summary(fixtures::eyebrow_material().as_bytes())
        .unwrap();

    assert_eq!(summary.texture_bindings.len(), 2);
    assert_eq!(
        summary.texture_bindings["Opacity"],
        "eyebrows001_alpha.tga"
    );
    assert_eq!(
        summary.texture_bindings["Diffuse Color"],
        "eyebrows001_brunette001.tga"
    );
}

#[test]
fn test_mesh_statistics() {
    let cache = IntrospectionCache::default();
    let summary = cache.mesh_summary(&fixtures::head_mesh_markup()).unwrap();

    assert_eq!(summary.submeshes.len(), fixtures::HEAD_SUBMESHES.len());
    for (stat, &(material, faces, vertices)) in summary.submeshes.iter().zip(&fixtures::HEAD_SUBMESHES) {
        assert_eq!(stat.material_thread_id, material);
        assert_eq!(stat.face_count, faces);
        assert_eq!(stat.vertex_count, vertices);
        assert_eq!(stat.lod_step_count, Some(0));
    }
    assert_eq!(summary.face_count(), 1430 + 336 + 66 + 64);
    assert_eq!(summary.vertex_count(), 959 + 172 + 66 + 48);
}

#[test]
fn test_binary_and_markup_agree() {
    let cache = IntrospectionCache::default();
    let from_markup = cache.mesh_summary(&fixtures::head_mesh_markup()).unwrap();
    let from_binary = cache.mesh_summary(&fixtures::head_mesh_binary()).unwrap();
    assert_eq!(from_markup, from_binary);
    // Different bytes, different entries.
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.misses(), 2);
}

#[test]
fn test_repeat_lookup_skips_decoding() {
    let (cache, decodes) = counting_cache(ResourceKind::Material);
    let material = fixtures::eyebrow_material();

    let first = cache.material_summary(material.as_bytes()).unwrap();
    // Binary is tried first and rejects the markup document.
    let after_first = decodes.load(Ordering::SeqCst);
    assert_eq!(after_first, 2);

    let second = cache.material_summary(material.as_bytes()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(decodes.load(Ordering::SeqCst), after_first);
    assert_eq!((cache.hits(), cache.misses()), (1, 1));
}

#[test]
fn test_mapped_and_owned_share_an_entry() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = fixtures::write(dir.path(), "head.cmf", fixtures::head_mesh_binary());

    let mapped = ByteSource::map(&path).unwrap();
    assert!(mapped.is_mapped());
    let owned = ByteSource::read(&path).unwrap();
    assert!(!owned.is_mapped());

    let (cache, decodes) = counting_cache(ResourceKind::Mesh);
    let from_map = cache.mesh_summary(&mapped).unwrap();
    let from_memory = cache.mesh_summary(&owned).unwrap();

    assert!(Arc::ptr_eq(&from_map, &from_memory));
    assert_eq!(decodes.load(Ordering::SeqCst), 1);
    assert_eq!(from_map.submeshes[0].face_count, 1430);
    assert_eq!(cache.len(), 1);
    assert_eq!((cache.hits(), cache.misses()), (1, 1));
}

#[test]
fn test_wrong_kind_is_an_error() {
    let cache = IntrospectionCache::default();
    let err = cache
        .material_summary(fixtures::MESH.as_bytes())
        .unwrap_err();
    assert_eq!(err.kind, ResourceKind::Material);
    assert!(cache.is_empty());
}

#[test]
fn test_concurrent_lookups_decode_once() {
    let (cache, decodes) = counting_cache(ResourceKind::Mesh);
    let cache = Arc::new(cache);
    let markup = Arc::new(fixtures::head_mesh_markup());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let markup = Arc::clone(&markup);
            std::thread::spawn(move || cache.mesh_summary(&markup).unwrap())
        })
        .collect();
    let summaries: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(summaries.iter().all(|s| Arc::ptr_eq(s, &summaries[0])));
    // One binary rejection plus one markup decode, however many threads ask.
    assert_eq!(decodes.load(Ordering::SeqCst), 2);
    assert_eq!(cache.misses(), 1);
}
