//! File extension → (kind, encoding)

use std::path::Path;

use cal_shared::{Encoding, RESOURCE_FORMATS, ResourceKind};

/// Resolve an extension such as `"xsf"`, `".CSF"` or `"Xmf"`.
///
/// Returns `None` for anything that is not one of the ten known extensions.
pub fn resolve_extension(ext: &str) -> Option<(ResourceKind, Encoding)> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    RESOURCE_FORMATS.iter().find_map(|format| {
        if format.markup_ext.eq_ignore_ascii_case(ext) {
            Some((format.kind, Encoding::Markup))
        } else if format.binary_ext.eq_ignore_ascii_case(ext) {
            Some((format.kind, Encoding::Binary))
        } else {
            None
        }
    })
}

/// Resolve the extension of `path`.
pub fn resolve_path(path: &Path) -> Option<(ResourceKind, Encoding)> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(resolve_extension)
}
