use std::path::PathBuf;

use parking_lot::RwLock;

/// Identifier of a registered asset bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BundleId(pub u32);

/// Platform lookup for read-only asset bundles.
///
/// Bundle-based platforms ship assets inside an application package rather
/// than as a plain directory next to the executable. The driver asks the
/// resolver for a concrete path whenever an `Assets` path is opened.
pub trait AssetBundleResolver: Send + Sync + 'static {
    /// Register a bundle by name and return its id.
    ///
    /// Registering the same name twice returns the same id.
    fn add_bundle(&self, name: &str) -> BundleId;

    /// Resolve `uri` inside a registered bundle.
    fn resolve_bundle_path(&self, bundle: BundleId, uri: &str) -> PathBuf;
}

/// Bundles stored as plain directories under a common base.
///
/// Bundle `name` resolves to `base/name/uri`. Used by desktop builds that
/// mirror the packaged layout, and by tests.
pub struct DirectoryBundles {
    base: PathBuf,
    names: RwLock<Vec<String>>,
}

impl DirectoryBundles {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            names: RwLock::new(Vec::new()),
        }
    }
}

impl AssetBundleResolver for DirectoryBundles {
    fn add_bundle(&self, name: &str) -> BundleId {
        let mut names = self.names.write();
        if let Some(pos) = names.iter().position(|n| n == name) {
            return BundleId(pos as u32);
        }
        names.push(name.to_owned());
        log::debug!("Registered asset bundle \"{name}\"");
        BundleId((names.len() - 1) as u32)
    }

    fn resolve_bundle_path(&self, bundle: BundleId, uri: &str) -> PathBuf {
        let names = self.names.read();
        match names.get(bundle.0 as usize) {
            Some(name) => self.base.join(name).join(uri),
            None => {
                log::warn!("Unknown asset bundle {:?} while resolving '{uri}'", bundle);
                // Unresolvable paths fail later when opened.
                PathBuf::from(uri)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_bundle_is_stable() {
        let bundles = DirectoryBundles::new("/app");
        let a = bundles.add_bundle("assets");
        let b = bundles.add_bundle("dlc");
        assert_ne!(a, b);
        assert_eq!(bundles.add_bundle("assets"), a);
    }

    #[test]
    fn resolves_under_base() {
        let bundles = DirectoryBundles::new("/app");
        let id = bundles.add_bundle("assets");
        assert_eq!(
            bundles.resolve_bundle_path(id, "textures/brick.png"),
            PathBuf::from("/app/assets/textures/brick.png")
        );
    }

    #[test]
    fn unknown_bundle_falls_through() {
        let bundles = DirectoryBundles::new("/app");
        assert_eq!(
            bundles.resolve_bundle_path(BundleId(7), "a.bin"),
            PathBuf::from("a.bin")
        );
    }
}
