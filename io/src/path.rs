use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::bundle::{AssetBundleResolver, BundleId};

/// How a request uri is mapped onto the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// Read-only bundled content under the assets location.
    Assets,
    /// Joined to the driver root directory.
    Relative,
    /// Used as-is.
    Absolute,
}

/// Where `Assets` paths live.
#[derive(Clone)]
pub enum AssetSource {
    /// A directory under the driver root (`root/<dir>/uri`).
    Directory(String),
    /// A platform asset bundle.
    Bundle {
        resolver: Arc<dyn AssetBundleResolver>,
        bundle: BundleId,
    },
}

impl Default for AssetSource {
    fn default() -> Self {
        AssetSource::Directory("assets".into())
    }
}

impl fmt::Debug for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSource::Directory(dir) => f.debug_tuple("Directory").field(dir).finish(),
            AssetSource::Bundle { bundle, .. } => {
                f.debug_struct("Bundle").field("bundle", bundle).finish()
            }
        }
    }
}

/// Map a request uri to a concrete filesystem path.
///
/// - `Absolute`: the uri itself
/// - `Relative`: `root/uri`
/// - `Assets`: `root/assets/uri`, or the bundle resolver's path
///
/// Leading separators on the uri are ignored for rooted kinds so the result
/// always stays under the root. Resolution never fails; a bad path shows up
/// as an open failure later.
pub fn resolve(uri: &str, kind: PathKind, root: &Path, assets: &AssetSource) -> PathBuf {
    match kind {
        PathKind::Absolute => PathBuf::from(uri),
        PathKind::Relative => join_rooted(root, uri),
        PathKind::Assets => match assets {
            AssetSource::Directory(dir) => join_rooted(&root.join(dir), uri),
            AssetSource::Bundle { resolver, bundle } => resolver.resolve_bundle_path(*bundle, uri),
        },
    }
}

/// Normalize a root directory.
///
/// Existing directories are canonicalized. Otherwise the text is kept with
/// trailing separators removed. An empty root stays empty, which makes
/// relative paths resolve against the process working directory.
pub fn normalize_root(root_uri: &str) -> PathBuf {
    if root_uri.is_empty() {
        return PathBuf::new();
    }
    match std::fs::canonicalize(root_uri) {
        Ok(path) => path,
        Err(err) => {
            log::debug!("Root '{root_uri}' not canonicalized: {err}");
            let trimmed = root_uri.trim_end_matches(is_separator);
            if trimmed.is_empty() {
                PathBuf::from(root_uri)
            } else {
                PathBuf::from(trimmed)
            }
        }
    }
}

fn join_rooted(root: &Path, uri: &str) -> PathBuf {
    root.join(uri.trim_start_matches(is_separator))
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::DirectoryBundles;
    use rstest::rstest;

    #[rstest]
    #[case(PathKind::Relative, "config.txt", "/data/config.txt")]
    #[case(PathKind::Relative, "saves/slot1.bin", "/data/saves/slot1.bin")]
    #[case(PathKind::Relative, "/leading.txt", "/data/leading.txt")]
    #[case(PathKind::Assets, "textures/brick.png", "/data/assets/textures/brick.png")]
    #[case(PathKind::Absolute, "/etc/hosts", "/etc/hosts")]
    #[case(PathKind::Absolute, "local.txt", "local.txt")]
    fn resolve_kinds(#[case] kind: PathKind, #[case] uri: &str, #[case] expected: &str) {
        let resolved = resolve(uri, kind, Path::new("/data"), &AssetSource::default());
        assert_eq!(resolved, PathBuf::from(expected));
    }

    #[test]
    fn custom_assets_directory() {
        let assets = AssetSource::Directory("content".into());
        assert_eq!(
            resolve("a.bin", PathKind::Assets, Path::new("/game"), &assets),
            PathBuf::from("/game/content/a.bin")
        );
    }

    #[test]
    fn bundle_assets() {
        let resolver = Arc::new(DirectoryBundles::new("/bundle"));
        let bundle = resolver.add_bundle("assets");
        let assets = AssetSource::Bundle { resolver, bundle };
        assert_eq!(
            resolve("a.bin", PathKind::Assets, Path::new("/ignored"), &assets),
            PathBuf::from("/bundle/assets/a.bin")
        );
        // Non-asset kinds still use the root.
        assert_eq!(
            resolve("a.bin", PathKind::Relative, Path::new("/root"), &assets),
            PathBuf::from("/root/a.bin")
        );
    }

    #[test]
    fn empty_root_is_working_directory() {
        assert_eq!(
            resolve("a.txt", PathKind::Relative, Path::new(""), &AssetSource::default()),
            PathBuf::from("a.txt")
        );
    }

    #[test]
    fn normalize_missing_root_strips_trailing_separator() {
        assert_eq!(
            normalize_root("/definitely/not/here/"),
            PathBuf::from("/definitely/not/here")
        );
    }

    #[test]
    fn normalize_empty_root() {
        assert_eq!(normalize_root(""), PathBuf::new());
    }

    #[test]
    fn normalize_existing_root_is_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let normalized = normalize_root(dir.path().to_str().unwrap());
        assert!(normalized.is_absolute());
        assert_eq!(normalized, std::fs::canonicalize(dir.path()).unwrap());
    }
}
