//! Filesystem primitives used by the provisioner.
//!
//! Each helper reports whether it changed anything so callers can tell a
//! fresh run from a re-run over an already provisioned tree.

use crate::constants;
use anyhow::{bail, Context, Result};
use nix::unistd::{Gid, Uid};
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Create `path` and any missing parents. Returns `true` if it did not exist.
///
/// An existing directory is left alone. A non-directory anywhere along the
/// path surfaces the OS error.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).with_context(|| format!("create directory {}", path.display()))?;
    tracing::debug!(path = %path.display(), "created directory");
    Ok(true)
}

/// Create an empty file at `path` unless something is already there.
///
/// An existing regular file keeps its contents and timestamps.
pub fn ensure_file(path: &Path) -> Result<bool> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {
            tracing::debug!(path = %path.display(), "created file");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let meta = fs::metadata(path)
                .with_context(|| format!("inspect existing {}", path.display()))?;
            if !meta.is_file() {
                bail!("{} exists but is not a regular file", path.display());
            }
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("create file {}", path.display())),
    }
}

/// Hand `path` over to `uid`:`gid`. Symlinks are followed.
pub fn chown(path: &Path, uid: Uid, gid: Gid) -> Result<()> {
    nix::unistd::chown(path, Some(uid), Some(gid))
        .with_context(|| format!("chown {}:{} {}", uid, gid, path.display()))?;
    tracing::debug!(path = %path.display(), uid = uid.as_raw(), gid = gid.as_raw(), "owner changed");
    Ok(())
}

/// Current permission bits of `path`, following symlinks.
pub fn mode_of(path: &Path) -> Result<u32> {
    let meta = fs::metadata(path).with_context(|| format!("stat {}", path.display()))?;
    #[cfg(unix)]
    {
        Ok(meta.permissions().mode() & constants::MODE_MASK)
    }
    #[cfg(not(unix))]
    {
        let _ = meta;
        bail!("permission bits are only supported on unix")
    }
}

/// True when `mode` already carries every bit in `bits`.
pub fn has_bits(mode: u32, bits: u32) -> bool {
    mode & bits == bits
}

/// OR `bits` into the mode of `path`. Returns `true` if the mode changed.
pub fn add_mode_bits(path: &Path, bits: u32) -> Result<bool> {
    let mode = mode_of(path)?;
    if has_bits(mode, bits) {
        return Ok(false);
    }
    let new_mode = mode | bits;
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(new_mode))
            .with_context(|| format!("set permissions {:o} on {}", new_mode, path.display()))?;
    }
    tracing::debug!(path = %path.display(), from = format_args!("{:04o}", mode), to = format_args!("{:04o}", new_mode), "mode changed");
    Ok(true)
}

/// Outcome of a recursive permission pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelaxSummary {
    /// Entries inspected, the root included.
    pub visited: usize,
    /// Entries whose mode was changed.
    pub changed: usize,
}

/// Add `bits` to `root` and everything beneath it.
///
/// `root` is resolved if it is a symlink; links found below it are skipped,
/// as `chmod -R` does.
pub fn relax_tree(root: &Path, bits: u32) -> Result<RelaxSummary> {
    let mut summary = RelaxSummary::default();
    for path in tree_entries(root) {
        let path = path?;
        summary.visited += 1;
        if add_mode_bits(&path, bits)? {
            summary.changed += 1;
        }
    }
    Ok(summary)
}

/// Entries under `root` that lack some of the requested bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingBits {
    /// Every offending entry, the root included.
    pub count: usize,
    /// The first offenders in walk order, at most `keep` of them.
    pub sample: Vec<PathBuf>,
}

impl MissingBits {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Count entries under `root` (root included) missing any of `bits`,
/// remembering at most `keep` of their paths.
pub fn scan_missing_bits(root: &Path, bits: u32, keep: usize) -> Result<MissingBits> {
    let mut missing = MissingBits::default();
    for path in tree_entries(root) {
        let path = path?;
        if has_bits(mode_of(&path)?, bits) {
            continue;
        }
        missing.count += 1;
        if missing.sample.len() < keep {
            missing.sample.push(path);
        }
    }
    Ok(missing)
}

fn tree_entries(root: &Path) -> impl Iterator<Item = Result<PathBuf>> + '_ {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) if entry.depth() > 0 && entry.file_type().is_symlink() => None,
            Ok(entry) => Some(Ok(entry.into_path())),
            Err(e) => Some(Err(e).with_context(|| format!("walk {}", root.display()))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn set_mode(path: &Path, mode: u32) {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_ensure_dir_creates_intermediates() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("shared/src/bluesky_scripts");
        assert!(ensure_dir(&target).unwrap());
        assert!(target.is_dir());
    }

    #[test]
    fn test_ensure_dir_existing_is_noop() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("experiments");
        fs::create_dir(&target).unwrap();
        assert!(!ensure_dir(&target).unwrap());
    }

    #[test]
    fn test_ensure_dir_fails_on_file_component() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("shared"), b"not a dir").unwrap();
        let err = ensure_dir(&dir.path().join("shared/config")).unwrap_err();
        assert!(err.to_string().contains("create directory"));
        assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_ensure_dir_fails_when_target_is_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("experiments");
        fs::write(&target, b"").unwrap();
        assert!(ensure_dir(&target).is_err());
    }

    #[test]
    fn test_ensure_file_creates_empty() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("simple_batch.py");
        assert!(ensure_file(&file).unwrap());
        assert_eq!(fs::metadata(&file).unwrap().len(), 0);
    }

    #[test]
    fn test_ensure_file_keeps_contents_and_mtime() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("simple_batch.py");
        fs::write(&file, b"RE(count([det]))\n").unwrap();
        let before = fs::metadata(&file).unwrap().modified().unwrap();

        assert!(!ensure_file(&file).unwrap());

        assert_eq!(fs::read(&file).unwrap(), b"RE(count([det]))\n");
        assert_eq!(fs::metadata(&file).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_ensure_file_rejects_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("simple_batch.py");
        fs::create_dir(&target).unwrap();
        let err = ensure_file(&target).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[test]
    fn test_add_mode_bits_preserves_owner_and_exec() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("run.sh");
        fs::write(&file, b"").unwrap();
        set_mode(&file, 0o711);

        assert!(add_mode_bits(&file, constants::RELAX_MODE_BITS).unwrap());
        assert_eq!(mode_of(&file).unwrap(), 0o777);

        set_mode(&file, 0o600);
        assert!(add_mode_bits(&file, constants::RELAX_MODE_BITS).unwrap());
        assert_eq!(mode_of(&file).unwrap(), 0o666);
    }

    #[test]
    fn test_add_mode_bits_keeps_special_bits() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("shared");
        fs::create_dir(&sub).unwrap();
        set_mode(&sub, 0o1700);

        add_mode_bits(&sub, constants::RELAX_MODE_BITS).unwrap();
        assert_eq!(mode_of(&sub).unwrap(), 0o1766);
    }

    #[test]
    fn test_add_mode_bits_already_set_is_noop() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"").unwrap();
        set_mode(&file, 0o666);
        assert!(!add_mode_bits(&file, constants::RELAX_MODE_BITS).unwrap());
    }

    #[test]
    fn test_relax_tree_covers_root_and_descendants() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("srx");
        let nested = root.join("shared/config");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("profile.yml");
        fs::write(&file, b"").unwrap();
        for p in [&root, &root.join("shared"), &nested] {
            set_mode(p, 0o700);
        }
        set_mode(&file, 0o600);

        let summary = relax_tree(&root, constants::RELAX_MODE_BITS).unwrap();
        assert_eq!(summary, RelaxSummary { visited: 4, changed: 4 });

        assert_eq!(mode_of(&root).unwrap(), 0o766);
        assert_eq!(mode_of(&nested).unwrap(), 0o766);
        assert_eq!(mode_of(&file).unwrap(), 0o666);
        assert!(scan_missing_bits(&root, constants::RELAX_MODE_BITS, 0)
            .unwrap()
            .is_empty());

        let again = relax_tree(&root, constants::RELAX_MODE_BITS).unwrap();
        assert_eq!(again.changed, 0);
    }

    #[test]
    fn test_relax_tree_skips_nested_symlinks() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("srx");
        fs::create_dir(&root).unwrap();
        set_mode(&root, 0o777);
        let outside = dir.path().join("outside.txt");
        fs::write(&outside, b"").unwrap();
        set_mode(&outside, 0o600);
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let summary = relax_tree(&root, constants::RELAX_MODE_BITS).unwrap();
        assert_eq!(summary.visited, 1);
        assert_eq!(mode_of(&outside).unwrap(), 0o600);
    }

    #[test]
    fn test_relax_tree_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        assert!(relax_tree(&dir.path().join("absent"), constants::RELAX_MODE_BITS).is_err());
    }

    #[test]
    fn test_scan_missing_bits_lists_offenders() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("srx");
        fs::create_dir(&root).unwrap();
        set_mode(&root, 0o777);
        let file = root.join("a");
        fs::write(&file, b"").unwrap();
        set_mode(&file, 0o644);

        let missing = scan_missing_bits(&root, constants::RELAX_MODE_BITS, 5).unwrap();
        assert_eq!(missing.count, 1);
        assert_eq!(missing.sample, vec![file]);
    }

    #[test]
    fn test_scan_missing_bits_counts_past_sample_limit() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("experiments");
        fs::create_dir(&root).unwrap();
        set_mode(&root, 0o777);
        for i in 0..8 {
            let file = root.join(format!("scan_{}.h5", i));
            fs::write(&file, b"").unwrap();
            set_mode(&file, 0o600);
        }

        let missing = scan_missing_bits(&root, constants::RELAX_MODE_BITS, 3).unwrap();
        assert_eq!(missing.count, 8);
        assert_eq!(missing.sample.len(), 3);

        let counted_only = scan_missing_bits(&root, constants::RELAX_MODE_BITS, 0).unwrap();
        assert_eq!(counted_only.count, 8);
        assert!(counted_only.sample.is_empty());
    }
}
