//! On-disk staging for uploads and scratch space for media extraction.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A path that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a best-effort purge.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<CleanupFailure>,
}

impl PurgeReport {
    fn record(&mut self, path: PathBuf, result: std::io::Result<()>) {
        match result {
            Ok(()) => {
                debug!("Removed {:?}", path);
                self.removed.push(path);
            }
            Err(e) => {
                warn!("Could not remove {:?}: {}", path, e);
                self.failures.push(CleanupFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Resolve `..`, relative components and symlinks, keeping the raw path when
/// it cannot be resolved.
fn resolved(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// The upload and scratch directories owned by one engine.
#[derive(Debug, Clone)]
pub struct Workspace {
    upload_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl Workspace {
    pub fn new(upload_dir: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.scratch_dir)?;
        Ok(())
    }

    /// Copy `source` into the upload directory under its own file name.
    pub fn stage(&self, source: &Path) -> std::io::Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no file name", source.display()),
            )
        })?;

        self.ensure()?;
        let target = self.upload_dir.join(name);
        if resolved(source) != resolved(&target) {
            std::fs::copy(source, &target)?;
        }
        debug!("Staged {:?} as {:?}", source, target);
        Ok(target)
    }

    /// Remove uploaded files and everything in the scratch directory.
    /// Failures are recorded and logged, never returned.
    pub fn purge(&self) -> PurgeReport {
        self.purge_except(&[])
    }

    /// Like [`purge`](Self::purge) but leaves the listed paths in place.
    pub fn purge_except(&self, keep: &[&Path]) -> PurgeReport {
        let mut report = PurgeReport::default();
        let keep: Vec<PathBuf> = keep.iter().map(|k| resolved(k)).collect();

        for (dir, files_only) in [(&self.upload_dir, true), (&self.scratch_dir, false)] {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    report.record(dir.clone(), Err(e));
                    continue;
                }
            };

            for entry in entries.flatten() {
                let path = entry.path();
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if (is_dir && files_only) || keep.contains(&resolved(&path)) {
                    continue;
                }
                let result = if is_dir {
                    std::fs::remove_dir_all(&path)
                } else {
                    std::fs::remove_file(&path)
                };
                report.record(path, result);
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(root: &Path) -> Workspace {
        Workspace::new(root.join("uploads"), root.join("scratch"))
    }

    #[test]
    fn test_stage_copies_into_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("report.txt");
        std::fs::write(&source, "quarterly numbers").unwrap();

        let ws = workspace(dir.path());
        let staged = ws.stage(&source).unwrap();

        assert_eq!(staged, dir.path().join("uploads").join("report.txt"));
        assert_eq!(std::fs::read_to_string(&staged).unwrap(), "quarterly numbers");
        assert!(source.exists());

        // Staging a file already in place is a no-op.
        assert_eq!(ws.stage(&staged).unwrap(), staged);
    }

    #[test]
    fn test_stage_same_file_through_dotdot_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.ensure().unwrap();
        std::fs::write(ws.upload_dir().join("a.txt"), "kept").unwrap();

        let roundabout = ws.upload_dir().join("..").join("uploads").join("a.txt");
        let staged = ws.stage(&roundabout).unwrap();

        assert_eq!(staged, ws.upload_dir().join("a.txt"));
        assert_eq!(std::fs::read_to_string(&staged).unwrap(), "kept");
    }

    #[test]
    fn test_purge_removes_uploads_and_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.ensure().unwrap();

        std::fs::write(ws.upload_dir().join("a.pdf"), b"pdf").unwrap();
        std::fs::write(ws.upload_dir().join("photo.png"), b"png").unwrap();
        std::fs::create_dir(ws.upload_dir().join("keep")).unwrap();
        let work = ws.scratch_dir().join("sift-video-123");
        std::fs::create_dir(&work).unwrap();
        std::fs::write(work.join("clip.wav"), b"wav").unwrap();

        let report = ws.purge();
        assert!(report.failures.is_empty());
        assert_eq!(report.removed.len(), 3);
        assert!(ws.upload_dir().join("keep").exists());
        assert_eq!(std::fs::read_dir(ws.scratch_dir()).unwrap().count(), 0);

        let again = ws.purge();
        assert!(again.removed.is_empty());
        assert!(again.failures.is_empty());
    }

    #[test]
    fn test_purge_except_keeps_listed_files() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.ensure().unwrap();

        let keep = ws.upload_dir().join("next.txt");
        std::fs::write(&keep, b"next").unwrap();
        std::fs::write(ws.upload_dir().join("old.txt"), b"old").unwrap();

        let report = ws.purge_except(&[keep.as_path()]);
        assert_eq!(report.removed, vec![ws.upload_dir().join("old.txt")]);
        assert!(keep.exists());
    }

    #[test]
    fn test_purge_except_matches_non_canonical_paths() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        ws.ensure().unwrap();

        let keep = ws.upload_dir().join("next.txt");
        std::fs::write(&keep, b"next").unwrap();
        std::fs::write(ws.upload_dir().join("old.txt"), b"old").unwrap();

        let roundabout = ws.upload_dir().join("..").join("uploads").join("next.txt");
        let report = ws.purge_except(&[roundabout.as_path()]);
        assert_eq!(report.removed, vec![ws.upload_dir().join("old.txt")]);
        assert!(keep.exists());
    }

    #[test]
    fn test_purge_tolerates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let report = workspace(&dir.path().join("never-created")).purge();
        assert!(report.removed.is_empty());
        assert!(report.failures.is_empty());
    }
}
