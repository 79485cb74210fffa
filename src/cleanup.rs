//! Removal of half-written files when an install is interrupted.

use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Paths that are only valid once their operation finishes
/// (a `.part` model file, a scratch directory holding the release archive).
#[derive(Debug, Default)]
pub struct CleanupContext {
    paths: Vec<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Best-effort removal of every registered path.
    pub fn cleanup(&self) {
        for path in &self.paths {
            debug!("Cleaning up: {}", path.display());
            if path.is_dir() {
                let _ = std::fs::remove_dir_all(path);
            } else {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}

/// Registers a path for the lifetime of an operation.
///
/// Call [`CleanupGuard::success`] once the path is either published or
/// removed; until then an interrupt handler calling
/// [`CleanupContext::cleanup`] will delete it.
#[derive(Debug)]
pub struct CleanupGuard {
    ctx: SharedCleanupContext,
    path: PathBuf,
}

impl CleanupGuard {
    pub fn new(ctx: SharedCleanupContext, path: PathBuf) -> Self {
        if let Ok(mut guard) = ctx.lock() {
            guard.add(path.clone());
        }
        Self { ctx, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn success(self) {
        if let Ok(mut guard) = self.ctx.lock() {
            guard.remove(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_context_add_remove() {
        let mut ctx = CleanupContext::new();
        let path = PathBuf::from("/tmp/ggml-base.en.bin.part");

        ctx.add(path.clone());
        assert_eq!(ctx.paths().len(), 1);

        ctx.remove(&path);
        assert!(ctx.paths().is_empty());
    }

    #[test]
    fn test_cleanup_removes_files_and_dirs() {
        let dir = tempdir().unwrap();
        let part = dir.path().join("ggml-base.en.bin.part");
        fs::write(&part, "partial").unwrap();
        let scratch = dir.path().join("scratch");
        fs::create_dir(&scratch).unwrap();
        fs::write(scratch.join("inkoscribe-mac.tar.gz"), "archive").unwrap();

        let mut ctx = CleanupContext::new();
        ctx.add(part.clone());
        ctx.add(scratch.clone());
        ctx.add(dir.path().join("never-created"));

        ctx.cleanup();
        assert!(!part.exists());
        assert!(!scratch.exists());
    }

    #[test]
    fn test_cleanup_guard_success_unregisters() {
        let ctx = new_shared();
        let guard = CleanupGuard::new(Arc::clone(&ctx), PathBuf::from("/tmp/x.part"));
        assert_eq!(ctx.lock().unwrap().paths().len(), 1);
        assert_eq!(guard.path(), Path::new("/tmp/x.part"));

        guard.success();
        assert!(ctx.lock().unwrap().paths().is_empty());
    }

    #[test]
    fn test_cleanup_guard_drop_keeps_registration() {
        let ctx = new_shared();
        {
            let _guard = CleanupGuard::new(Arc::clone(&ctx), PathBuf::from("/tmp/x.part"));
        }
        assert_eq!(ctx.lock().unwrap().paths().len(), 1);
    }
}
