//! Per-request filesystem isolation. Each request gets a private
//! input/output directory pair keyed by its id; directory-level partitioning
//! is the only concurrency-safety mechanism the predictor contract offers.

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

/// Allocates per-request directory pairs under one configured root. The root
/// is an explicit value (not an ambient constant) so tests can point it at a
/// temporary directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

/// A live directory pair, exclusively owned by one request. Both roots are
/// removed when this drops, on every exit path; removal errors are swallowed
/// since the request's outcome is already decided by then.
#[derive(Debug)]
pub struct Workspace {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        WorkspaceManager { root: root.into() }
    }

    /// Create `<root>/input/<id>` and `<root>/output/<id>`, parents included.
    /// Idempotent per id; ids are expected never to collide.
    pub fn acquire(&self, request_id: &str) -> io::Result<Workspace> {
        let input_root = self.root.join("input").join(request_id);
        let output_root = self.root.join("output").join(request_id);
        fs::create_dir_all(&input_root)?;
        fs::create_dir_all(&output_root)?;
        Ok(Workspace {
            input_root,
            output_root,
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        for root in [&self.input_root, &self.output_root] {
            if let Err(e) = fs::remove_dir_all(root) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("failed to remove workspace dir {}: {e}", root.display());
                }
            }
        }
    }
}
