//! Test helpers: scratch directories and GPU availability.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use crate::device::{Gpu, GpuInit};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// Unique directory under the system temp dir, removed on drop.
pub(crate) struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub(crate) fn new(name: &str) -> Self {
        let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "shadeview_test_{name}_{}_{n}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create scratch dir");
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `contents` to `name` and pins its modification time to `modified`.
    pub(crate) fn write(&self, name: &str, contents: &str, modified: SystemTime) -> PathBuf {
        let p = self.path.join(name);
        std::fs::write(&p, contents).expect("write scratch file");
        set_modified(&p, modified);
        p
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Fixed base time so tests never depend on filesystem timestamp granularity.
pub(crate) fn epoch(offset_secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + offset_secs)
}

pub(crate) fn set_modified(path: &Path, modified: SystemTime) {
    std::fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(modified))
        .expect("set modification time");
}

pub(crate) fn modified(path: &Path) -> SystemTime {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .expect("stat")
}

/// Headless GPU for render tests; `None` (with a log line) when the machine has no adapter.
pub(crate) fn headless_gpu() -> Option<Gpu<'static>> {
    match pollster::block_on(Gpu::headless(GpuInit::default())) {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("skipping GPU test: {e:#}");
            None
        }
    }
}
