//! Capture output configuration.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;
use wire::DeviceApi;

use crate::error::CaptureResult;
use crate::recorder::TraceRecorder;

/// Overrides the directory traces are written to.
pub const OUTPUT_DIR_VAR: &str = "APITRACE_OUTPUT_DIR";
/// Overrides the trace file name stem.
pub const FILE_STEM_VAR: &str = "APITRACE_FILE_STEM";

const DEFAULT_FILE_STEM: &str = "api_trace_log";

/// Where trace files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    pub output_dir: PathBuf,
    pub file_stem: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_stem: DEFAULT_FILE_STEM.to_owned(),
        }
    }
}

impl CaptureConfig {
    /// Defaults overridden by `APITRACE_OUTPUT_DIR` and `APITRACE_FILE_STEM`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env_var_non_empty(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(stem) = env_var_non_empty(FILE_STEM_VAR) {
            config.file_stem = stem;
        }
        config
    }

    /// Path of the trace for the `index`-th device opened in this process.
    ///
    /// The first device writes `<stem>.bin`; later ones append a 1-based suffix
    /// starting at `_2`.
    #[must_use]
    pub fn trace_path(&self, index: usize) -> PathBuf {
        let name = if index == 0 {
            format!("{}.bin", self.file_stem)
        } else {
            format!("{}_{}.bin", self.file_stem, index + 1)
        };
        self.output_dir.join(name)
    }
}

/// Opens one trace file per device, numbering them in creation order.
#[derive(Debug, Default)]
pub struct CaptureSession {
    config: CaptureConfig,
    devices: AtomicUsize,
}

impl CaptureSession {
    #[must_use]
    pub const fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            devices: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Number of devices opened so far.
    #[must_use]
    pub fn devices(&self) -> usize {
        self.devices.load(Ordering::Relaxed)
    }

    /// Creates the next trace file and a recorder writing to it.
    pub fn open_device(&self, api: DeviceApi) -> CaptureResult<TraceRecorder<BufWriter<File>>> {
        let index = self.devices.fetch_add(1, Ordering::Relaxed);
        let path = self.config.trace_path(index);
        let recorder = open_trace(&path, api)?;
        info!(path = %path.display(), api = api.name(), "capturing device");
        Ok(recorder)
    }
}

fn open_trace(path: &Path, api: DeviceApi) -> CaptureResult<TraceRecorder<BufWriter<File>>> {
    let file = File::create(path)?;
    TraceRecorder::new(BufWriter::new(file), api)
}

/// Returns the variable's trimmed value when it is set and not blank.
fn env_var_non_empty(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|raw| raw.trim().to_owned())
        .filter(|value| !value.is_empty())
}
