use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("creating temporary dump file {path}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("starting instrumentation program {program:?}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("instrumentation program {program:?} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("reading dump {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// DumpFile – temporary file removed on drop
// ---------------------------------------------------------------------------

/// A dump written to the temp directory. The file is deleted when this value
/// goes out of scope, whether the run succeeded or not.
#[derive(Debug)]
pub struct DumpFile {
    path: PathBuf,
}

impl DumpFile {
    /// Create an empty file with a process-unique name.
    pub fn create(tag: &str) -> Result<(Self, File), CaptureError> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("timing_scope_{tag}_{}_{seq}.tmp", std::process::id()));

        let file = File::create(&path).map_err(|source| CaptureError::TempFile {
            path: path.clone(),
            source,
        })?;
        Ok((Self { path }, file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_to_string(&self) -> Result<String, CaptureError> {
        std::fs::read_to_string(&self.path).map_err(|source| CaptureError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for DumpFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed {}", self.path.display()),
            Err(e) => log::debug!("Could not remove {}: {e}", self.path.display()),
        }
    }
}

// ---------------------------------------------------------------------------
// Running the instrumentation program
// ---------------------------------------------------------------------------

/// Run `program` with `args`, capturing its stdout into a [`DumpFile`].
pub fn run<S: AsRef<str>>(program: &str, args: &[S]) -> Result<DumpFile, CaptureError> {
    run_tagged("capture", program, args)
}

fn run_tagged<S: AsRef<str>>(
    tag: &str,
    program: &str,
    args: &[S],
) -> Result<DumpFile, CaptureError> {
    let (dump, file) = DumpFile::create(tag)?;
    log::info!("Running {program} > {}", dump.path().display());

    let output = Command::new(program)
        .args(args.iter().map(AsRef::as_ref))
        .stdin(Stdio::null())
        .stdout(Stdio::from(file))
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| CaptureError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        log::warn!("{program} exited with {}", output.status);
        return Err(CaptureError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    log::info!("{program} finished");
    Ok(dump)
}
