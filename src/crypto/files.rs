//! Encrypting and decrypting files on disk. The result always lands next to
//! the source, under a name that does not overwrite anything.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::crypto::envelope;
use crate::error::{Result, UiError};

/// Largest file either direction accepts.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
const MAX_NAME_ATTEMPTS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Encrypt,
    Decrypt,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "encrypt" => Some(Mode::Encrypt),
            "decrypt" => Some(Mode::Decrypt),
            _ => None,
        }
    }

    /// Extension the source must carry.
    pub fn source_extension(&self) -> &'static str {
        match self {
            Mode::Encrypt => "pdf",
            Mode::Decrypt => "enc",
        }
    }

    pub fn output_extension(&self) -> &'static str {
        match self {
            Mode::Encrypt => "enc",
            Mode::Decrypt => "pdf",
        }
    }

    pub fn progress_label(&self) -> &'static str {
        match self {
            Mode::Encrypt => "Encrypting...",
            Mode::Decrypt => "Decrypting...",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Mode::Encrypt => "encrypted",
            Mode::Decrypt => "decrypted",
        }
    }

    /// Rejections read as they are; anything unexpected gets the action
    /// in front of it.
    pub fn failure_message(&self, err: &UiError) -> String {
        match err {
            UiError::Io { .. } | UiError::Task(_) | UiError::Random(_) | UiError::Other(_) => {
                let action = match self {
                    Mode::Encrypt => "Encryption",
                    Mode::Decrypt => "Decryption",
                };
                format!("{action} failed: {err}")
            }
            _ => err.to_string(),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file to process.
#[derive(Clone)]
pub struct Job {
    pub mode: Mode,
    pub source: PathBuf,
    password: String,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("mode", &self.mode)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Job {
    pub fn new(mode: Mode, source: impl Into<PathBuf>, password: impl Into<String>) -> Self {
        Self {
            mode,
            source: source.into(),
            password: password.into(),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> UiError + '_ {
    move |source| UiError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Extension and size checks that can run before any byte is read.
/// Returns the file size.
pub fn check_source(mode: Mode, path: &Path) -> Result<u64> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if extension != mode.source_extension() {
        return Err(match mode {
            Mode::Encrypt => UiError::NotPdfFile,
            Mode::Decrypt => UiError::NotEncryptedFile,
        });
    }
    let meta = fs::metadata(path).map_err(io_error(path))?;
    if !meta.is_file() {
        return Err(io_error(path)(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file")));
    }
    if meta.len() > MAX_FILE_SIZE {
        return Err(UiError::TooLarge { size: meta.len() });
    }
    Ok(meta.len())
}

/// `<stem>.<ext>` next to `source`, or `<stem> (n).<ext>` if that is taken.
fn create_output(source: &Path, extension: &str) -> Result<(PathBuf, fs::File)> {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem} ({attempt}).{extension}")
        };
        let path = source.with_file_name(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(io_error(&path)(e)),
        }
    }
    Err(io_error(source)(io::Error::new(io::ErrorKind::AlreadyExists, "no free output name")))
}

/// Runs the job on the calling thread and returns the written path.
pub fn process(job: &Job) -> Result<PathBuf> {
    check_source(job.mode, &job.source)?;
    let data = fs::read(&job.source).map_err(io_error(&job.source))?;
    let output = match job.mode {
        Mode::Encrypt => envelope::encrypt_pdf(&data, &job.password)?,
        Mode::Decrypt => envelope::decrypt_pdf(&data, &job.password)?,
    };

    let (path, mut file) = create_output(&job.source, job.mode.output_extension())?;
    if let Err(e) = file.write_all(&output).and_then(|()| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(&path);
        return Err(io_error(&path)(e));
    }
    debug!(bytes = output.len(), "output written");
    info!(mode = %job.mode, source = ?job.source, output = ?path, "file processed");
    Ok(path)
}

/// [`process`] on the blocking pool.
pub async fn run(job: Job) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || process(&job)).await?
}
