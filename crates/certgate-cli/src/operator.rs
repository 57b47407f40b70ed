//! Terminal implementations of the operator prompt and the save sink.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use certgate_core::backend::{BundleSink, Confirm};
use certgate_core::error::{CertgateError, CertgateResult};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

/// Asks on stderr and reads the answer from stdin, or answers yes when
/// `--yes` was given.
#[derive(Debug, Clone, Copy)]
pub enum TerminalPrompt {
    Interactive,
    AssumeYes,
}

impl Confirm for TerminalPrompt {
    async fn confirm(&self, prompt: &str) -> bool {
        match self {
            TerminalPrompt::AssumeYes => {
                eprintln!("{prompt} [y/N] yes (--yes)");
                true
            }
            TerminalPrompt::Interactive => {
                let mut stderr = tokio::io::stderr();
                let shown = async {
                    stderr.write_all(format!("{prompt} [y/N] ").as_bytes()).await?;
                    stderr.flush().await
                };
                if shown.await.is_err() {
                    return false;
                }
                let mut line = String::new();
                match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
                    Ok(_) => is_yes(&line),
                    Err(_) => false,
                }
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Writes files into a directory without ever replacing an existing one.
///
/// A one-time bundle cannot be fetched again, so a name collision picks
/// `name-1.ext`, `name-2.ext`, ... instead of failing.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidate(&self, file_name: &str, attempt: usize) -> PathBuf {
        if attempt == 0 {
            return self.dir.join(file_name);
        }
        let name = Path::new(file_name);
        let stem = name.file_stem().and_then(|s| s.to_str()).unwrap_or(file_name);
        match name.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.dir.join(format!("{stem}-{attempt}.{ext}")),
            None => self.dir.join(format!("{stem}-{attempt}")),
        }
    }
}

impl BundleSink for DirectorySink {
    async fn save(&self, file_name: &str, contents: &[u8]) -> CertgateResult<PathBuf> {
        let save_error = |path: &Path, e: std::io::Error| CertgateError::Save {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        // Server-supplied names are reduced to their last component.
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| CertgateError::Save {
                path: file_name.to_string(),
                reason: "not a file name".into(),
            })?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| save_error(self.dir.as_path(), e))?;

        let mut attempt = 0;
        loop {
            let path = self.candidate(file_name, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(mut file) => {
                    file.write_all(contents)
                        .await
                        .map_err(|e| save_error(&path, e))?;
                    file.flush().await.map_err(|e| save_error(&path, e))?;
                    debug!(path = %path.display(), bytes = contents.len(), "file saved");
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(save_error(&path, e)),
            }
        }
    }
}
