use crate::domain::ports::OcrEngine;
use crate::utils::error::OcrError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs the `tesseract` binary, feeding the image on stdin and reading text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: String,
}

impl TesseractCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Checks that the engine starts and that every language in `lang` (e.g. "kor+eng") is installed.
    pub async fn probe(&self, lang: &str) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.command)
            .arg("--list-langs")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| OcrError::Unavailable(format!("failed to start '{}': {}", self.command, e)))?;

        if !output.status.success() {
            return Err(OcrError::Unavailable(format!(
                "'{} --list-langs' exited with {}",
                self.command, output.status
            )));
        }

        // Older releases print the list on stderr.
        let listing = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            String::from_utf8_lossy(&output.stdout).into_owned()
        };

        let installed: Vec<String> = listing
            .lines()
            .skip(1)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        for wanted in lang.split('+') {
            if !installed.iter().any(|l| l == wanted) {
                return Err(OcrError::Unavailable(format!(
                    "language pack '{}' is not installed (available: {})",
                    wanted,
                    installed.join(", ")
                )));
            }
        }

        Ok(installed)
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn image_to_text(&self, image: &[u8], lang: &str) -> Result<String, OcrError> {
        tracing::debug!("Running {} on {} bytes (lang={})", self.command, image.len(), lang);

        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", lang])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrError::Unavailable(format!("failed to start '{}': {}", self.command, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Unavailable("engine stdin was not captured".to_string()))?;

        let feed = async move {
            let written = stdin.write_all(image).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| OcrError::Failed(format!("waiting for engine: {}", e)))?;
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            if stderr.contains("Failed loading language") || stderr.contains("Could not initialize") {
                return Err(OcrError::Unavailable(stderr.trim().to_string()));
            }
            return Err(OcrError::Failed(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if let Err(e) = written {
            tracing::warn!("⚠️ Engine exited before reading the whole image: {}", e);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
