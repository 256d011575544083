use std::path::Path;

use tokio::process::Command;
use tracing::warn;

use super::ExtractionError;

/// External converter for legacy Word `.doc` files.
///
/// The configured command line (e.g. `antiword` or `catdoc -w`) is invoked with the
/// file path appended and must write plain text to stdout.
#[derive(Debug, Clone)]
pub struct DocConverter {
    program: String,
    args: Vec<String>,
}

impl DocConverter {
    pub fn new(command_line: &str) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "antiword".to_string());
        Self {
            program,
            args: parts.collect(),
        }
    }

    /// Converts via the external tool, falling back to best-effort decoding of the raw bytes.
    pub(super) async fn convert(
        &self,
        filename: &str,
        path: &Path,
        bytes: &[u8],
    ) -> Result<String, ExtractionError> {
        let reason = match self.run(path).await {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => format!("{} produced no text", self.program),
            Err(reason) => reason,
        };
        warn!("DOC conversion of '{filename}' failed ({reason}); falling back to raw decoding");

        let decoded = decode_raw(bytes);
        if decoded.trim().is_empty() {
            return Err(ExtractionError::Conversion {
                filename: filename.to_string(),
                reason,
            });
        }
        Ok(decoded)
    }

    async fn run(&self, path: &Path) -> Result<String, String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to launch {}: {e}", self.program))?;

        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Lossy UTF-8 decode with replacement and control characters removed.
fn decode_raw(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
