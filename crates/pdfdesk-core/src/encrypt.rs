//! Password protection via an external `qpdf`-style binary.
//!
//! The workspace does no password cryptography of its own; this module only
//! shapes the subprocess contract and classifies its failures. All file I/O
//! happens in a scoped temp directory that is removed on every exit path.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::PdfDeskError;

pub struct EncryptTool {
    binary: PathBuf,
}

impl Default for EncryptTool {
    fn default() -> Self {
        Self::new("qpdf")
    }
}

impl EncryptTool {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Encrypt `pdf` with the given user/owner password.
    pub fn encrypt(&self, pdf: &[u8], password: &str) -> Result<Vec<u8>, PdfDeskError> {
        self.run(pdf, |input, output| {
            vec![
                "--encrypt".into(),
                password.to_string(),
                password.to_string(),
                "256".into(),
                "--".into(),
                input,
                output,
            ]
        })
    }

    /// Remove password protection, failing with a distinct classification
    /// when the password is wrong.
    pub fn decrypt(&self, pdf: &[u8], password: &str) -> Result<Vec<u8>, PdfDeskError> {
        self.run(pdf, |input, output| {
            vec![
                format!("--password={}", password),
                "--decrypt".into(),
                input,
                output,
            ]
        })
    }

    fn run(
        &self,
        pdf: &[u8],
        args: impl FnOnce(String, String) -> Vec<String>,
    ) -> Result<Vec<u8>, PdfDeskError> {
        let workdir = tempfile::tempdir()
            .map_err(|e| PdfDeskError::Operation(format!("temp dir: {}", e)))?;
        let input = workdir.path().join("input.pdf");
        let output = workdir.path().join("output.pdf");
        std::fs::write(&input, pdf)
            .map_err(|e| PdfDeskError::Operation(format!("write input: {}", e)))?;

        let args = args(
            input.to_string_lossy().into_owned(),
            output.to_string_lossy().into_owned(),
        );
        debug!(binary = %self.binary.display(), "invoking encryption tool");

        let result = Command::new(&self.binary).args(&args).output();
        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PdfDeskError::ToolMissing(format!(
                    "'{}' not found; install qpdf to use password operations",
                    self.binary.display()
                )));
            }
            Err(e) => return Err(PdfDeskError::Operation(format!("spawn failed: {}", e))),
        };

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            if stderr.to_lowercase().contains("invalid password") {
                return Err(PdfDeskError::WrongPassword);
            }
            return Err(PdfDeskError::Operation(format!(
                "encryption tool failed: {}",
                stderr.trim()
            )));
        }

        std::fs::read(&output)
            .map_err(|e| PdfDeskError::Operation(format!("read output: {}", e)))
        // `workdir` drops here, removing the directory on all paths above.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_a_distinct_error() {
        let tool = EncryptTool::new("pdfdesk-test-binary-that-does-not-exist");
        let err = tool.encrypt(b"%PDF-1.7", "secret").unwrap_err();
        match err {
            PdfDeskError::ToolMissing(msg) => assert!(msg.contains("install qpdf")),
            other => panic!("expected ToolMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_decrypt_missing_binary_same_classification() {
        let tool = EncryptTool::new("pdfdesk-test-binary-that-does-not-exist");
        assert!(matches!(
            tool.decrypt(b"%PDF-1.7", "secret"),
            Err(PdfDeskError::ToolMissing(_))
        ));
    }
}
