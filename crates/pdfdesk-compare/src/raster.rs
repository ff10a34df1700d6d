//! Page rasterization contract.
//!
//! Rasterization itself is delegated to an external renderer; this module
//! defines the seam (`PageRasterizer`) and the production implementation
//! that shells out to poppler's `pdftoppm`. All subprocess I/O happens in a
//! scoped temp directory released on every exit path.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use image::RgbaImage;
use tracing::debug;

use crate::error::CompareError;

/// Renders every page of a document to equal-DPI bitmaps.
pub trait PageRasterizer {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<RgbaImage>, CompareError>;
}

/// `pdftoppm`-backed rasterizer.
pub struct PopplerRasterizer {
    binary: PathBuf,
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PopplerRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<RgbaImage>, CompareError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("input.pdf");
        let prefix = workdir.path().join("page");
        std::fs::write(&input, pdf)?;

        debug!(binary = %self.binary.display(), dpi, "rasterizing document");
        let result = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&input)
            .arg(&prefix)
            .output();
        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CompareError::ToolMissing(format!(
                    "'{}' not found; install poppler-utils to use visual compare",
                    self.binary.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        if !out.status.success() {
            return Err(CompareError::Raster(
                String::from_utf8_lossy(&out.stderr).trim().to_string(),
            ));
        }

        // pdftoppm emits page-1.png, page-2.png, ... page-10.png; sort by
        // the numeric suffix, not lexically.
        let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(workdir.path())? {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if let Some(rest) = name.strip_prefix("page-") {
                if let Some(num) = rest.strip_suffix(".png").and_then(|n| n.parse().ok()) {
                    numbered.push((num, path));
                }
            }
        }
        numbered.sort_by_key(|(num, _)| *num);

        let mut pages = Vec::with_capacity(numbered.len());
        for (_, path) in numbered {
            let img = image::open(&path)
                .map_err(|e| CompareError::Raster(format!("{}: {}", path.display(), e)))?;
            pages.push(img.to_rgba8());
        }
        Ok(pages)
        // `workdir` drops here, removing input and page images.
    }
}
