//! @acp:module "Gzip"
//! @acp:summary "gzip compression of build artifacts via flate2"
//! @acp:domain build
//! @acp:layer utility

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::Compressor;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    level: Compression,
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: Compression::best(),
        }
    }
}

impl Compressor for GzipCompressor {
    fn compress(&self, src: &Path, dest: &Path) -> Result<()> {
        let mut reader = BufReader::new(File::open(src)?);
        let mut encoder = GzEncoder::new(BufWriter::new(File::create(dest)?), self.level);
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_gzip_decompresses_to_source() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("app.js");
        let dest = dir.path().join("app.js.gz");
        let content = "const answer = 42;\n".repeat(100);
        std::fs::write(&src, &content).unwrap();

        GzipCompressor::default().compress(&src, &dest).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(File::open(&dest).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, content);
    }
}
