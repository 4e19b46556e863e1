use std::path::{Path, PathBuf};

use clap::Args;
use tokio::io::AsyncReadExt;

use common::crypto::{hex_digest, Md5};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Print the MD5 fingerprint the backend uses for a file or string
#[derive(Args, Debug, Clone)]
pub struct Digest {
    /// File to fingerprint
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Fingerprint this string instead of a file
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("nothing to fingerprint")]
    NoInput,
}

#[async_trait::async_trait]
impl crate::op::Op for Digest {
    type Error = DigestError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(hex_digest(text)),
            (None, Some(path)) => Ok(format!("{}  {}", digest_file(path).await?, path.display())),
            (None, None) => Err(DigestError::NoInput),
        }
    }
}

/// Hash a file without holding it in memory
async fn digest_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_hex())
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_file_digest_matches_one_shot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data: Vec<u8> = (0..READ_BUFFER_SIZE * 2 + 17).map(|i| i as u8).collect();
        std::fs::write(&path, &data).unwrap();

        assert_eq!(digest_file(&path).await.unwrap(), hex_digest(&data));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(
            digest_file(&path).await.unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }
}
