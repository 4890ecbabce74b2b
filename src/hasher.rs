use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake2::{Blake2b512, Blake2s256};
use digest::{Digest, DynDigest};
use md5::Md5;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use crate::error::Error;
use crate::progress::CancelToken;

/// Block size for chunked reads. Bounds memory regardless of file size and
/// sets the cancellation latency for the hashing loop.
const BLOCK_SIZE: usize = 64 * 1024;

/// Digest algorithm applied to every file in a run. The digest is the sole
/// identity key for duplicate detection, so it is fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
    Sha1,
    Md5,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Blake2s,
    Blake2b,
}

impl HashAlgorithm {
    /// Name used in the manifest header.
    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha3_224 => "sha3-224",
            HashAlgorithm::Sha3_256 => "sha3-256",
            HashAlgorithm::Sha3_384 => "sha3-384",
            HashAlgorithm::Sha3_512 => "sha3-512",
            HashAlgorithm::Blake2s => "blake2s",
            HashAlgorithm::Blake2b => "blake2b",
        }
    }

    fn hasher(&self) -> Box<dyn DynDigest> {
        match self {
            HashAlgorithm::Sha256 => Box::new(Sha256::new()),
            HashAlgorithm::Sha512 => Box::new(Sha512::new()),
            HashAlgorithm::Sha1 => Box::new(Sha1::new()),
            HashAlgorithm::Md5 => Box::new(Md5::new()),
            HashAlgorithm::Sha3_224 => Box::new(Sha3_224::new()),
            HashAlgorithm::Sha3_256 => Box::new(Sha3_256::new()),
            HashAlgorithm::Sha3_384 => Box::new(Sha3_384::new()),
            HashAlgorithm::Sha3_512 => Box::new(Sha3_512::new()),
            HashAlgorithm::Blake2s => Box::new(Blake2s256::new()),
            HashAlgorithm::Blake2b => Box::new(Blake2b512::new()),
        }
    }
}

/// Stream a reader through the selected digest in fixed-size blocks.
///
/// Returns the hex digest and the byte count. The cancellation token is
/// checked between blocks; a set token fails with [`Error::Cancelled`].
/// `on_block` fires once per block read, letting the caller surface a
/// "processing <name>" notification without coupling the hashing core to
/// any observer.
pub fn compute_digest<R: Read>(
    mut reader: R,
    algorithm: HashAlgorithm,
    cancel: &CancelToken,
    on_block: &mut dyn FnMut(),
) -> Result<(String, u64), Error> {
    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut byte_count: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        byte_count += read as u64;
        on_block();
    }

    Ok((hex::encode(hasher.finalize()), byte_count))
}

/// Hash an on-disk file.
pub fn hash_file(
    path: &Path,
    algorithm: HashAlgorithm,
    cancel: &CancelToken,
    on_block: &mut dyn FnMut(),
) -> Result<(String, u64), Error> {
    let file = File::open(path)?;
    compute_digest(BufReader::new(file), algorithm, cancel, on_block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest_of(data: &[u8], algorithm: HashAlgorithm) -> (String, u64) {
        compute_digest(data, algorithm, &CancelToken::new(), &mut || {}).unwrap()
    }

    #[test]
    fn test_sha256_known_value() {
        let (digest, size) = digest_of(b"hello", HashAlgorithm::Sha256);
        assert_eq!(
            digest,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(size, 5);
    }

    #[test]
    fn test_md5_empty_input() {
        let (digest, size) = digest_of(b"", HashAlgorithm::Md5);
        assert_eq!(digest, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(size, 0);
    }

    #[test]
    fn test_sha1_known_value() {
        let (digest, _) = digest_of(b"abc", HashAlgorithm::Sha1);
        assert_eq!(digest, "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_digest_is_idempotent() {
        let data = vec![0x5Au8; 200_000]; // spans multiple blocks
        for algorithm in [
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha3_512,
            HashAlgorithm::Blake2b,
        ] {
            let first = digest_of(&data, algorithm);
            let second = digest_of(&data, algorithm);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_cancelled_token_stops_hashing() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result =
            compute_digest(&b"data"[..], HashAlgorithm::Sha256, &cancel, &mut || {});
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_block_callback_fires_per_block() {
        let data = vec![0u8; 150_000]; // three 64 KiB blocks
        let mut blocks = 0usize;
        let cancel = CancelToken::new();
        compute_digest(&data[..], HashAlgorithm::Sha256, &cancel, &mut || {
            blocks += 1;
        })
        .unwrap();
        assert_eq!(blocks, 3);
    }
}
