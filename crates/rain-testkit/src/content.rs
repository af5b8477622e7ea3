//! Content addressing for blobs held by the in-memory descriptor store

use rain_core::{BlobCodec, DescriptorRef};
use sha2::{Digest, Sha256};

/// Content reference of `bytes` encoded with `codec`
///
/// The codec is part of the digest input, so identical bytes under different
/// codecs never share a reference.
pub fn content_ref(codec: BlobCodec, bytes: &[u8]) -> DescriptorRef {
    let mut hasher = Sha256::new();
    hasher.update(codec.name().as_bytes());
    hasher.update([0u8]);
    hasher.update(bytes);
    DescriptorRef::new(format!("sha256-{}", hex::encode(hasher.finalize())))
}
