//! 清单（sidecar）：传输身份头 + 已完成分片记录，断点续传的持久化依据。

pub mod header;
pub mod sidecar;

pub use header::ManifestHeader;
pub use sidecar::Manifest;
