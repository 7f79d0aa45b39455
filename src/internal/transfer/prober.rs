//! 探测器：预备请求与文件名处理。

pub mod file_name;
pub mod probe;

pub use probe::{probe, ProbeOutcome, CONTENT_HASH_HEADER};
