//! 传输领域模块：可恢复的并发文件传输引擎。
//!
//! 对外导出以 [`crate::transfer`] 为准，此处仅做模块划分，不重复 pub use。

pub mod connector;
pub mod engine;
pub mod manifest;
pub mod prober;
pub mod scheduler;
pub mod structs;
pub mod traits;
pub mod verifier;
