use serde::{Deserialize, Serialize};

/// 传输方式。决定资源如何被切分为分片以及并发度的上限。
///
/// - `File`：从已存在的清单文件恢复传输（断点续传入口）
/// - `Full`：不切分，单流下载整个资源
/// - `Piece`：严格按分片大小切分，不受线程上限约束
/// - `Multithread`：默认方式，分片数 = min(⌈size/分片大小⌉, 最大线程数)
/// - `Mandatory`：强制切成恰好「最大线程数」个分片，小文件可能失败
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    File,
    Full,
    Piece,
    Multithread,
    Mandatory,
}

impl Default for TransferMethod {
    fn default() -> Self {
        TransferMethod::Multithread
    }
}
