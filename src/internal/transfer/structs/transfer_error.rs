//! 传输相关错误类型。
//!
//! 只有调用方无法恢复的配置错误与 I/O 错误会走到这里；分片层面的失败一律
//! 转成状态码（见 [`super::transfer_status::TransferStatus`]），不会作为
//! 错误向上抛。

use std::path::PathBuf;

use thiserror::Error;

use crate::internal::transfer::traits::hook::HookAbort;

#[derive(Debug, Error)]
pub enum TransferError {
    /// 线程数必须 ≥ 1，构建请求时立即检查，永不重试。
    #[error("线程数必须大于 0")]
    ZeroThreads,

    #[error("分片大小必须大于 0")]
    ZeroPieceSize,

    /// 文件名编码后超出固定上限（240 字节），致命且不可重试。
    #[error("文件名过长（超过 {1} 字节）: {0}")]
    FileNameTooLong(String, usize),

    /// 清单路径被目录等非普通文件占用。
    #[error("清单路径已存在且不是普通文件: {0}")]
    SidecarNotAFile(PathBuf),

    /// 清单第 0 行缺失或无法解析为头部 JSON。
    #[error("清单头无法解析: {0}")]
    ManifestHeader(String),

    #[error("HTTP 客户端构建失败: {0}")]
    ConnectorBuild(String),

    #[error("创建目录失败: {0}")]
    CreateDir(std::io::Error),

    #[error("创建文件失败: {0}")]
    CreateFile(std::io::Error),

    #[error("写入文件失败: {0}")]
    WriteFile(std::io::Error),

    #[error("读取文件失败: {0}")]
    ReadFile(std::io::Error),

    #[error("删除文件失败: {0}")]
    RemoveFile(std::io::Error),

    /// 清单追加写失败（磁盘满等）。
    #[error("清单写入失败: {0}")]
    ManifestWrite(std::io::Error),

    /// 分片任务 join 失败。
    #[error("分片任务失败: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("分片调度内部错误: {0}")]
    SchedulerInternal(String),

    /// error_exit 开启时，整体校验失败以错误形式抛出。
    #[error("内容校验失败: 期望 {expected}，实际 {computed}")]
    HashMismatch { expected: String, computed: String },

    #[error("传输被钩子中止")]
    HookAbort(#[from] HookAbort),
}
