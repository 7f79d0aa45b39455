//! 清单 sidecar 文件：头部一行 + 每个已完成分片一行，追加即落盘。
//!
//! sidecar 在磁盘上的存在本身就是「传输未完成」的标记：下次调用发现它存在
//! 就走恢复路径。分片只有在对应行被持久化写入之后才算「完成」，与内存中的
//! 进程是否存活无关，这是断点续传崩溃安全的根基。

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::internal::transfer::structs::piece_range::PieceRange;
use crate::internal::transfer::structs::transfer_error::TransferError;

use super::header::ManifestHeader;

/// 清单 sidecar。`record_piece` 由多个分片任务并发调用，内部用互斥锁串行化，
/// 保证任意两行的字节不会交错。
///
/// 写句柄放在 `Option` 里：`delete` 先关闭句柄再删文件（Windows 上删除
/// 打开中的文件会失败）。
pub struct Manifest {
    path: PathBuf,
    writer: Mutex<Option<File>>,
}

impl Manifest {
    /// sidecar 是否已存在（即上次传输未完成）。
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// 新建 sidecar 并写入头部行。路径已存在且不是普通文件时为致命错误。
    pub async fn create(path: &Path, header: &ManifestHeader) -> Result<Self, TransferError> {
        if let Ok(meta) = fs::metadata(path).await {
            if !meta.is_file() {
                return Err(TransferError::SidecarNotAFile(path.to_path_buf()));
            }
        }

        let file = write_header_file(path, header).await?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(Some(file)),
        })
    }

    /// 读取已有 sidecar：第 0 行解析为头部（失败为致命错误），其余行解析为
    /// 已完成分片集合（脏行忽略）。返回的清单已处于可追加状态。
    pub async fn load(
        path: &Path,
    ) -> Result<(Self, ManifestHeader, HashSet<PieceRange>), TransferError> {
        let meta = fs::metadata(path)
            .await
            .map_err(TransferError::ReadFile)?;
        if !meta.is_file() {
            return Err(TransferError::SidecarNotAFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(TransferError::ReadFile)?;
        let mut lines = content.lines();
        let header_line = lines
            .next()
            .ok_or_else(|| TransferError::ManifestHeader("清单为空".to_string()))?;
        let header: ManifestHeader = serde_json::from_str(header_line)
            .map_err(|e| TransferError::ManifestHeader(e.to_string()))?;

        let completed: HashSet<PieceRange> =
            lines.filter_map(PieceRange::parse_id).collect();

        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .await
            .map_err(TransferError::ReadFile)?;

        Ok((
            Self {
                path: path.to_path_buf(),
                writer: Mutex::new(Some(file)),
            },
            header,
            completed,
        ))
    }

    /// 记录一个成功的分片：追加一行 `"start-end"`，返回前刷到磁盘。
    pub async fn record_piece(&self, range: &PieceRange) -> Result<(), TransferError> {
        let mut guard = self.writer.lock().await;
        let file = guard.as_mut().ok_or_else(|| {
            TransferError::SchedulerInternal("清单已删除，无法追加".into())
        })?;
        let line = format!("{}\n", range.id());
        file.write_all(line.as_bytes())
            .await
            .map_err(TransferError::ManifestWrite)?;
        file.flush().await.map_err(TransferError::ManifestWrite)?;
        file.sync_data().await.map_err(TransferError::ManifestWrite)?;
        Ok(())
    }

    /// 重置：截断重写头部行，丢弃全部已记录分片。用于校验失败之后，
    /// 迫使下一次尝试重新拉取每一个分片。
    pub async fn reset(&self, header: &ManifestHeader) -> Result<(), TransferError> {
        let mut guard = self.writer.lock().await;
        let file = write_header_file(&self.path, header).await?;
        *guard = Some(file);
        Ok(())
    }

    /// 传输最终成功后删除 sidecar（先关闭写句柄）。
    pub async fn delete(&self) -> Result<(), TransferError> {
        let mut guard = self.writer.lock().await;
        *guard = None;
        fs::remove_file(&self.path)
            .await
            .map_err(TransferError::RemoveFile)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 截断写入头部行并落盘，返回处于追加位置的句柄。
async fn write_header_file(path: &Path, header: &ManifestHeader) -> Result<File, TransferError> {
    let json = serde_json::to_string(header)
        .map_err(|e| TransferError::ManifestHeader(e.to_string()))?;
    let mut file = File::create(path)
        .await
        .map_err(TransferError::CreateFile)?;
    file.write_all(format!("{}\n", json).as_bytes())
        .await
        .map_err(TransferError::ManifestWrite)?;
    file.flush().await.map_err(TransferError::ManifestWrite)?;
    file.sync_data().await.map_err(TransferError::ManifestWrite)?;
    Ok(file)
}
