//! 校验器：对输出文件整体做 SHA-256，与期望哈希比对（不区分大小写）。
//!
//! 「连续两次得到同一个错误哈希即停」的回环检测由引擎在重试循环里维护，
//! 这里只负责计算与比较。

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::internal::transfer::structs::transfer_error::TransferError;

/// 计算文件内容的 SHA-256，返回小写 hex。
pub async fn sha256_of_file(path: &Path) -> Result<String, TransferError> {
    let mut file = File::open(path).await.map_err(TransferError::ReadFile)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await.map_err(TransferError::ReadFile)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// 校验输出文件：哈希一致返回 `None`，不一致返回实际算出的哈希（小写 hex）。
pub async fn verify_output(
    output: &Path,
    expected: &str,
) -> Result<Option<String>, TransferError> {
    let computed = sha256_of_file(output).await?;
    if computed.eq_ignore_ascii_case(expected) {
        Ok(None)
    } else {
        Ok(Some(computed))
    }
}
