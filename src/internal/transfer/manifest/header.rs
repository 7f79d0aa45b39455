//! 清单头：sidecar 文件第 0 行的 JSON，记录传输的身份信息。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::internal::transfer::structs::transfer_method::TransferMethod;

/// 清单头。字段名与磁盘上的 JSON 键一一对应：
///
/// ```text
/// {"url":..,"fileName":..,"content-length":N,"hash":H,"threads":T,"method":M,"header":{..},"cookie":{..}}
/// ```
///
/// `threads` 记录的是规划后实际生效的分片数，恢复时据此反推出相同的分片划分。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub url: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "content-length")]
    pub content_length: u64,
    pub hash: Option<String>,
    pub threads: u64,
    pub method: TransferMethod,
    #[serde(rename = "header", default)]
    pub headers: HashMap<String, String>,
    #[serde(rename = "cookie", default)]
    pub cookies: HashMap<String, String>,
}
