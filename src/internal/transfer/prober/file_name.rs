//! 输出文件名的来源解析、非法字符清洗与长度校验。

use percent_encoding::percent_decode_str;
use url::Url;

use crate::internal::transfer::structs::transfer_error::TransferError;

/// 文件名编码后的长度上限（字节）；超出为致命错误，不重试。
pub const MAX_FILE_NAME_BYTES: usize = 240;

/// 清洗文件名：文件系统非法字符与控制字符一律替换为 `_`。
pub fn sanitize_file_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if (c as u32) < 0x20 => '_',
            c => c,
        })
        .collect()
}

/// 长度校验：UTF-8 编码后超过 [`MAX_FILE_NAME_BYTES`] 字节时报致命错误。
pub fn check_file_name(name: &str) -> Result<(), TransferError> {
    if name.len() > MAX_FILE_NAME_BYTES {
        return Err(TransferError::FileNameTooLong(
            name.to_string(),
            MAX_FILE_NAME_BYTES,
        ));
    }
    Ok(())
}

/// 从 `content-disposition` 响应头解析文件名；
/// 形如 `attachment; filename="a.zip"` 或 `attachment; filename=a.zip`。
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let pos = lower.find("filename=")?;
    let rest = &value[pos + "filename=".len()..];
    let rest = rest.split(';').next()?.trim();
    let name = rest.trim_matches('"').trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// 从 URL 的最后一个路径段取文件名提示（percent 解码后）。
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.filter(|s| !s.is_empty()).next_back()?;
    let decoded = percent_decode_str(last).decode_utf8().ok()?;
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}
