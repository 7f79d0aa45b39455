//! 探测：发一次预备请求，发现资源大小、文件名与内容哈希。
//!
//! 调用方在请求里预先给出的文件名 / 哈希优先；未给出的字段从响应头补齐。
//! Full 方式会直接复用这里拿到的响应体流，不再发额外请求。

use crate::internal::transfer::structs::transfer_request::TransferRequest;
use crate::internal::transfer::traits::connector::{
    BodyStream, Connector, ExchangeParams,
};

use super::file_name::{file_name_from_disposition, file_name_from_url};

/// 承载内容哈希的自定义响应头（小写）。
pub const CONTENT_HASH_HEADER: &str = "x-content-hash";

/// 探测结果。交换失败时只有 `status`（408 哨兵或协议状态码）有意义。
pub struct ProbeOutcome {
    pub status: u16,
    /// `content-length` 响应头
    pub content_length: Option<u64>,
    /// 内容哈希（小写 hex）：请求里给的优先，其次是哈希响应头
    pub hash: Option<String>,
    /// 文件名：请求覆盖 > disposition 头 > URL 最后路径段
    pub file_name: Option<String>,
    /// 探测请求的响应体流；Full 方式直接消费它
    pub body: BodyStream,
}

impl ProbeOutcome {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 发起一次探测交换。注意这里不做文件名清洗与长度校验，由引擎统一处理。
pub async fn probe(connector: &dyn Connector, request: &TransferRequest) -> ProbeOutcome {
    let reply = connector
        .exchange(ExchangeParams {
            url: &request.url,
            headers: &request.headers,
            cookies: &request.cookies,
            range: None,
        })
        .await;

    let content_length = reply.content_length();

    let hash = request.expected_hash.clone().or_else(|| {
        reply
            .header(CONTENT_HASH_HEADER)
            .map(|h| h.trim().to_ascii_lowercase())
    });

    let file_name = request
        .file_name
        .clone()
        .or_else(|| {
            reply
                .header("content-disposition")
                .and_then(file_name_from_disposition)
        })
        .or_else(|| file_name_from_url(&request.url));

    ProbeOutcome {
        status: reply.status,
        content_length,
        hash,
        file_name,
        body: reply.body,
    }
}
