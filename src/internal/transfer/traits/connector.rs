//! 连接器接口：一次 HTTP 交换（普通或 Range 请求）的能力抽象。
//!
//! 引擎只依赖本 trait；reqwest 实现见
//! [`crate::internal::transfer::connector::reqwest_connector`]，测试中可注入
//! 模拟实现。连接器自身负责单次请求层面的超时与重定向，引擎只决定请求哪些
//! 区间、并发多少、结果不符合预期时怎么办。

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::internal::transfer::structs::piece_range::PieceRange;

/// 响应体字节流；传输途中的错误以 `io::Error` 表示，由调用方按超时类失败处理。
pub type BodyStream = BoxStream<'static, Result<Bytes, std::io::Error>>;

/// 发起一次交换时的参数（形参超过 3 个，用 struct 承载）。
pub struct ExchangeParams<'a> {
    pub url: &'a str,
    /// 请求头，键一律小写
    pub headers: &'a HashMap<String, String>,
    pub cookies: &'a HashMap<String, String>,
    /// 需要 Range 请求时给出闭区间，渲染为 `bytes=start-end`；`None` 为普通 GET
    pub range: Option<PieceRange>,
}

/// 一次交换的结果：状态码、响应头（键小写）与响应体流。
///
/// 传输层失败（超时、无响应、连接被拒）不作为错误抛出，而是返回状态码为
/// 408 哨兵、响应体为空的回复。
pub struct ExchangeReply {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: BodyStream,
}

impl ExchangeReply {
    /// 超时 / 无响应哨兵回复（408，空响应体）。
    pub fn timeout() -> Self {
        Self {
            status: 408,
            headers: HashMap::new(),
            body: stream::empty().boxed(),
        }
    }

    /// 按小写名读取响应头。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// 解析 `content-length` 响应头；缺失或非法时返回 `None`。
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length")?.trim().parse().ok()
    }
}

/// 连接器能力：执行一次交换并返回状态、头与响应体流。
#[async_trait]
pub trait Connector: Send + Sync {
    async fn exchange(&self, params: ExchangeParams<'_>) -> ExchangeReply;
}
