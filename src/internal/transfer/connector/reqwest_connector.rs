//! 基于 reqwest 的连接器实现：每次传输构建一个客户端（代理、Cookie、超时），
//! 单次交换内部由 reqwest 处理重定向与请求级超时。

use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, RANGE};
use reqwest::Client;

use crate::internal::transfer::structs::transfer_error::TransferError;
use crate::internal::transfer::structs::transfer_request::TransferRequest;
use crate::internal::transfer::traits::connector::{
    Connector, ExchangeParams, ExchangeReply,
};

/// 单次请求的超时（秒）。只有请求级超时，没有全局传输超时。
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct ReqwestConnector {
    client: Client,
}

impl ReqwestConnector {
    /// 按传输请求构建客户端：代理（含可选 basic auth）、Cookie 存储、请求级超时。
    pub fn from_request(request: &TransferRequest) -> Result<Self, TransferError> {
        let mut builder = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true);

        if let Some(proxy) = &request.proxy {
            let mut p = reqwest::Proxy::all(&proxy.url)
                .map_err(|e| TransferError::ConnectorBuild(e.to_string()))?;
            if let (Some(user), Some(pass)) = (&proxy.username, &proxy.password) {
                p = p.basic_auth(user, pass);
            }
            builder = builder.proxy(p);
        }

        let client = builder
            .build()
            .map_err(|e| TransferError::ConnectorBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

/// 请求头键值对转为 reqwest 的 HeaderMap；非法键值直接跳过。
fn build_header_map(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = match HeaderName::from_bytes(key.as_bytes()) {
            Ok(n) => n,
            Err(_) => continue,
        };
        let value = match HeaderValue::from_str(value) {
            Ok(v) => v,
            Err(_) => continue,
        };
        map.insert(name, value);
    }
    map
}

/// Cookie 键值对拼成一个 `Cookie` 请求头行：`k1=v1; k2=v2`。
fn build_cookie_line(cookies: &HashMap<String, String>) -> String {
    cookies
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl Connector for ReqwestConnector {
    async fn exchange(&self, params: ExchangeParams<'_>) -> ExchangeReply {
        let mut req = self
            .client
            .get(params.url)
            .headers(build_header_map(params.headers));

        if !params.cookies.is_empty() {
            if let Ok(v) = HeaderValue::from_str(&build_cookie_line(params.cookies)) {
                req = req.header(COOKIE, v);
            }
        }

        if let Some(range) = params.range {
            req = req.header(RANGE, format!("bytes={}-{}", range.start, range.end));
        }

        // 传输层失败（超时、连接被拒、无响应）一律折算为 408 哨兵回复
        let resp = match req.send().await {
            Ok(r) => r,
            Err(_) => return ExchangeReply::timeout(),
        };

        let status = resp.status().as_u16();
        let mut headers = HashMap::new();
        for (name, value) in resp.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        let body = resp
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        ExchangeReply {
            status,
            headers,
            body,
        }
    }
}
