//! 传输请求：一次传输的全部配置，构建完成后只读。
//!
//! 引擎不会修改请求；代理、Cookie 等不挂在长生命周期的共享对象上，而是
//! 随请求显式传入每次操作。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::proxy_descriptor::ProxyDescriptor;
use super::retry_policy::RetryPolicy;
use super::transfer_error::TransferError;
use super::transfer_method::TransferMethod;
use crate::internal::transfer::prober::file_name::{check_file_name, sanitize_file_name};

/// 默认最大线程数（分片并发上限）
pub const DEFAULT_MAX_THREADS: u64 = 16;

/// 默认分片大小提示：1MB
pub const DEFAULT_PIECE_SIZE: u64 = 1024 * 1024;

/// 一次传输的配置。通过 [`TransferRequest::builder`] 链式构建，
/// `build()` 时做一次性校验（线程数、分片大小、文件名长度）。
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// 资源地址
    pub url: String,
    /// 输出目录
    pub save_dir: PathBuf,
    /// 文件名覆盖；未设置时由探测结果（disposition 头或 URL）决定
    pub file_name: Option<String>,
    /// 请求头，键一律小写存储
    pub headers: HashMap<String, String>,
    /// Cookie 键值对
    pub cookies: HashMap<String, String>,
    /// 代理描述；未设置时直连
    pub proxy: Option<ProxyDescriptor>,
    /// 最大线程数（≥ 1，构建时校验）
    pub max_threads: u64,
    /// 分片大小提示（字节）
    pub piece_size: u64,
    /// 期望的内容哈希（小写 hex）；未设置时以探测到的哈希头为准
    pub expected_hash: Option<String>,
    /// 分片重试策略
    pub retry: RetryPolicy,
    /// 致命错误是抛出（true）还是折算成状态码返回（false）
    pub error_exit: bool,
    /// 请求的传输方式；实际生效方式由规划器决定
    pub method: TransferMethod,
}

impl TransferRequest {
    pub fn builder(url: impl Into<String>, save_dir: impl Into<PathBuf>) -> TransferRequestBuilder {
        TransferRequestBuilder {
            url: url.into(),
            save_dir: save_dir.into(),
            file_name: None,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            proxy: None,
            max_threads: DEFAULT_MAX_THREADS,
            piece_size: DEFAULT_PIECE_SIZE,
            expected_hash: None,
            retry: RetryPolicy::default(),
            error_exit: false,
            method: TransferMethod::default(),
        }
    }

    /// 输出文件的完整路径（目录 + 实际文件名）。
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.save_dir.join(file_name)
    }

    /// 输出文件对应的清单 sidecar 路径：`<输出文件>.manifest`。
    pub fn sidecar_path(&self, file_name: &str) -> PathBuf {
        sidecar_path_for(&self.output_path(file_name))
    }
}

/// 某个输出文件对应的清单 sidecar 路径。
pub fn sidecar_path_for(output: &Path) -> PathBuf {
    let mut os = output.as_os_str().to_owned();
    os.push(".manifest");
    PathBuf::from(os)
}

/// 传输请求构建器；所有配置项可选，URL 与输出目录除外。
#[derive(Debug, Clone)]
pub struct TransferRequestBuilder {
    url: String,
    save_dir: PathBuf,
    file_name: Option<String>,
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    proxy: Option<ProxyDescriptor>,
    max_threads: u64,
    piece_size: u64,
    expected_hash: Option<String>,
    retry: RetryPolicy,
    error_exit: bool,
    method: TransferMethod,
}

impl TransferRequestBuilder {
    /// 覆盖输出文件名（构建时做非法字符清洗与长度校验）。
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// 追加一个请求头；键按小写存储，同键覆盖。
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// 追加一个 Cookie。
    pub fn cookie(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(key.into(), value.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyDescriptor) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// 设置最大线程数；0 会在 `build()` 时报致命错误。
    pub fn max_threads(mut self, n: u64) -> Self {
        self.max_threads = n;
        self
    }

    /// 设置分片大小提示（字节）。
    pub fn piece_size(mut self, bytes: u64) -> Self {
        self.piece_size = bytes;
        self
    }

    /// 设置期望哈希；统一转为小写存储，比较时不区分大小写。
    pub fn expected_hash(mut self, hash: impl AsRef<str>) -> Self {
        self.expected_hash = Some(hash.as_ref().to_ascii_lowercase());
        self
    }

    /// 设置分片失败最大重试次数。
    pub fn max_retries(mut self, n: usize) -> Self {
        self.retry.max_retries = n;
        self
    }

    /// 设置重试间隔（毫秒）。
    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.retry.retry_delay_ms = ms;
        self
    }

    /// 开启无限重试（分片层面不限次数，校验失败后循环重试直到回环检测触发）。
    pub fn unlimited_retry(mut self) -> Self {
        self.retry.unlimited = true;
        self
    }

    /// 追加一个额外可重试的状态码。
    pub fn retry_on(mut self, code: u16) -> Self {
        if !self.retry.extra_retry_codes.contains(&code) {
            self.retry.extra_retry_codes.push(code);
        }
        self
    }

    /// 致命错误直接抛出，而不是折算成状态码返回。
    pub fn error_exit(mut self) -> Self {
        self.error_exit = true;
        self
    }

    pub fn method(mut self, method: TransferMethod) -> Self {
        self.method = method;
        self
    }

    /// 校验并生成只读请求。线程数为 0、分片大小为 0、文件名过长都是致命错误，
    /// 在任何网络调用之前就报出。
    pub fn build(self) -> Result<TransferRequest, TransferError> {
        if self.max_threads == 0 {
            return Err(TransferError::ZeroThreads);
        }
        if self.piece_size == 0 {
            return Err(TransferError::ZeroPieceSize);
        }

        let file_name = match self.file_name {
            Some(raw) => {
                let cleaned = sanitize_file_name(&raw);
                check_file_name(&cleaned)?;
                Some(cleaned)
            }
            None => None,
        };

        Ok(TransferRequest {
            url: self.url,
            save_dir: self.save_dir,
            file_name,
            headers: self.headers,
            cookies: self.cookies,
            proxy: self.proxy,
            max_threads: self.max_threads,
            piece_size: self.piece_size,
            expected_hash: self.expected_hash,
            retry: self.retry,
            error_exit: self.error_exit,
            method: self.method,
        })
    }
}
