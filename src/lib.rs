/// 内部导出的模块
mod internal;

#[cfg(test)]
mod tests;

/// 导出核心入口函数
pub use internal::entrance::transfer::*;

/// 传输领域的对外导出：请求 / 引擎 / 状态 / 清单 / 连接器接口。
/// 不把能力限制死在入口函数里，以防有人要自己组装引擎
pub mod transfer {
    use crate::internal;

    // 结构体模型
    pub use internal::transfer::structs::*;

    // 引擎
    pub use internal::transfer::engine::TransferEngine;

    // 清单（sidecar）
    pub use internal::transfer::manifest::header::ManifestHeader;
    pub use internal::transfer::manifest::sidecar::Manifest;

    // 探测与文件名处理
    pub use internal::transfer::prober::file_name::{
        check_file_name, file_name_from_disposition, file_name_from_url,
        sanitize_file_name, MAX_FILE_NAME_BYTES,
    };
    pub use internal::transfer::prober::probe::{probe, ProbeOutcome, CONTENT_HASH_HEADER};

    // 连接器接口与内置实现
    pub use internal::transfer::connector::reqwest_connector::ReqwestConnector;
    pub use internal::transfer::traits::connector::{
        BodyStream, Connector, ExchangeParams, ExchangeReply,
    };

    // 钩子
    pub use internal::transfer::traits::hook::{HookAbort, TransferHook};

    // 校验
    pub use internal::transfer::verifier::{sha256_of_file, verify_output};

    // sidecar 路径规则
    pub use internal::transfer::structs::transfer_request::sidecar_path_for;
}
