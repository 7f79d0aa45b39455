pub mod hook_adapters;
pub mod piece_plan;
pub mod piece_range;
pub mod proxy_descriptor;
pub mod retry_policy;
pub mod transfer_error;
pub mod transfer_hooks_container;
pub mod transfer_method;
pub mod transfer_progress;
pub mod transfer_request;
pub mod transfer_status;

// 重导出公共类型
pub use piece_plan::{plan, plan_resume, PiecePlan};
pub use piece_range::PieceRange;
pub use proxy_descriptor::ProxyDescriptor;
pub use retry_policy::RetryPolicy;
pub use transfer_error::TransferError;
pub use transfer_hooks_container::TransferHooksContainer;
pub use transfer_method::TransferMethod;
pub use transfer_progress::{ProgressProperty, TransferProgress};
pub use transfer_request::{TransferRequest, TransferRequestBuilder};
pub use transfer_status::TransferStatus;
