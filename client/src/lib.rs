pub mod app;
pub mod commands;
pub mod infrastructure;
pub mod modules;
pub mod shared;

use tracing_subscriber::EnvFilter;

pub use app::{care_text, ChatClient, ClientPorts};
pub use commands::InputCommand;
pub use shared::{AppError, AppResult};

const DEFAULT_LOG_FILTER: &str = "warmchat=info,warmchat_lib=info";

/// 初始化日志
///
/// RUST_LOG 优先，未设置时使用默认过滤规则。日志写到 stderr，避免与对话输出混在一起
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
