use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use super::TransportEvent;

/// 推送通道错误类型
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Connect failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Channel closed")]
    Closed,
}

/// 推送传输端口
///
/// 重连策略由实现自行负责，对上层只体现为事件流中的
/// `Disconnected` / `Reconnected`
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// 打开通道，返回事件流
    async fn connect(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<mpsc::Receiver<TransportEvent>, ChannelError>;

    /// 发送命名事件
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ChannelError>;

    /// 关闭通道并停止重连
    async fn close(&self);
}
