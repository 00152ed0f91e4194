use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 推送通道连接状态
///
/// 只有两个状态，没有“连接中”
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl From<bool> for ConnectionState {
    fn from(connected: bool) -> Self {
        if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }
}

/// 传输层上报的事件
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// 首次握手成功
    Connected,
    /// 连接断开
    Disconnected,
    /// 断线后重新握手成功
    Reconnected,
    /// 服务端推送的命名事件
    Event { name: String, payload: Value },
}
