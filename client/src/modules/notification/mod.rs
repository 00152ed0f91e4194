// Notification Module - 推送通道模块
//
// - domain: 连接状态与传输事件
// - ports: PushTransport 传输端口
// - channel: NotificationChannel，维护连接状态并分发推送
// - infrastructure: Socket.IO over WebSocket 传输实现

mod channel;
mod domain;
pub mod infrastructure;
mod ports;

pub use channel::*;
pub use domain::*;
pub use ports::*;
