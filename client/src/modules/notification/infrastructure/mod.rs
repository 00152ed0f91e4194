// Notification Infrastructure - 推送传输实现
//
// - engine_io: Engine.IO v4 / Socket.IO 文本帧编解码
// - socketio_transport: 基于 tokio-tungstenite 的 PushTransport 实现

mod engine_io;
mod socketio_transport;

pub use engine_io::*;
pub use socketio_transport::*;
