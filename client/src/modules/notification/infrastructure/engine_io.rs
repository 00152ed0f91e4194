use serde_json::Value;
use std::time::Duration;

use crate::modules::notification::ChannelError;

/// Engine.IO 协议版本
pub const ENGINE_IO_VERSION: &str = "4";

/// Socket.IO 握手路径
pub const SOCKET_IO_PATH: &str = "/socket.io/";

/// 服务端未声明时的心跳间隔（毫秒）
pub const DEFAULT_PING_INTERVAL_MS: u64 = 25_000;

/// 服务端未声明时的心跳超时（毫秒）
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 20_000;

/// Engine.IO 数据包
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    /// `0{...}` 握手参数
    Open(Value),
    /// `1`
    Close,
    /// `2` 服务端心跳，可带数据
    Ping(String),
    /// `3`
    Pong(String),
    /// `4...` 承载 Socket.IO 数据包
    Message(SocketPacket),
    /// `5` / `6` 传输升级相关，WebSocket 直连时忽略
    Noop,
}

/// Socket.IO 数据包（仅默认命名空间关心的部分）
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// `0` 命名空间连接确认
    Connect(Option<Value>),
    /// `1` 命名空间断开
    Disconnect,
    /// `2` 事件
    Event { name: String, payload: Value },
    /// `4` 连接被拒绝
    ConnectError(Value),
    /// ack 等本客户端不处理的类型
    Other(char),
}

/// 解码一个文本帧
pub fn decode(frame: &str) -> Result<EnginePacket, ChannelError> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ChannelError::Protocol("empty frame".to_string()))?;
    let rest = chars.as_str();

    match kind {
        '0' => serde_json::from_str(rest)
            .map(EnginePacket::Open)
            .map_err(|e| ChannelError::Protocol(format!("invalid open packet: {}", e))),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(rest.to_string())),
        '3' => Ok(EnginePacket::Pong(rest.to_string())),
        '4' => decode_socket_packet(rest).map(EnginePacket::Message),
        '5' | '6' => Ok(EnginePacket::Noop),
        other => Err(ChannelError::Protocol(format!(
            "unknown engine packet type '{}'",
            other
        ))),
    }
}

fn decode_socket_packet(packet: &str) -> Result<SocketPacket, ChannelError> {
    let mut chars = packet.chars();
    let kind = chars
        .next()
        .ok_or_else(|| ChannelError::Protocol("empty socket packet".to_string()))?;
    let body = strip_ack_id(strip_namespace(chars.as_str()));

    match kind {
        '0' => Ok(SocketPacket::Connect(serde_json::from_str(body).ok())),
        '1' => Ok(SocketPacket::Disconnect),
        '2' => decode_event(body),
        '4' => Ok(SocketPacket::ConnectError(
            serde_json::from_str(body).unwrap_or(Value::String(body.to_string())),
        )),
        other => Ok(SocketPacket::Other(other)),
    }
}

/// 去掉 `/ns,` 命名空间前缀
fn strip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(idx) => &body[idx + 1..],
            None => "",
        }
    } else {
        body
    }
}

/// 去掉事件前的 ack 编号
fn strip_ack_id(body: &str) -> &str {
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// `["name", payload...]`，多个参数时载荷为数组
fn decode_event(body: &str) -> Result<SocketPacket, ChannelError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ChannelError::Protocol(format!("invalid event body: {}", e)))?;
    let Value::Array(mut items) = value else {
        return Err(ChannelError::Protocol("event body is not an array".to_string()));
    };
    if items.is_empty() {
        return Err(ChannelError::Protocol("event without name".to_string()));
    }

    let name = match items.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(ChannelError::Protocol(format!(
                "event name is not a string: {}",
                other
            )))
        }
    };
    let payload = match items.len() {
        0 => Value::Null,
        1 => items.remove(0),
        _ => Value::Array(items),
    };

    Ok(SocketPacket::Event { name, payload })
}

/// 握手参数给出的静默上限：`pingInterval + pingTimeout`
///
/// 缺失的字段取 Engine.IO 默认值
pub fn heartbeat_timeout(open: &Value) -> Duration {
    let field = |name: &str, default: u64| open.get(name).and_then(Value::as_u64).unwrap_or(default);
    Duration::from_millis(
        field("pingInterval", DEFAULT_PING_INTERVAL_MS)
            .saturating_add(field("pingTimeout", DEFAULT_PING_TIMEOUT_MS)),
    )
}

/// 默认命名空间连接请求
pub fn encode_connect() -> String {
    "40".to_string()
}

/// 心跳回应，原样带回数据
pub fn encode_pong(data: &str) -> String {
    format!("3{}", data)
}

/// 默认命名空间断开
pub fn encode_disconnect() -> String {
    "41".to_string()
}

/// 事件帧 `42["name",payload]`
pub fn encode_event(name: &str, payload: &Value) -> Result<String, ChannelError> {
    let body = serde_json::to_string(&Value::Array(vec![
        Value::String(name.to_string()),
        payload.clone(),
    ]))
    .map_err(|e| ChannelError::Send(e.to_string()))?;
    Ok(format!("42{}", body))
}
