use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::engine_io::{
    self, EnginePacket, SocketPacket, ENGINE_IO_VERSION, SOCKET_IO_PATH,
};
use crate::modules::config::ClientConfig;
use crate::modules::notification::{ChannelError, PushTransport, TransportEvent};

const EVENT_BUFFER: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type OutboundSlot = Arc<Mutex<Option<mpsc::UnboundedSender<String>>>>;

/// 构造 Socket.IO 握手地址
///
/// http(s) 端点转换为 ws(s)，路径固定为 `/socket.io/`，参数追加到查询串
pub fn socket_io_url(endpoint: &str, params: &[(String, String)]) -> Result<Url, ChannelError> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| ChannelError::Connect(format!("invalid endpoint '{}': {}", endpoint, e)))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ChannelError::Connect(format!(
                "unsupported scheme '{}'",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| ChannelError::Connect(format!("cannot use scheme '{}'", scheme)))?;
    url.set_path(SOCKET_IO_PATH);
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        query
            .append_pair("EIO", ENGINE_IO_VERSION)
            .append_pair("transport", "websocket");
        for (key, value) in params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

/// 下一次重连等待时间，翻倍并封顶
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Socket.IO over WebSocket 传输
///
/// 后台任务负责握手、心跳与断线重连
pub struct SocketIoTransport {
    reconnect_delay: Duration,
    reconnect_delay_max: Duration,
    outbound: OutboundSlot,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

impl SocketIoTransport {
    pub fn new(reconnect_delay: Duration, reconnect_delay_max: Duration) -> Self {
        Self {
            reconnect_delay,
            reconnect_delay_max: reconnect_delay_max.max(reconnect_delay),
            outbound: Arc::new(Mutex::new(None)),
            shutdown: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.reconnect_delay(), config.reconnect_delay_max())
    }

    fn stop_previous(&self, next: Option<watch::Sender<bool>>) {
        let previous = {
            let mut guard = self.shutdown.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::replace(&mut *guard, next)
        };
        if let Some(previous) = previous {
            let _ = previous.send(true);
        }
    }
}

#[async_trait]
impl PushTransport for SocketIoTransport {
    async fn connect(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<mpsc::Receiver<TransportEvent>, ChannelError> {
        let url = socket_io_url(endpoint, params)?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.stop_previous(Some(shutdown_tx));

        info!("[SocketIoTransport] Starting connection loop for {}", url);
        let connection = Connection {
            url,
            reconnect_delay: self.reconnect_delay,
            reconnect_delay_max: self.reconnect_delay_max,
            events: events_tx,
            outbound: self.outbound.clone(),
            shutdown: shutdown_rx,
        };
        tokio::spawn(connection.run());

        Ok(events_rx)
    }

    async fn emit(&self, event: &str, payload: Value) -> Result<(), ChannelError> {
        let frame = engine_io::encode_event(event, &payload)?;
        let sender = self
            .outbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(ChannelError::Closed)?;
        sender.send(frame).map_err(|_| ChannelError::Closed)
    }

    async fn close(&self) {
        self.stop_previous(None);
        set_outbound(&self.outbound, None);
        debug!("[SocketIoTransport] Closed");
    }
}

fn set_outbound(slot: &OutboundSlot, sender: Option<mpsc::UnboundedSender<String>>) {
    *slot.lock().unwrap_or_else(|e| e.into_inner()) = sender;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    Lost,
    Shutdown,
}

/// 单个连接循环的状态
struct Connection {
    url: Url,
    reconnect_delay: Duration,
    reconnect_delay_max: Duration,
    events: mpsc::Sender<TransportEvent>,
    outbound: OutboundSlot,
    shutdown: watch::Receiver<bool>,
}

impl Connection {
    async fn run(self) {
        let Connection {
            url,
            reconnect_delay,
            reconnect_delay_max,
            events,
            outbound,
            mut shutdown,
        } = self;
        let mut delay = reconnect_delay;
        let mut joined_before = false;

        loop {
            let attempt = tokio::select! {
                result = connect_async(url.as_str()) => result,
                _ = shutdown.changed() => break,
            };

            match attempt {
                Ok((ws, _)) => {
                    debug!("[SocketIoTransport] WebSocket opened");
                    let mut link = Link {
                        events: &events,
                        outbound: &outbound,
                        joined_before: &mut joined_before,
                        delay: &mut delay,
                        reconnect_delay,
                    };
                    if link.serve(ws, &mut shutdown).await == SessionEnd::Shutdown {
                        break;
                    }
                }
                Err(e) => warn!("[SocketIoTransport] Connect failed: {}", e),
            }

            if events.is_closed() {
                break;
            }
            debug!("[SocketIoTransport] Reconnecting in {:?}", delay);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
            delay = next_backoff(delay, reconnect_delay_max);
        }

        set_outbound(&outbound, None);
        info!("[SocketIoTransport] Connection loop stopped");
    }
}

/// 一次 WebSocket 连接的生命周期
struct Link<'a> {
    events: &'a mpsc::Sender<TransportEvent>,
    outbound: &'a OutboundSlot,
    joined_before: &'a mut bool,
    delay: &'a mut Duration,
    reconnect_delay: Duration,
}

impl Link<'_> {
    async fn serve(&mut self, ws: WsStream, shutdown: &mut watch::Receiver<bool>) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let mut joined = false;
        let mut heartbeat = Duration::from_millis(
            engine_io::DEFAULT_PING_INTERVAL_MS + engine_io::DEFAULT_PING_TIMEOUT_MS,
        );
        let mut deadline = Instant::now() + heartbeat;

        let end = loop {
            tokio::select! {
                frame = stream.next() => {
                    if let Some(Ok(_)) = &frame {
                        deadline = Instant::now() + heartbeat;
                    }
                    let text = match frame {
                        Some(Ok(WsMessage::Text(text))) => text,
                        Some(Ok(WsMessage::Close(_))) | None => break SessionEnd::Lost,
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            warn!("[SocketIoTransport] Read failed: {}", e);
                            break SessionEnd::Lost;
                        }
                    };
                    match engine_io::decode(&text) {
                        Ok(EnginePacket::Open(params)) => {
                            heartbeat = engine_io::heartbeat_timeout(&params);
                            deadline = Instant::now() + heartbeat;
                            debug!("[SocketIoTransport] Heartbeat timeout {:?}", heartbeat);
                            if sink.send(WsMessage::Text(engine_io::encode_connect())).await.is_err() {
                                break SessionEnd::Lost;
                            }
                        }
                        Ok(EnginePacket::Ping(data)) => {
                            if sink.send(WsMessage::Text(engine_io::encode_pong(&data))).await.is_err() {
                                break SessionEnd::Lost;
                            }
                        }
                        Ok(EnginePacket::Close) => break SessionEnd::Lost,
                        Ok(EnginePacket::Message(SocketPacket::Connect(_))) => {
                            joined = true;
                            *self.delay = self.reconnect_delay;
                            set_outbound(self.outbound, Some(out_tx.clone()));
                            let event = if *self.joined_before {
                                TransportEvent::Reconnected
                            } else {
                                TransportEvent::Connected
                            };
                            *self.joined_before = true;
                            info!("[SocketIoTransport] {:?}", event);
                            if self.events.send(event).await.is_err() {
                                break SessionEnd::Shutdown;
                            }
                        }
                        Ok(EnginePacket::Message(SocketPacket::Event { name, payload })) => {
                            if self.events.send(TransportEvent::Event { name, payload }).await.is_err() {
                                break SessionEnd::Shutdown;
                            }
                        }
                        Ok(EnginePacket::Message(SocketPacket::Disconnect)) => {
                            info!("[SocketIoTransport] Server closed namespace");
                            break SessionEnd::Lost;
                        }
                        Ok(EnginePacket::Message(SocketPacket::ConnectError(reason))) => {
                            warn!("[SocketIoTransport] Connection refused: {}", reason);
                            break SessionEnd::Lost;
                        }
                        Ok(_) => {}
                        Err(e) => debug!("[SocketIoTransport] Ignoring frame: {}", e),
                    }
                }
                Some(frame) = out_rx.recv() => {
                    if sink.send(WsMessage::Text(frame)).await.is_err() {
                        break SessionEnd::Lost;
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    warn!("[SocketIoTransport] No frame within {:?}, dropping connection", heartbeat);
                    break SessionEnd::Lost;
                }
                _ = shutdown.changed() => {
                    let _ = sink.send(WsMessage::Text(engine_io::encode_disconnect())).await;
                    let _ = sink.close().await;
                    break SessionEnd::Shutdown;
                }
            }
        };

        set_outbound(self.outbound, None);
        if joined && end == SessionEnd::Lost {
            let _ = self.events.send(TransportEvent::Disconnected).await;
        }
        end
    }
}
