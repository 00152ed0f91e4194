use std::sync::atomic::{AtomicU64, Ordering};

use super::super::value_objects::SessionId;

/// 会话
///
/// 页面（进程）生命周期内唯一，标识不可变；消息计数只在客户端本地递增
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    message_count: AtomicU64,
}

impl Session {
    /// 生成新会话
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            message_count: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Acquire)
    }

    /// 计数加一，返回新值
    pub fn increment_message_count(&self) -> u64 {
        self.message_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn set_message_count(&self, count: u64) {
        self.message_count.store(count, Ordering::Release);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
