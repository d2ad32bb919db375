use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::lock;

/// Visual weight of a notice or inline status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Danger,
}

/// One transient notice in the stacking alert area.
#[derive(Debug, Clone)]
pub struct Notice {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

/// Fixed inline message slots, one per form or panel that reports its own
/// outcome in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusRegion {
    UploadForm,
    SpecPanel,
}

#[derive(Debug, Clone)]
pub struct InlineStatus {
    pub message: String,
    pub severity: Severity,
}

/// Oldest notices are dropped once the stack reaches this size.
pub const MAX_VISIBLE_NOTICES: usize = 8;

struct NotifyInner {
    notices: Mutex<Vec<Notice>>,
    inline: Mutex<HashMap<StatusRegion, InlineStatus>>,
    next_id: AtomicU64,
    ttl: Duration,
}

/// Transient notification model: stacking notices that expire on their own
/// timers, plus replace-only inline status regions.
///
/// Posting never fails and never blocks. Each notice gets an independent
/// expiry timer, so a later notice never extends an earlier one's lifetime.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<NotifyInner>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(NotifyInner {
                notices: Mutex::new(Vec::new()),
                inline: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                ttl,
            }),
        }
    }

    /// Post a notice. Outside a tokio runtime the notice is recorded but
    /// never expires; callers in that position are tests or teardown paths.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let notice = Notice {
            id,
            message: message.into(),
            severity,
            created_at: Instant::now(),
        };
        {
            let mut notices = lock(&self.inner.notices);
            notices.push(notice);
            if notices.len() > MAX_VISIBLE_NOTICES {
                notices.remove(0);
            }
            t_counter!("mockboard_notices_posted_total").increment(1);
            t_gauge!("mockboard_notices_visible").set(notices.len() as f64);
        }
        if let Ok(handle) = Handle::try_current() {
            let inner = Arc::clone(&self.inner);
            let ttl = self.inner.ttl;
            handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                let mut notices = lock(&inner.notices);
                if let Some(pos) = notices.iter().position(|n| n.id == id) {
                    notices.remove(pos);
                    t_counter!("mockboard_notices_expired_total").increment(1);
                    t_gauge!("mockboard_notices_visible").set(notices.len() as f64);
                }
            });
        }
        id
    }

    /// Set the message shown in an inline region, replacing whatever was
    /// there. Inline status never expires on its own.
    pub fn set_inline_status(
        &self,
        region: StatusRegion,
        message: impl Into<String>,
        severity: Severity,
    ) {
        lock(&self.inner.inline).insert(
            region,
            InlineStatus {
                message: message.into(),
                severity,
            },
        );
    }

    pub fn clear_inline(&self, region: StatusRegion) {
        lock(&self.inner.inline).remove(&region);
    }

    pub fn visible(&self) -> Vec<Notice> {
        lock(&self.inner.notices).clone()
    }

    pub fn inline_status(&self, region: StatusRegion) -> Option<InlineStatus> {
        lock(&self.inner.inline).get(&region).cloned()
    }
}
