//! Transient user notices.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a notice stays visible unless configured otherwise.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

/// Severity of a notice, mirroring the alert styles the storefront renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Danger => "danger",
        }
    }
}

impl std::fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct NoticeBoard {
    entries: Vec<(Instant, Notice)>,
    next_id: u64,
}

impl NoticeBoard {
    fn prune(&mut self, now: Instant, ttl: Duration) {
        self.entries
            .retain(|(posted, _)| now.saturating_duration_since(*posted) < ttl);
    }
}

/// Additive board of notices that dismiss themselves after a fixed TTL.
///
/// Posting a notice never hides one that is still visible. Clones share
/// the same board.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    board: Arc<Mutex<NoticeBoard>>,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_NOTICE_TTL)
    }
}

impl NotificationCenter {
    /// Creates a board with the default five second TTL.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board whose notices stay visible for `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            board: Arc::new(Mutex::new(NoticeBoard::default())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn success(&self, message: impl Into<String>) -> Notice {
        self.push(NoticeLevel::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Notice {
        self.push(NoticeLevel::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Notice {
        self.push(NoticeLevel::Warning, message)
    }

    pub fn danger(&self, message: impl Into<String>) -> Notice {
        self.push(NoticeLevel::Danger, message)
    }

    /// Posts a notice and returns it.
    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> Notice {
        self.push_at(level, message, Instant::now())
    }

    fn push_at(&self, level: NoticeLevel, message: impl Into<String>, now: Instant) -> Notice {
        let mut board = self.lock();
        board.prune(now, self.ttl);
        board.next_id += 1;
        let notice = Notice {
            id: board.next_id,
            level,
            message: message.into(),
            created_at: Utc::now(),
        };
        tracing::debug!(id = notice.id, level = %level, message = %notice.message, "notice posted");
        board.entries.push((now, notice.clone()));
        notice
    }

    /// Returns the notices still visible now, oldest first.
    pub fn visible(&self) -> Vec<Notice> {
        self.visible_at(Instant::now())
    }

    /// Returns the notices visible at `now`, dropping any that expired.
    pub fn visible_at(&self, now: Instant) -> Vec<Notice> {
        let mut board = self.lock();
        board.prune(now, self.ttl);
        board.entries.iter().map(|(_, n)| n.clone()).collect()
    }

    /// Dismisses a notice early. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut board = self.lock();
        let before = board.entries.len();
        board.entries.retain(|(_, n)| n.id != id);
        board.entries.len() != before
    }

    fn lock(&self) -> MutexGuard<'_, NoticeBoard> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
