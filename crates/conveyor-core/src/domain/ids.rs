//! Domain identifiers.
//!
//! # TaskId の設計
//! タスク ID は呼び出し側が選ぶ文字列です（外部システムのキーをそのまま使えます）。
//! キューは ID の中身を一切解釈せず、一意性の維持はキュー側の責務です。
//! 新規に採番したい場合は ULID ベースの [`TaskId::generate`] を使います。
//! ULID は時刻でソート可能なので、採番順がそのまま辞書順になります。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Caller-chosen identifier of a queued task.
///
/// Any string is a valid id. Uniqueness within one queue is maintained by
/// the queue itself: re-enqueueing an id repositions the existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Mint a fresh ULID-backed id (`task-<ulid>`).
    pub fn generate() -> Self {
        Self(format!("task-{}", Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
