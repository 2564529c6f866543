//! conveyor-core
//!
//! Core building blocks for Conveyor: an ordered, identifier-indexed task
//! queue for in-memory job bookkeeping.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId）
//! - **queue**: キュー本体（順序構造 + ID インデックスを同時更新する）
//!
//! The queue is single-threaded and synchronous by design: every operation
//! runs to completion without blocking or yielding. Embed it behind a mutex
//! or a single owning task if a threaded host needs shared access.

pub mod domain;
pub mod queue;

pub use domain::TaskId;
pub use queue::{IntoIter, Iter, TaskQueue};
