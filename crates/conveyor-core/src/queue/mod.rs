//! Queue module: node arena and the ordered, id-indexed queue.

mod node;
mod task_queue;

pub use task_queue::{IntoIter, Iter, TaskQueue};
