//! Node storage for the queue's ordering structure.

/// Slot address of a node in the queue's arena.
///
/// Links between nodes are arena indices rather than references, so the
/// queue stays the sole owner of every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeId(pub(crate) usize);

/// One queued entry: id + payload + neighbor links.
///
/// `prev`/`next` are navigational only; `None` marks the ends of the
/// sequence (the head has no prev, the tail has no next).
#[derive(Debug)]
pub(crate) struct Node<K, T> {
    pub(crate) id: K,
    pub(crate) data: T,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}
