//! The queue itself: ordering structure + id index, updated in lockstep.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use super::node::{Node, NodeId};

/// A FIFO queue of tasks that is also indexed by task id.
///
/// Two substructures cooperate and are updated together on every mutation:
/// - the **ordering structure**: a doubly linked chain through the node
///   arena, oldest at `head`, newest at `tail`;
/// - the **index structure**: a map from id to the node's arena slot.
///
/// This gives queue semantics (`enqueue`/`dequeue`/`peek`) and random access
/// by id (`get`/`update`/`remove`) in O(1) at the same time.
///
/// Design:
/// - The arena is the single source of truth for nodes; the index and the
///   chain hold slot addresses only.
/// - Node links are arena indices, so the queue is the sole owner of every
///   node and nothing borrows across mutations.
/// - Freed slots are recycled through a free list; sustained churn does not
///   grow the arena.
///
/// Re-enqueueing an id that is already present is a *reposition*: the old
/// entry is removed entirely and the new payload is appended at the tail, as
/// if it had just arrived. Use [`update`](TaskQueue::update) to replace a
/// payload without touching its position.
pub struct TaskQueue<K, T> {
    /// Node arena. `None` slots are free and listed in `free`.
    slots: Vec<Option<Node<K, T>>>,

    /// Recyclable slot addresses.
    free: Vec<NodeId>,

    /// id -> slot of the live node carrying it.
    index: HashMap<K, NodeId>,

    /// Oldest node, or `None` when empty.
    head: Option<NodeId>,

    /// Newest node, or `None` when empty.
    tail: Option<NodeId>,
}

impl<K, T> TaskQueue<K, T>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Create a queue seeded from an id -> payload mapping.
    ///
    /// Entries are enqueued in the order the iterator yields them, and that
    /// order becomes the initial queue order. No guarantee is imposed beyond
    /// "whatever the supplied mapping yields" - pass an order-preserving map
    /// (or any ordered iterator) if the initial order matters. Duplicate ids
    /// follow `enqueue`'s reposition semantics: the later entry wins.
    pub fn with_tasks<I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
    {
        let mut queue = Self::new();
        queue.extend(tasks);
        queue
    }

    /// Append `data` as the newest entry under `id`. O(1).
    ///
    /// If `id` is already queued, its node is first removed outright and a
    /// fresh one is appended at the tail: the entry is treated as newly
    /// arrived. This is deliberately a reposition, not an in-place update.
    pub fn enqueue(&mut self, id: K, data: T) {
        if let Some(&occupied) = self.index.get(&id) {
            self.unlink(occupied);
            self.release(occupied);
        }
        let node = Node {
            id: id.clone(),
            data,
            prev: self.tail,
            next: None,
        };
        let slot = self.alloc(node);
        match self.tail {
            Some(tail) => self.node_mut(tail).next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.index.insert(id, slot);
    }

    /// Remove and return the oldest payload, or `None` if empty. O(1).
    pub fn dequeue(&mut self) -> Option<T> {
        self.dequeue_entry().map(|(_, data)| data)
    }

    /// Remove and return the oldest entry together with its id. O(1).
    pub fn dequeue_entry(&mut self) -> Option<(K, T)> {
        let head = self.head?;
        self.unlink(head);
        let node = self.release(head);
        self.index.remove(&node.id);
        Some((node.id, node.data))
    }

    /// Delete the entry for `id` wherever it sits. O(1).
    ///
    /// Returns `false` and leaves the queue untouched if `id` is not present.
    pub fn remove(&mut self, id: &K) -> bool {
        let Some(slot) = self.index.remove(id) else {
            return false;
        };
        self.unlink(slot);
        self.release(slot);
        true
    }

    /// Look up the payload for `id`. O(1), no mutation.
    pub fn get(&self, id: &K) -> Option<&T> {
        self.index.get(id).map(|&slot| &self.node(slot).data)
    }

    /// Mutable access to the payload for `id`. Position is unaffected.
    pub fn get_mut(&mut self, id: &K) -> Option<&mut T> {
        match self.index.get(id) {
            Some(&slot) => Some(&mut self.node_mut(slot).data),
            None => None,
        }
    }

    /// Replace the payload for `id`, keeping its position and links. O(1).
    ///
    /// Returns `false` if `id` is absent; unlike `enqueue`, nothing is
    /// inserted in that case.
    pub fn update(&mut self, id: &K, data: T) -> bool {
        match self.get_mut(id) {
            Some(slot_data) => {
                *slot_data = data;
                true
            }
            None => false,
        }
    }

    /// Is `id` currently queued? O(1).
    pub fn contains(&self, id: &K) -> bool {
        self.index.contains_key(id)
    }

    /// The oldest payload without removing it, or `None` if empty. O(1).
    pub fn peek(&self) -> Option<&T> {
        self.head.map(|slot| &self.node(slot).data)
    }

    /// Drop every entry and return to the freshly constructed state.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }

    /// Number of live entries. Always equals the index entry count.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Materialize the payloads in head-to-tail order. O(n).
    ///
    /// The returned `Vec` is a snapshot: mutating the queue afterwards does
    /// not change it.
    pub fn tasks(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().map(|(_, data)| data.clone()).collect()
    }

    /// Iterate `(&id, &payload)` in head-to-tail order.
    pub fn iter(&self) -> Iter<'_, K, T> {
        Iter {
            queue: self,
            cursor: self.head,
        }
    }

    // --- arena plumbing -------------------------------------------------

    fn alloc(&mut self, node: Node<K, T>) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot.0] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Take a node out of its slot and recycle the slot.
    fn release(&mut self, slot: NodeId) -> Node<K, T> {
        let node = self.slots[slot.0]
            .take()
            .expect("released slot must be occupied");
        self.free.push(slot);
        node
    }

    /// Splice a node out of the chain, fixing head/tail as needed.
    /// The node's slot and index entry are left to the caller.
    fn unlink(&mut self, slot: NodeId) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }
}

impl<K, T> TaskQueue<K, T> {
    fn node(&self, slot: NodeId) -> &Node<K, T> {
        self.slots[slot.0]
            .as_ref()
            .expect("links only point at occupied slots")
    }

    fn node_mut(&mut self, slot: NodeId) -> &mut Node<K, T> {
        self.slots[slot.0]
            .as_mut()
            .expect("links only point at occupied slots")
    }
}

impl<K: Eq + Hash + Clone, T> Default for TaskQueue<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, T> Extend<(K, T)> for TaskQueue<K, T> {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, tasks: I) {
        for (id, data) in tasks {
            self.enqueue(id, data);
        }
    }
}

impl<K: Eq + Hash + Clone, T> FromIterator<(K, T)> for TaskQueue<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(tasks: I) -> Self {
        Self::with_tasks(tasks)
    }
}

impl<K: Eq + Hash + Clone, T: Clone> Clone for TaskQueue<K, T> {
    fn clone(&self) -> Self {
        self.iter()
            .map(|(id, data)| (id.clone(), data.clone()))
            .collect()
    }
}

impl<K, T> fmt::Debug for TaskQueue<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Borrowing iterator over `(&id, &payload)`, oldest first.
pub struct Iter<'a, K, T> {
    queue: &'a TaskQueue<K, T>,
    cursor: Option<NodeId>,
}

impl<'a, K, T> Iterator for Iter<'a, K, T> {
    type Item = (&'a K, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.queue.node(slot);
        self.cursor = node.next;
        Some((&node.id, &node.data))
    }
}

/// Draining iterator: consumes the queue, yielding entries oldest first.
pub struct IntoIter<K, T> {
    queue: TaskQueue<K, T>,
}

impl<K: Eq + Hash + Clone, T> Iterator for IntoIter<K, T> {
    type Item = (K, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.dequeue_entry()
    }
}

impl<K: Eq + Hash + Clone, T> IntoIterator for TaskQueue<K, T> {
    type Item = (K, T);
    type IntoIter = IntoIter<K, T>;

    fn into_iter(self) -> IntoIter<K, T> {
        IntoIter { queue: self }
    }
}

impl<'a, K: Eq + Hash + Clone, T> IntoIterator for &'a TaskQueue<K, T> {
    type Item = (&'a K, &'a T);
    type IntoIter = Iter<'a, K, T>;

    fn into_iter(self) -> Iter<'a, K, T> {
        self.iter()
    }
}

#[cfg(test)]
impl<K, T> TaskQueue<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Walk the chain and reconcile it with the index and the arena.
    fn assert_invariants(&self) {
        let mut seen = 0usize;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = self.node(slot);
            assert_eq!(node.prev, prev, "prev link must mirror the forward walk");
            assert_eq!(
                self.index.get(&node.id),
                Some(&slot),
                "index must point at the live node for {:?}",
                node.id
            );
            seen += 1;
            prev = Some(slot);
            cursor = node.next;
        }
        assert_eq!(prev, self.tail, "forward walk must end at the tail");
        assert_eq!(
            seen,
            self.index.len(),
            "chain and index must agree on membership"
        );
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, seen, "every occupied slot must be on the chain");
        assert_eq!(
            self.free.len() + occupied,
            self.slots.len(),
            "free list must account for every vacant slot"
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    use super::*;

    fn queue_abc() -> TaskQueue<&'static str, u32> {
        let mut queue = TaskQueue::new();
        queue.enqueue("a", 1);
        queue.enqueue("b", 2);
        queue.enqueue("c", 3);
        queue
    }

    #[test]
    fn enqueue_preserves_arrival_order() {
        let mut queue = queue_abc();
        assert_eq!(queue.tasks(), vec![1, 2, 3]);
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.tasks(), vec![2, 3]);
        queue.assert_invariants();
    }

    #[test]
    fn dequeue_drains_in_fifo_order() {
        let mut queue = TaskQueue::new();
        for n in 0..10u32 {
            queue.enqueue(format!("task-{n}"), n);
        }
        let drained: Vec<_> = std::iter::from_fn(|| queue.dequeue()).collect();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(queue.is_empty());
    }

    #[test]
    fn reenqueue_repositions_to_tail() {
        let mut queue = queue_abc();
        queue.enqueue("a", 10);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.get(&"a"), Some(&10));
        assert_eq!(queue.tasks(), vec![2, 3, 10]);
        queue.assert_invariants();
    }

    #[test]
    fn reenqueue_same_id_keeps_a_single_entry() {
        let mut queue = TaskQueue::new();
        queue.enqueue("a", 1);
        queue.enqueue("a", 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.get(&"a"), Some(&2));
        assert_eq!(queue.tasks(), vec![2]);
    }

    #[rstest]
    #[case::head("a", vec![2, 3])]
    #[case::middle("b", vec![1, 3])]
    #[case::tail("c", vec![1, 2])]
    fn remove_splices_at_any_position(#[case] id: &'static str, #[case] remaining: Vec<u32>) {
        let mut queue = queue_abc();
        assert!(queue.remove(&id));
        assert_eq!(queue.tasks(), remaining);
        assert_eq!(queue.len(), 2);
        queue.assert_invariants();
    }

    #[test]
    fn remove_absent_id_is_a_noop() {
        let mut queue = queue_abc();
        assert!(queue.remove(&"b"));
        assert!(!queue.remove(&"b"));
        assert_eq!(queue.tasks(), vec![1, 3]);
    }

    #[test]
    fn remove_head_matches_dequeue_effect() {
        let mut by_remove = queue_abc();
        let mut by_dequeue = queue_abc();
        assert!(by_remove.remove(&"a"));
        assert_eq!(by_dequeue.dequeue(), Some(1));
        assert_eq!(by_remove.tasks(), by_dequeue.tasks());
        assert_eq!(by_remove.len(), by_dequeue.len());
    }

    #[test]
    fn removing_the_only_entry_clears_both_ends() {
        let mut queue = TaskQueue::new();
        queue.enqueue("only", 7);
        assert!(queue.remove(&"only"));
        assert!(queue.is_empty());
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.dequeue(), None);
        queue.assert_invariants();

        // still usable afterwards
        queue.enqueue("again", 8);
        assert_eq!(queue.tasks(), vec![8]);
    }

    #[test]
    fn update_replaces_payload_in_place() {
        let mut queue = queue_abc();
        assert!(queue.update(&"b", 20));
        assert_eq!(queue.tasks(), vec![1, 20, 3]);
        assert_eq!(queue.get(&"b"), Some(&20));
        queue.assert_invariants();
    }

    #[test]
    fn update_on_absent_id_inserts_nothing() {
        let mut queue: TaskQueue<&str, u32> = TaskQueue::new();
        assert!(!queue.update(&"x", 9));
        assert_eq!(queue.len(), 0);
        assert!(!queue.contains(&"x"));
    }

    #[test]
    fn get_mut_mutates_without_moving() {
        let mut queue = queue_abc();
        *queue.get_mut(&"c").unwrap() += 100;
        assert_eq!(queue.tasks(), vec![1, 2, 103]);
    }

    #[test]
    fn peek_leaves_the_queue_alone() {
        let queue = queue_abc();
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.peek(), Some(&1));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn clear_returns_to_the_empty_state() {
        let mut queue = queue_abc();
        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.dequeue(), None);
        assert!(!queue.contains(&"a"));
        queue.assert_invariants();
    }

    #[test]
    fn draining_reaches_the_same_empty_state_as_clear() {
        let mut queue = queue_abc();
        while queue.dequeue().is_some() {}
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek(), None);
        assert!(!queue.contains(&"a"));
        assert!(!queue.contains(&"c"));
        queue.assert_invariants();
    }

    #[test]
    fn snapshot_is_independent_of_later_mutation() {
        let mut queue = queue_abc();
        let snapshot = queue.tasks();
        queue.remove(&"b");
        queue.enqueue("d", 4);
        assert_eq!(snapshot, vec![1, 2, 3]);
        assert_eq!(queue.tasks(), vec![1, 3, 4]);
    }

    #[test]
    fn with_tasks_keeps_the_supplied_order() {
        let queue = TaskQueue::with_tasks([("a", 1), ("b", 2)]);
        assert_eq!(queue.tasks(), vec![1, 2]);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn with_tasks_applies_reposition_to_duplicates() {
        let queue = TaskQueue::with_tasks([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(queue.tasks(), vec![2, 3]);
        assert_eq!(queue.get(&"a"), Some(&3));
    }

    #[test]
    fn iter_yields_ids_with_payloads_in_order() {
        let queue = queue_abc();
        let entries: Vec<_> = queue.iter().map(|(id, data)| (*id, *data)).collect();
        assert_eq!(entries, vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn into_iter_drains_oldest_first() {
        let entries: Vec<_> = queue_abc().into_iter().collect();
        assert_eq!(entries, vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn cloned_queue_is_equal_but_detached() {
        let mut queue = queue_abc();
        let copy = queue.clone();
        queue.dequeue();
        assert_eq!(copy.tasks(), vec![1, 2, 3]);
        assert_eq!(queue.tasks(), vec![2, 3]);
    }

    #[test]
    fn churn_reuses_freed_slots() {
        let mut queue = TaskQueue::new();
        for n in 0..1000u32 {
            queue.enqueue(format!("task-{}", n % 4), n);
            if n % 2 == 1 {
                queue.dequeue();
            }
        }
        // At most 4 distinct ids are ever live, so the arena stays at the
        // peak occupancy instead of growing with the churn.
        assert!(queue.slots.len() <= 4);
        queue.assert_invariants();
    }

    #[test]
    fn random_ops_agree_with_a_vec_model() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let mut queue = TaskQueue::new();
        let mut model: Vec<(String, u32)> = Vec::new();

        for step in 0..2000u32 {
            match rng.gen_range(0..6) {
                0 | 1 => {
                    let id = format!("task-{}", rng.gen_range(0..32));
                    model.retain(|(k, _)| *k != id);
                    model.push((id.clone(), step));
                    queue.enqueue(id, step);
                }
                2 => {
                    let expected = if model.is_empty() {
                        None
                    } else {
                        Some(model.remove(0).1)
                    };
                    assert_eq!(queue.dequeue(), expected);
                }
                3 => {
                    let id = format!("task-{}", rng.gen_range(0..32));
                    let position = model.iter().position(|(k, _)| *k == id);
                    assert_eq!(queue.remove(&id), position.is_some());
                    if let Some(position) = position {
                        model.remove(position);
                    }
                }
                4 => {
                    let id = format!("task-{}", rng.gen_range(0..32));
                    let entry = model.iter_mut().find(|(k, _)| *k == id);
                    let updated = queue.update(&id, 9000 + step);
                    assert_eq!(updated, entry.is_some());
                    if let Some((_, data)) = entry {
                        *data = 9000 + step;
                    }
                }
                _ => {
                    assert_eq!(queue.len(), model.len());
                    assert_eq!(queue.peek(), model.first().map(|(_, data)| data));
                }
            }
            queue.assert_invariants();
        }

        let expected: Vec<u32> = model.iter().map(|(_, data)| *data).collect();
        assert_eq!(queue.tasks(), expected);
    }
}
