//! Slab-backed doubly-linked list used for recency ordering
//!
//! Links are slot indices rather than pointers. The front holds the least
//! recently used element, the back the most recently used one. Vacated slots
//! are recycled through a free list so a long-lived store does not grow its
//! slab past the peak number of live entries.

/// Stable handle to a node in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotIdx(usize);

struct Node<T> {
    value: T,
    prev: Option<SlotIdx>,
    next: Option<SlotIdx>,
}

pub(crate) struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<SlotIdx>,
    tail: Option<SlotIdx>,
    len: usize,
}

impl<T> RecencyList<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Append at the most-recently-used end
    pub(crate) fn push_back(&mut self, value: T) -> SlotIdx {
        let node = Node {
            value,
            prev: self.tail,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                SlotIdx(slot)
            }
            None => {
                self.slots.push(Some(node));
                SlotIdx(self.slots.len() - 1)
            }
        };

        match self.tail {
            Some(old_tail) => {
                if let Some(n) = self.node_mut(old_tail) {
                    n.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        self.len += 1;
        idx
    }

    /// Remove and return the least-recently-used value
    pub(crate) fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        self.remove(head)
    }

    /// Unlink a node and return its value; `None` for a vacant slot
    pub(crate) fn remove(&mut self, idx: SlotIdx) -> Option<T> {
        let node = self.slots.get_mut(idx.0)?.take()?;
        self.link_neighbours(node.prev, node.next);
        self.free.push(idx.0);
        self.len -= 1;
        Some(node.value)
    }

    /// Move an existing node to the most-recently-used end
    pub(crate) fn move_to_back(&mut self, idx: SlotIdx) {
        if self.tail == Some(idx) {
            return;
        }
        let (prev, next) = match self.node_mut(idx) {
            Some(n) => (n.prev, n.next),
            None => return,
        };

        self.link_neighbours(prev, next);

        let old_tail = self.tail;
        if let Some(t) = old_tail.and_then(|t| self.node_mut(t)) {
            t.next = Some(idx);
        }
        if let Some(n) = self.node_mut(idx) {
            n.prev = old_tail;
            n.next = None;
        }
        if self.head.is_none() {
            self.head = Some(idx);
        }
        self.tail = Some(idx);
    }

    pub(crate) fn get(&self, idx: SlotIdx) -> Option<&T> {
        self.slots.get(idx.0)?.as_ref().map(|n| &n.value)
    }

    pub(crate) fn get_mut(&mut self, idx: SlotIdx) -> Option<&mut T> {
        self.node_mut(idx).map(|n| &mut n.value)
    }

    /// Iterate from least to most recently used
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.slots.get(cursor?.0)?.as_ref()?;
            cursor = node.next;
            Some(&node.value)
        })
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // Joins `prev` and `next` around a node that is being unlinked.
    fn link_neighbours(&mut self, prev: Option<SlotIdx>, next: Option<SlotIdx>) {
        match prev.and_then(|p| self.node_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }

    fn node_mut(&mut self, idx: SlotIdx) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx.0)?.as_mut()
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}
