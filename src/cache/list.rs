//! Eviction List Module
//!
//! Doubly linked recency list stored in an arena. Nodes are addressed by
//! stable `NodeId`s and link to each other by slot index, so splicing is
//! O(1) without shared ownership between neighbours.

// == Sentinels ==
const HEAD: usize = 0;
const TAIL: usize = 1;

/// Stable handle to a node in an [`EvictionList`].
///
/// A handle stays valid until its node is unlinked or removed; the slot may
/// be reused afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: usize,
    next: usize,
}

// == Eviction List ==
/// Recency ordered list: front = most recently used, tail = least recently used.
///
/// The list has no internal synchronization; callers serialize access.
#[derive(Debug)]
pub struct EvictionList<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> EvictionList<T> {
    // == Constructor ==
    /// Creates an empty list holding only the head and tail sentinels.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity + 2);
        slots.push(Slot {
            value: None,
            prev: HEAD,
            next: TAIL,
        });
        slots.push(Slot {
            value: None,
            prev: HEAD,
            next: TAIL,
        });
        Self {
            slots,
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts `value` as the most recently used node.
    pub fn push_front(&mut self, value: T) -> NodeId {
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx].value = Some(value);
                idx
            }
            None => {
                self.slots.push(Slot {
                    value: Some(value),
                    prev: HEAD,
                    next: TAIL,
                });
                self.slots.len() - 1
            }
        };
        self.attach_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Front ==
    /// Marks a node as most recently used. Unknown handles are ignored.
    pub fn move_to_front(&mut self, id: NodeId) {
        if !self.is_live(id) || self.slots[HEAD].next == id.0 {
            return;
        }
        self.detach(id.0);
        self.attach_front(id.0);
    }

    // == Unlink ==
    /// Removes a node from the list and returns its value.
    pub fn unlink(&mut self, id: NodeId) -> Option<T> {
        if !self.is_live(id) {
            return None;
        }
        self.detach(id.0);
        self.release(id.0)
    }

    // == Remove Tail ==
    /// Removes the least recently used node. Empty list yields `None`.
    pub fn remove_tail(&mut self) -> Option<T> {
        let last = self.slots[TAIL].prev;
        if last == HEAD {
            return None;
        }
        self.unlink(NodeId(last))
    }

    // == Accessors ==
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.0).and_then(|slot| slot.value.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        if id.0 == HEAD || id.0 == TAIL {
            return None;
        }
        self.slots.get_mut(id.0).and_then(|slot| slot.value.as_mut())
    }

    /// Number of linked nodes (sentinels excluded).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates from the most recently used node to the least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.slots[HEAD].next,
            back: self.slots[TAIL].prev,
            remaining: self.len,
        }
    }

    // == Internal Links ==
    fn is_live(&self, id: NodeId) -> bool {
        id.0 != HEAD
            && id.0 != TAIL
            && self.slots.get(id.0).is_some_and(|slot| slot.value.is_some())
    }

    fn detach(&mut self, idx: usize) {
        let Slot { prev, next, .. } = self.slots[idx];
        self.slots[prev].next = next;
        self.slots[next].prev = prev;
    }

    fn attach_front(&mut self, idx: usize) {
        let first = self.slots[HEAD].next;
        self.slots[idx].prev = HEAD;
        self.slots[idx].next = first;
        self.slots[first].prev = idx;
        self.slots[HEAD].next = idx;
    }

    fn release(&mut self, idx: usize) -> Option<T> {
        let value = self.slots[idx].value.take();
        self.slots[idx].prev = HEAD;
        self.slots[idx].next = TAIL;
        self.free.push(idx);
        self.len -= 1;
        value
    }
}

impl<T> Default for EvictionList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Front-to-back iterator; `rev()` walks from the tail.
pub struct Iter<'a, T> {
    list: &'a EvictionList<T>,
    cursor: usize,
    back: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.list.slots[self.cursor];
        self.cursor = slot.next;
        self.remaining -= 1;
        slot.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let slot = &self.list.slots[self.back];
        self.back = slot.prev;
        self.remaining -= 1;
        slot.value.as_ref()
    }
}
