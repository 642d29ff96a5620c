//! Insertion-ordered task queue stored in a generational arena.
//!
//! Nodes form a singly linked list threaded through arena slots. A node
//! stays in its slot until [`TaskQueue::compact`] unlinks it, so a flush that
//! walks the list by index never observes a slot being reused underneath it.

use crate::callback::Callback;
use crate::Timestamp;

/// Stable, generation-tagged address of a queue node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId {
    index: u32,
    generation: u32,
}

impl TimerId {
    pub(crate) fn index(self) -> usize {
        self.index as usize
    }
}

/// Queue node. `callback == None` marks a stopped node awaiting compaction.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) callback: Option<Callback>,
    pub(crate) activation: Timestamp,
    pub(crate) next: Option<u32>,
    generation: u32,
}

#[derive(Debug)]
enum Slot {
    Occupied(Node),
    Vacant { next_free: Option<u32>, generation: u32 },
}

#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

/// Outcome of a compaction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Compaction {
    /// Earliest activation among live nodes, `+inf` when none remain.
    pub(crate) next_activation: Timestamp,
    pub(crate) reaped: usize,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Number of linked nodes, stopped ones included.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn head(&self) -> Option<u32> {
        self.head
    }

    /// Appends a new node at the tail and returns its id.
    ///
    /// # Panics
    ///
    /// Panics once `u32::MAX` slots are in use; ids are 32-bit.
    pub(crate) fn push_back(&mut self, callback: Callback, activation: Timestamp) -> TimerId {
        let (index, generation) = match self.free_head {
            Some(index) => {
                let generation = match self.slots[index as usize] {
                    Slot::Vacant { next_free, generation } => {
                        self.free_head = next_free;
                        generation
                    }
                    Slot::Occupied(_) => unreachable!("free list must point to a vacant slot"),
                };
                (index, generation)
            }
            None => {
                let index = u32::try_from(self.slots.len()).expect("timer queue exceeds u32::MAX nodes");
                self.slots.push(Slot::Vacant {
                    next_free: None,
                    generation: 0,
                });
                (index, 0)
            }
        };

        self.slots[index as usize] = Slot::Occupied(Node {
            callback: Some(callback),
            activation,
            next: None,
            generation,
        });

        match self.tail {
            Some(tail) => {
                if let Slot::Occupied(node) = &mut self.slots[tail as usize] {
                    node.next = Some(index);
                }
            }
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        TimerId { index, generation }
    }

    /// Node addressed by `id`, or `None` if it has been reaped.
    pub(crate) fn get(&self, id: TimerId) -> Option<&Node> {
        self.at(id.index).filter(|node| node.generation == id.generation)
    }

    pub(crate) fn get_mut(&mut self, id: TimerId) -> Option<&mut Node> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) if node.generation == id.generation => Some(node),
            _ => None,
        }
    }

    /// Raw positional access used while walking the list.
    pub(crate) fn at(&self, index: u32) -> Option<&Node> {
        match self.slots.get(index as usize) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    /// Unlinks stopped nodes, releases their slots and finds the next deadline.
    pub(crate) fn compact(&mut self) -> Compaction {
        let mut prev: Option<u32> = None;
        let mut cursor = self.head;
        let mut next_activation = f64::INFINITY;
        let mut reaped = 0;

        while let Some(index) = cursor {
            let (live, activation, next) = match &self.slots[index as usize] {
                Slot::Occupied(node) => (node.callback.is_some(), node.activation, node.next),
                Slot::Vacant { .. } => unreachable!("linked index must be occupied"),
            };

            if live {
                if activation < next_activation {
                    next_activation = activation;
                }
                prev = Some(index);
            } else {
                match prev {
                    Some(p) => {
                        if let Slot::Occupied(node) = &mut self.slots[p as usize] {
                            node.next = next;
                        }
                    }
                    None => self.head = next,
                }
                self.release(index);
                reaped += 1;
            }
            cursor = next;
        }

        self.tail = prev;
        Compaction {
            next_activation,
            reaped,
        }
    }

    fn release(&mut self, index: u32) {
        let generation = match &self.slots[index as usize] {
            Slot::Occupied(node) => node.generation,
            Slot::Vacant { .. } => return,
        };
        self.slots[index as usize] = Slot::Vacant {
            next_free: self.free_head,
            generation: generation.wrapping_add(1),
        };
        self.free_head = Some(index);
        self.len -= 1;
    }

    /// Ids of linked nodes in queue order.
    #[cfg(test)]
    pub(crate) fn ids(&self) -> Vec<TimerId> {
        let mut ids = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let Some(node) = self.at(index) else { break };
            ids.push(TimerId {
                index,
                generation: node.generation,
            });
            cursor = node.next;
        }
        ids
    }
}
