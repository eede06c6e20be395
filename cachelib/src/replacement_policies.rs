use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

/// Least recently used replacement
///
/// The recency order is a doubly linked list threaded through an arena of nodes, with a hash index
/// from offset to arena slot. Promotion only relinks a node, so the index stays valid, and
/// eviction always takes the tail and reuses its slot for the incoming offset, so the arena never
/// grows past the capacity and never needs a free list
pub struct LeastRecentlyUsed {
    capacity: usize,
    nodes: Vec<Node>,
    index: HashMap<u64, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

struct Node {
    offset: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

impl LeastRecentlyUsed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            nodes: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    /// Touches `offset`, returning true on a hit
    ///
    /// On a miss the offset is always admitted, evicting the least recently touched offset if the
    /// cache is full
    pub fn touch(&mut self, offset: u64) -> bool {
        if let Some(&slot) = self.index.get(&offset) {
            if self.head != Some(slot) {
                self.detach(slot);
                self.push_front(slot);
            }
            return true;
        }
        if self.capacity == 0 {
            return false;
        }
        let slot = if self.index.len() >= self.capacity {
            // Full, so there's always a tail to recycle
            let Some(victim) = self.tail else { return false };
            self.detach(victim);
            self.index.remove(&self.nodes[victim].offset);
            self.nodes[victim].offset = offset;
            victim
        } else {
            self.nodes.push(Node { offset, prev: None, next: None });
            self.nodes.len() - 1
        };
        self.push_front(slot);
        self.index.insert(offset, slot);
        false
    }

    pub fn contains(&self, offset: u64) -> bool {
        self.index.contains_key(&offset)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Resident offsets from most to least recently touched
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = &self.nodes[cursor?];
            cursor = node.next;
            Some(node.offset)
        })
    }

    fn detach(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }

    fn push_front(&mut self, slot: usize) {
        self.nodes[slot].prev = None;
        self.nodes[slot].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }
}

/// Frequent read replacement, an approximate least frequently used policy
///
/// Every offset has a live read count. Cached offsets additionally have a snapshot of that count,
/// taken when they were admitted and refreshed on every hit; the snapshot table is the authority
/// on what's cached. Eviction candidates come from a min-heap of `(frequency, offset)`, which is
/// only pushed to on admission, so hits leave it stale. Every `reconcile_interval` reads the heap
/// is rebuilt from the snapshot table
pub struct FrequentRead {
    capacity: usize,
    reconcile_interval: u64,
    reads: u64,
    read_counts: HashMap<u64, u64>,
    snapshots: HashMap<u64, u64>,
    // Ties on frequency go to the smaller offset
    queue: BinaryHeap<Reverse<(u64, u64)>>,
}

/// What a single reconciliation pass did to the queue
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub kept: usize,
    pub refreshed: usize,
    pub dropped: usize,
}

impl FrequentRead {
    pub fn new(capacity: usize, reconcile_interval: u64) -> Self {
        Self {
            capacity,
            reconcile_interval,
            reads: 0,
            read_counts: HashMap::new(),
            snapshots: HashMap::new(),
            queue: BinaryHeap::new(),
        }
    }

    /// Reads `offset`, returning true on a hit
    ///
    /// A miss only admits the offset if there's room, or if its read count is strictly greater
    /// than the lowest queued frequency
    pub fn touch(&mut self, offset: u64) -> bool {
        self.reads += 1;
        let count = self.read_counts.entry(offset).or_insert(0);
        *count += 1;
        let count = *count;

        let hit = match self.snapshots.get_mut(&offset) {
            Some(snapshot) => {
                *snapshot = count;
                true
            }
            None => {
                self.admit(offset, count);
                false
            }
        };

        if self.reconcile_interval != 0 && self.reads % self.reconcile_interval == 0 {
            self.reconcile();
        }
        hit
    }

    fn admit(&mut self, offset: u64, count: u64) {
        if self.queue.len() < self.capacity {
            self.queue.push(Reverse((count, offset)));
            self.snapshots.insert(offset, count);
            return;
        }
        let Some(&Reverse((lowest, victim))) = self.queue.peek() else {
            // Zero capacity
            return;
        };
        if count > lowest {
            self.queue.pop();
            self.snapshots.remove(&victim);
            self.queue.push(Reverse((count, offset)));
            self.snapshots.insert(offset, count);
        }
    }

    /// Rebuilds the queue against the snapshot table
    ///
    /// Entries for offsets which are no longer cached are dropped, stale entries are replaced by
    /// one carrying the current snapshot, and up to date entries are kept as they are. Afterwards
    /// there's exactly one entry per cached offset
    pub fn reconcile(&mut self) -> Reconciliation {
        let mut outcome = Reconciliation::default();
        let drained = std::mem::take(&mut self.queue).into_vec();
        let mut rebuilt = Vec::with_capacity(drained.len());
        for Reverse((frequency, offset)) in drained {
            match self.snapshots.get(&offset) {
                Some(&snapshot) if snapshot == frequency => {
                    outcome.kept += 1;
                    rebuilt.push(Reverse((frequency, offset)));
                }
                Some(&snapshot) => {
                    outcome.refreshed += 1;
                    rebuilt.push(Reverse((snapshot, offset)));
                }
                None => outcome.dropped += 1,
            }
        }
        self.queue = BinaryHeap::from(rebuilt);
        debug!(
            reads = self.reads,
            kept = outcome.kept,
            refreshed = outcome.refreshed,
            dropped = outcome.dropped,
            "Reconciled frequency queue"
        );
        outcome
    }

    pub fn contains(&self, offset: u64) -> bool {
        self.snapshots.contains_key(&offset)
    }

    /// Number of cached offsets
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries in the eviction queue, which may include stale ones between
    /// reconciliations
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// The last confirmed frequency of a cached offset
    pub fn snapshot(&self, offset: u64) -> Option<u64> {
        self.snapshots.get(&offset).copied()
    }

    /// The live read count of any offset seen so far
    pub fn read_count(&self, offset: u64) -> u64 {
        self.read_counts.get(&offset).copied().unwrap_or(0)
    }

    /// The frequency `offset` is currently queued at, if it's queued
    pub fn queued_frequency(&self, offset: u64) -> Option<u64> {
        self.queue
            .iter()
            .find(|Reverse((_, queued))| *queued == offset)
            .map(|Reverse((frequency, _))| *frequency)
    }
}
