//! Output log with staggered writes
//!
//! Result lines are not appended at once: line `i` of a batch becomes
//! visible `i * interval` after the batch was written. Every pending write
//! remembers the anchor it was scheduled against; `clear` moves the anchor,
//! which drops whatever was still in flight.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use super::markup::Line;

/// Default gap between consecutive lines of one batch.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(40);

struct Pending<T> {
    due: Instant,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Pending<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Pending<T> {}

impl<T> PartialOrd for Pending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pending<T> {
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deadline queue of independent one-shot timers.
///
/// Items with the same deadline fire in the order they were scheduled.
pub struct Scheduler<T> {
    heap: BinaryHeap<Pending<T>>,
    next_seq: u64,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self { heap: BinaryHeap::new(), next_seq: 0 }
    }

    pub fn schedule(&mut self, due: Instant, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Pending { due, seq, item });
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|p| p.due)
    }

    /// Pop everything due at or before `now`, in firing order.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let mut fired = Vec::new();
        while self.heap.peek().is_some_and(|p| p.due <= now) {
            if let Some(p) = self.heap.pop() {
                fired.push(p.item);
            }
        }
        fired
    }

    /// Drop pending items that fail `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.heap.retain(|p| keep(&p.item));
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one generation of the log. Bumped by every clear.
pub type AnchorId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// The prompt plus what the user typed.
    Echo,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub line: Line,
    pub kind: EntryKind,
}

pub struct OutputLog {
    entries: Vec<Entry>,
    anchor: AnchorId,
    pending: Scheduler<(AnchorId, Line)>,
    interval: Duration,
}

impl OutputLog {
    pub fn new(interval: Duration) -> Self {
        Self { entries: Vec::new(), anchor: 0, pending: Scheduler::new(), interval }
    }

    /// Schedule a batch: line `i` lands at `now + i * interval`.
    pub fn write_lines(&mut self, now: Instant, lines: Vec<Line>) {
        self.write_lines_after(now, Duration::ZERO, lines);
    }

    /// Like [`write_lines`](Self::write_lines), starting `delay` from `now`.
    pub fn write_lines_after(&mut self, now: Instant, delay: Duration, lines: Vec<Line>) {
        let start = now + delay;
        for (idx, line) in lines.into_iter().enumerate() {
            let due = start + self.interval * idx as u32;
            self.pending.schedule(due, (self.anchor, line));
        }
    }

    /// Append an echo line right away.
    pub fn echo(&mut self, line: Line) {
        self.entries.push(Entry { line, kind: EntryKind::Echo });
    }

    /// Wipe the log and start a new anchor. Writes still in flight die.
    pub fn clear(&mut self) {
        let dropped = self.pending.len();
        self.entries.clear();
        self.anchor += 1;
        let anchor = self.anchor;
        self.pending.retain(|(a, _)| *a == anchor);
        tracing::debug!(anchor, dropped, "output log cleared");
    }

    /// Land every write that is due. Returns how many lines were appended.
    pub fn advance(&mut self, now: Instant) -> usize {
        let mut landed = 0;
        for (anchor, line) in self.pending.take_due(now) {
            if anchor != self.anchor {
                continue;
            }
            self.entries.push(Entry { line, kind: EntryKind::Output });
            landed += 1;
        }
        landed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn anchor(&self) -> AnchorId {
        self.anchor
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Plain text of every visible line, for tests and line-mode output.
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.line.text()).collect()
    }
}

impl Default for OutputLog {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
