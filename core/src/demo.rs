//! Rotating demo data behind the index route.
//!
//! A counter in `0..SNAPSHOT_COUNT` picks one of three fixed item
//! collections. `/tick` advances it and wraps around; `/` only reads it. The
//! snapshots are never touched by the item store.

use serde::Serialize;

use crate::store::Item;

pub const SNAPSHOT_COUNT: usize = 3;

/// `{ items }` as returned by the index route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct DemoState {
    tick: usize,
    snapshots: [Snapshot; SNAPSHOT_COUNT],
}

impl DemoState {
    pub fn new(snapshots: [Snapshot; SNAPSHOT_COUNT]) -> Self {
        Self { tick: 0, snapshots }
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Move to the next snapshot, wrapping back to the first after the last.
    pub fn advance(&mut self) {
        self.tick = (self.tick + 1) % SNAPSHOT_COUNT;
        tracing::debug!(tick = self.tick, "demo state advanced");
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.tick]
    }
}

impl Default for DemoState {
    fn default() -> Self {
        Self::new(builtin_snapshots())
    }
}

fn snapshot(rows: &[(i64, &str, i64, &str)]) -> Snapshot {
    Snapshot {
        items: rows
            .iter()
            .map(|&(id, name, amount, date)| Item::record(id, name, amount, date))
            .collect(),
    }
}

/// The three collections served by a fresh server, in rotation order.
pub fn builtin_snapshots() -> [Snapshot; SNAPSHOT_COUNT] {
    [
        snapshot(&[
            (1, "A", 100, "01-01-2025"),
            (2, "B", 0, "01-01-2025"),
            (3, "C", 30, "01-01-2025"),
            (4, "D", 40, "01-01-2025"),
            (1, "A", 30, "03-01-2025"),
            (2, "B", 20, "03-01-2025"),
            (3, "C", 30, "03-01-2027"),
            (4, "D", 40, "03-01-2025"),
            (1, "A", 30, "03-01-2025"),
            (2, "B", 20, "03-01-2025"),
            (3, "C", 30, "03-01-2025"),
            (4, "D", 40, "03-01-2026"),
        ]),
        snapshot(&[
            (1, "A", 20, "02-01-2025"),
            (2, "B", 20, "02-01-2025"),
            (3, "C", 30, "02-01-2025"),
            (4, "D", 40, "02-01-2025"),
        ]),
        snapshot(&[
            (1, "A", 30, "03-01-2025"),
            (2, "B", 20, "03-01-2025"),
            (3, "C", 30, "03-01-2025"),
            (4, "D", 40, "03-01-2025"),
        ]),
    ]
}
