use serde::Serialize;
use tokio::sync::broadcast;

/// The five persisted tables, as named in change notifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Games,
    Players,
    RoundState,
    Votes,
    LeaveRequests,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Row-level change emitted after a mutation commits. The payload is the
/// changed row itself, not a diff; consumers re-read the full snapshot
/// rather than patching local state.
#[derive(Clone, Debug, Serialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub row: serde_json::Value,
}

/// Fan-out channel for [`ChangeEvent`]s. Delivery is at-least-once for live
/// subscribers; slow subscribers see a lag error and must re-read.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, table: ChangeTable, kind: ChangeKind, row: serde_json::Value) {
        let event = ChangeEvent { table, kind, row };
        tracing::debug!("change committed: {:?} {:?}", event.table, event.kind);
        // send only fails when nobody is subscribed, which is fine
        let _ = self.tx.send(event);
    }
}
