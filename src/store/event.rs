//! Store change notifications.
//!
//! Consumers register callbacks instead of watching state; the store
//! invokes them synchronously, after the mutation that triggered them
//! has been committed.

use uuid::Uuid;

/// Events emitted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Every item on a non-archived list is purchased; the UI should
    /// offer to archive it. Emitted once per completion, until the list
    /// becomes incomplete again or the prompt is dismissed.
    ArchivePromptReady { list_id: Uuid },
}

pub(crate) type Observer = Box<dyn Fn(&StoreEvent) + Send>;
