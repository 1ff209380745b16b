//! Change notification for registry consumers.
//!
//! UI components subscribe once and are pushed a [`RegistryEvent`] after
//! every mutation, once the registries are consistent again. There is no
//! polling path.

use vscript_core::ids::DocumentId;

bitflags::bitflags! {
    /// Which parts of a document's registry a mutation touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u8 {
        /// The scope tree changed shape (create/destroy).
        const SCOPES    = 1 << 0;
        /// The variable namespace changed.
        const VARIABLES = 1 << 1;
        /// The function namespace changed.
        const FUNCTIONS = 1 << 2;
        /// The active-scope order changed (enter/exit).
        const ACTIVE    = 1 << 3;
    }
}

/// One change notification. Coarse by design: subscribers re-query the
/// registry rather than diffing event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEvent {
    pub document: DocumentId,
    pub changes: ChangeFlags,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(pub(crate) u32);

type Callback = Box<dyn Fn(&RegistryEvent)>;

/// Subscriber list. Callbacks run synchronously on the mutating call, in
/// subscription order.
#[derive(Default)]
pub(crate) struct Subscribers {
    entries: Vec<(SubscriptionId, Callback)>,
    next_id: u32,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, callback: impl Fn(&RegistryEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sub, _)| *sub != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&self, document: DocumentId, changes: ChangeFlags) {
        if changes.is_empty() {
            return;
        }
        let event = RegistryEvent { document, changes };
        for (_, callback) in &self.entries {
            callback(&event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}
