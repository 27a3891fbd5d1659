//! Transcript item reductions.
//!
//! Deltas append to an item addressed by id. An item must exist (from a
//! prior item-started) before deltas are accepted; deltas for unknown items
//! or for items of the wrong kind are dropped, never fatal.

use tracing::debug;

use crate::models::{ConversationItem, ItemContent, ThreadKey};
use crate::store::{StoreEffect, ThreadStore};

impl ThreadStore {
    /// Open a new transcript item. Replaying the same start event is a
    /// no-op; the existing item (and any deltas it has absorbed) wins.
    pub(crate) fn item_started(&mut self, key: ThreadKey, item: ConversationItem) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if record.items.iter().any(|existing| existing.id == item.id) {
            debug!(thread = %key, item = %item.id, "duplicate item start dropped");
            return Vec::new();
        }
        record.items.push(item);
        self.touch(&key);
        Vec::new()
    }

    /// Finalize an item. Unknown ids are dropped.
    pub(crate) fn item_completed(&mut self, key: ThreadKey, item_id: &str) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if let Some(item) = record.items.iter_mut().find(|i| i.id == item_id) {
            item.completed = true;
            self.touch(&key);
        }
        Vec::new()
    }

    pub(crate) fn message_delta(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        delta: &str,
    ) -> Vec<StoreEffect> {
        self.append_delta(key, item_id, delta, |content| match content {
            ItemContent::Message { text, .. } => Some(text),
            _ => None,
        })
    }

    pub(crate) fn reasoning_delta(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        delta: &str,
    ) -> Vec<StoreEffect> {
        self.append_delta(key, item_id, delta, |content| match content {
            ItemContent::Reasoning { text, .. } => Some(text),
            _ => None,
        })
    }

    /// Mark a boundary between reasoning blocks. The section counter feeds
    /// the "thinking…" header; a blank line separates blocks in the text.
    pub(crate) fn reasoning_boundary(&mut self, key: ThreadKey, item_id: &str) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        if let Some(item) = record.items.iter_mut().find(|i| i.id == item_id) {
            if let ItemContent::Reasoning { text, sections } = &mut item.content {
                *sections += 1;
                if !text.is_empty() && !text.ends_with("\n\n") {
                    text.push_str("\n\n");
                }
                self.touch(&key);
            }
        }
        Vec::new()
    }

    pub(crate) fn plan_delta(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        delta: &str,
    ) -> Vec<StoreEffect> {
        self.append_delta(key, item_id, delta, |content| match content {
            ItemContent::Plan { text } => Some(text),
            _ => None,
        })
    }

    pub(crate) fn command_output_delta(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        delta: &str,
    ) -> Vec<StoreEffect> {
        self.append_delta(key, item_id, delta, |content| match content {
            ItemContent::Command { output, .. } => Some(output),
            _ => None,
        })
    }

    /// User keystrokes echoed into a running command's terminal show up in
    /// the same output stream.
    pub(crate) fn terminal_interaction(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        data: &str,
    ) -> Vec<StoreEffect> {
        self.command_output_delta(key, item_id, data)
    }

    pub(crate) fn file_change_output_delta(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        delta: &str,
    ) -> Vec<StoreEffect> {
        self.append_delta(key, item_id, delta, |content| match content {
            ItemContent::FileChange { output, .. } => Some(output),
            _ => None,
        })
    }

    /// Shared delta path: find the item, project the right text field,
    /// append. Anything that does not line up is dropped with a debug log.
    fn append_delta(
        &mut self,
        key: ThreadKey,
        item_id: &str,
        delta: &str,
        project: impl Fn(&mut ItemContent) -> Option<&mut String>,
    ) -> Vec<StoreEffect> {
        let record = self.record_mut(&key);
        match record.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) => match project(&mut item.content) {
                Some(text) => {
                    text.push_str(delta);
                    self.touch(&key);
                }
                None => {
                    debug!(thread = %key, item = item_id, "delta kind mismatch dropped");
                }
            },
            None => {
                debug!(thread = %key, item = item_id, "delta for unknown item dropped");
            }
        }
        Vec::new()
    }
}
