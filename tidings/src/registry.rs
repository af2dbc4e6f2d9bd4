//! Live notification table, id allocation and DND flag

use crate::history::NotificationHistory;
use crate::notification::Notification;
use std::collections::HashMap;

/// All mutable daemon state. Callers share it behind a single lock.
pub struct Registry {
    live: HashMap<u32, Notification>,
    history: NotificationHistory,
    dnd: bool,
    next_id: u32,
}

impl Registry {
    pub fn new(history: NotificationHistory) -> Self {
        Self {
            live: HashMap::new(),
            history,
            dnd: false,
            next_id: 1,
        }
    }

    /// Pick the id for a `Notify` call.
    ///
    /// A non-zero `replaces_id` is used as-is, live or not. Otherwise the
    /// counter advances; it skips 0 if it ever wraps.
    pub fn assign_id(&mut self, replaces_id: u32) -> u32 {
        if replaces_id > 0 {
            return replaces_id;
        }

        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }

    /// Store as live (replacing any entry at that id) and log to history
    pub fn insert(&mut self, notification: Notification) {
        self.history.push(notification.clone());
        self.live.insert(notification.id, notification);
    }

    pub fn remove(&mut self, id: u32) -> Option<Notification> {
        self.live.remove(&id)
    }

    #[cfg(test)]
    pub fn get(&self, id: u32) -> Option<&Notification> {
        self.live.get(&id)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn history(&self) -> &NotificationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut NotificationHistory {
        &mut self.history
    }

    pub fn dnd(&self) -> bool {
        self.dnd
    }

    pub fn set_dnd(&mut self, enabled: bool) {
        self.dnd = enabled;
    }
}
