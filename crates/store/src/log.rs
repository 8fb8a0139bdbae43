//! The action log
//!
//! Every mutation applied to storage is appended here, in the order it was
//! applied, and fanned out to every live subscriber. The log keeps no
//! history: a subscriber sees exactly the actions appended after it
//! subscribed.

use persist_sql::Action;
use std::sync::Arc;
use tokio::sync::mpsc;

/// An applied action and its position in the log
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub sequence: u64,
    pub action: Arc<Action>,
}

pub struct ActionLog {
    /// Next sequence number
    next_sequence: u64,

    /// Active subscribers
    subscribers: Vec<mpsc::UnboundedSender<LogEntry>>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self {
            next_sequence: 1,
            subscribers: Vec::new(),
        }
    }

    /// Append an action, returning its sequence number
    pub fn append(&mut self, action: Action) -> u64 {
        let entry = LogEntry {
            sequence: self.next_sequence,
            action: Arc::new(action),
        };
        self.next_sequence += 1;

        tracing::debug!(
            sequence = entry.sequence,
            table = entry.action.table(),
            action = %entry.action,
            subscribers = self.subscribers.len(),
            "Appending action"
        );

        // A failed send means the receiver is gone
        self.subscribers
            .retain(|subscriber| subscriber.send(entry.clone()).is_ok());

        entry.sequence
    }

    /// Subscribe to every action appended from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<LogEntry> {
        self.cleanup_subscribers();
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Drop subscribers whose receivers were dropped
    pub fn cleanup_subscribers(&mut self) {
        self.subscribers.retain(|s| !s.is_closed());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Sequence number of the last appended action, 0 if none
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence - 1
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persist_sql::{Delete, Expression, Update};
    use std::collections::BTreeMap;

    fn delete(table: &str) -> Action {
        Delete::new(table, None).into()
    }

    #[test]
    fn test_sequences_start_at_one() {
        let mut log = ActionLog::new();
        assert_eq!(log.last_sequence(), 0);
        assert_eq!(log.append(delete("Author")), 1);
        assert_eq!(log.append(delete("Book")), 2);
        assert_eq!(log.last_sequence(), 2);
    }

    #[test]
    fn test_subscribers_see_only_later_actions_in_order() {
        let mut log = ActionLog::new();
        log.append(delete("Early"));

        let mut first = log.subscribe();
        log.append(delete("Author"));
        let mut second = log.subscribe();
        let update = Update::new(
            "Author",
            BTreeMap::from([("born".to_string(), Expression::value(1925i64))]),
            None,
        );
        log.append(update.clone().into());

        let entry = first.try_recv().unwrap();
        assert_eq!((entry.sequence, entry.action.table()), (2, "Author"));
        let entry = first.try_recv().unwrap();
        assert_eq!(entry.sequence, 3);
        assert_eq!(*entry.action, Action::Update(update));
        assert!(first.try_recv().is_err());

        assert_eq!(second.try_recv().unwrap().sequence, 3);
        assert!(second.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut log = ActionLog::new();
        let kept = log.subscribe();
        let dropped = log.subscribe();
        assert_eq!(log.subscriber_count(), 2);

        drop(dropped);
        log.append(delete("Author"));
        assert_eq!(log.subscriber_count(), 1);

        drop(kept);
        log.cleanup_subscribers();
        assert_eq!(log.subscriber_count(), 0);
    }
}
