//! Bounded per-session inbound queue.
//!
//! Each local session owns one `Mailbox`: a bounded `mpsc` channel of
//! capacity [`MAILBOX_CAPACITY`] plus a close signal. A full mailbox makes
//! `push` wait (backpressure), it never drops. Closing wakes every waiter:
//! pending `pop` calls return end-of-stream and pending `push` calls fail.

use parley_types::chat::ChatMessage;
use parley_types::error::RouterError;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// Number of undelivered messages a session can hold before senders wait.
pub const MAILBOX_CAPACITY: usize = 10;

pub(crate) struct Mailbox {
    sender: mpsc::Sender<ChatMessage>,
    /// At most one reader drains the queue at a time.
    receiver: Mutex<mpsc::Receiver<ChatMessage>>,
    closed: CancellationToken,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            closed: CancellationToken::new(),
        }
    }

    /// Enqueue a message, waiting while the mailbox is full.
    pub(crate) async fn push(&self, message: ChatMessage) -> Result<(), RouterError> {
        if self.closed.is_cancelled() {
            return Err(closed_error(&message));
        }
        let to = message.to.clone();
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(RouterError::Delivery(format!(
                "mailbox of {to} closed while waiting for space"
            ))),
            sent = self.sender.send(message) => sent.map_err(|err| closed_error(&err.0)),
        }
    }

    /// Enqueue without waiting. Used for best-effort notices.
    pub(crate) fn try_push(&self, message: ChatMessage) -> Result<(), RouterError> {
        if self.closed.is_cancelled() {
            return Err(closed_error(&message));
        }
        self.sender.try_send(message).map_err(|err| match err {
            mpsc::error::TrySendError::Full(m) => {
                RouterError::Delivery(format!("mailbox of {} is full", m.to))
            }
            mpsc::error::TrySendError::Closed(m) => closed_error(&m),
        })
    }

    /// Next message, or `None` once the mailbox is closed.
    pub(crate) async fn pop(&self) -> Option<ChatMessage> {
        let mut receiver = tokio::select! {
            biased;
            _ = self.closed.cancelled() => return None,
            guard = self.receiver.lock() => guard,
        };
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => None,
            message = receiver.recv() => message,
        }
    }

    /// Close the mailbox. Returns `false` if it was already closed.
    pub(crate) fn close(&self) -> bool {
        let was_open = !self.closed.is_cancelled();
        self.closed.cancel();
        was_open
    }
}

fn closed_error(message: &ChatMessage) -> RouterError {
    RouterError::Delivery(format!("mailbox of {} is closed", message.to))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn msg(body: &str) -> ChatMessage {
        ChatMessage::new("a".into(), "b".into(), body)
    }

    #[tokio::test]
    async fn test_fifo_order_is_preserved() {
        let mailbox = Mailbox::new();
        for i in 0..3 {
            mailbox.push(msg(&format!("m{i}"))).await.unwrap();
        }
        for i in 0..3 {
            assert_eq!(mailbox.pop().await.unwrap().body, format!("m{i}"));
        }
    }

    #[tokio::test]
    async fn test_close_wakes_pending_pop() {
        let mailbox = Arc::new(Mailbox::new());
        let reader = {
            let mailbox = Arc::clone(&mailbox);
            tokio::spawn(async move { mailbox.pop().await })
        };
        tokio::task::yield_now().await;
        assert!(mailbox.close());
        let popped = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .expect("pop should return after close")
            .unwrap();
        assert!(popped.is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_sender_blocked_on_full_mailbox() {
        let mailbox = Arc::new(Mailbox::new());
        for i in 0..MAILBOX_CAPACITY {
            mailbox.push(msg(&i.to_string())).await.unwrap();
        }
        let writer = {
            let mailbox = Arc::clone(&mailbox);
            tokio::spawn(async move { mailbox.push(msg("overflow")).await })
        };
        tokio::task::yield_now().await;
        mailbox.close();
        let result = tokio::time::timeout(Duration::from_secs(1), writer)
            .await
            .expect("push should return after close")
            .unwrap();
        assert!(matches!(result, Err(RouterError::Delivery(_))));
    }

    #[tokio::test]
    async fn test_try_push_reports_full() {
        let mailbox = Mailbox::new();
        for i in 0..MAILBOX_CAPACITY {
            mailbox.try_push(msg(&i.to_string())).unwrap();
        }
        assert!(matches!(
            mailbox.try_push(msg("one too many")),
            Err(RouterError::Delivery(_))
        ));
    }

    #[test]
    fn test_double_close_reports_already_closed() {
        let mailbox = Mailbox::new();
        assert!(mailbox.close());
        assert!(!mailbox.close());
        assert!(mailbox.try_push(msg("late")).is_err());
    }
}
