//! Where log lines come from.
//!
//! A source hands over the historical backlog once, then live lines in
//! arrival order. File I/O stays with the implementor.

use std::future::Future;

use tokio::sync::mpsc;

pub trait LineSource {
    /// Trailing window of lines written before startup. Called once, before
    /// the first `next_line`.
    fn backlog(&mut self) -> Vec<String>;

    /// Next live line, or `None` once the source is exhausted.
    fn next_line(&mut self) -> impl Future<Output = Option<String>> + Send;
}

/// Backlog handed over up front, live lines fed through a channel by a
/// watcher task.
#[derive(Debug)]
pub struct ChannelLineSource {
    backlog: Vec<String>,
    rx: mpsc::Receiver<String>,
}

impl ChannelLineSource {
    pub fn new(backlog: Vec<String>, rx: mpsc::Receiver<String>) -> Self {
        Self { backlog, rx }
    }

    /// Source plus the sender the watcher pushes live lines into.
    pub fn channel(backlog: Vec<String>, capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(backlog, rx))
    }
}

impl LineSource for ChannelLineSource {
    fn backlog(&mut self) -> Vec<String> {
        std::mem::take(&mut self.backlog)
    }

    fn next_line(&mut self) -> impl Future<Output = Option<String>> + Send {
        self.rx.recv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backlog_taken_once_then_live_lines_in_order() {
        let (tx, mut source) = ChannelLineSource::channel(vec!["old".to_string()], 4);
        tx.send("first".to_string()).await.unwrap();
        tx.send("second".to_string()).await.unwrap();
        drop(tx);

        assert_eq!(source.backlog(), vec!["old".to_string()]);
        assert!(source.backlog().is_empty());
        assert_eq!(source.next_line().await.as_deref(), Some("first"));
        assert_eq!(source.next_line().await.as_deref(), Some("second"));
        assert_eq!(source.next_line().await, None);
    }
}
