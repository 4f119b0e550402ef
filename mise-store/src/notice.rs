use tokio::sync::broadcast;

/// User-facing outcome of an operation, the equivalent of a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Fan-out channel for [`Notice`]s.
///
/// Clone + Send + Sync. Publishing with no subscriber is not an error: the
/// notice is simply dropped.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(Notice::Success(message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(Notice::Error(message.into()));
    }

    pub fn publish(&self, notice: Notice) {
        tracing::debug!(?notice, "notice");
        let _ = self.tx.send(notice);
    }

    pub fn subscribe(&self) -> NoticeReceiver {
        NoticeReceiver {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving end of a [`Notifier`] subscription.
pub struct NoticeReceiver {
    rx: broadcast::Receiver<Notice>,
}

impl NoticeReceiver {
    /// Next notice, skipping over any the receiver lagged behind on.
    /// `None` once every notifier handle is dropped.
    pub async fn recv(&mut self) -> Option<Notice> {
        loop {
            match self.rx.recv().await {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notice receiver lagged");
                }
            }
        }
    }

    /// Non-blocking variant of [`recv`](NoticeReceiver::recv).
    pub fn try_recv(&mut self) -> Option<Notice> {
        loop {
            match self.rx.try_recv() {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
