//! Transient user-facing notifications

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::{
    config::Network,
    core::{ErrorKind, SdkError, NOTIFICATION_TTL_SECS},
    explorer,
    prelude::*,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub description: Option<String>,
    pub txid: Option<Signature>,
    pub created_at: Instant,
}

impl Notification {
    pub fn expires_at(&self) -> Instant {
        self.created_at + Duration::from_secs(NOTIFICATION_TTL_SECS)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }

    /// Explorer link for the attached transaction
    pub fn explorer_link(&self, network: Network) -> Option<String> {
        self.txid.map(|sig| explorer::tx_url(&sig, network))
    }

    /// Shortened transaction id for display
    pub fn short_txid(&self) -> Option<String> {
        self.txid
            .map(|sig| explorer::truncate_signature(&sig.to_string()))
    }
}

/// Content of a notification before it is posted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NotificationKind,
    pub message: String,
    pub description: Option<String>,
    pub txid: Option<Signature>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, message)
    }

    fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            description: None,
            txid: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_txid(mut self, txid: Signature) -> Self {
        self.txid = Some(txid);
        self
    }

    /// Error toast for a failed operation, titled by failure class
    pub fn from_error(err: &SdkError) -> Self {
        let title = match err.kind() {
            ErrorKind::Validation => "Invalid input",
            ErrorKind::Upload => "Image upload failed!",
            ErrorKind::Publish => "Metadata upload failed!",
            ErrorKind::Build => "Could not build transaction",
            ErrorKind::Wallet => "Wallet error",
            ErrorKind::Broadcast => "Transaction Failed!",
            ErrorKind::Confirmation => "Transaction not confirmed",
            ErrorKind::Other => "Something went wrong",
        };
        let notice = Self::error(title).with_description(err.to_string());
        match err.signature() {
            Some(sig) => notice.with_txid(sig),
            None => notice,
        }
    }
}

/// Holds active toasts; each one expires on its own after eight seconds
pub struct NotificationCenter {
    next_id: AtomicU64,
    items: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            items: Mutex::new(Vec::new()),
        }
    }

    pub fn notify(&self, notice: Notice) -> u64 {
        self.notify_at(notice, Instant::now())
    }

    pub fn notify_at(&self, notice: Notice, now: Instant) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        match notice.kind {
            NotificationKind::Error => error!(
                id,
                message = %notice.message,
                description = notice.description.as_deref().unwrap_or(""),
                "Notification"
            ),
            _ => info!(id, message = %notice.message, "Notification"),
        }
        self.lock().push(Notification {
            id,
            kind: notice.kind,
            message: notice.message,
            description: notice.description,
            txid: notice.txid,
            created_at: now,
        });
        id
    }

    /// Convenience for reporting a failed operation
    pub fn notify_error(&self, err: &SdkError) -> u64 {
        self.notify(Notice::from_error(err))
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|n| n.id != id);
        items.len() != before
    }

    /// Drop expired toasts, returning how many were removed
    pub fn prune_expired(&self, now: Instant) -> usize {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|n| !n.is_expired(now));
        before - items.len()
    }

    /// Live toasts, newest first
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        self.lock()
            .iter()
            .rev()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    /// Every toast posted and not yet dismissed or pruned, oldest first
    pub fn all(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_dismiss() {
        let center = NotificationCenter::new();
        let now = Instant::now();
        let first = center.notify_at(Notice::info("one"), now);
        let second = center.notify_at(Notice::success("two"), now);

        let active = center.active(now);
        assert_eq!(active[0].id, second);
        assert_eq!(active[1].id, first);

        assert!(center.dismiss(first));
        assert!(!center.dismiss(first));
        assert_eq!(center.active(now).len(), 1);
    }

    #[test]
    fn test_toasts_expire_after_eight_seconds() {
        let center = NotificationCenter::new();
        let now = Instant::now();
        center.notify_at(Notice::error("boom"), now);

        assert_eq!(center.active(now + Duration::from_secs(7)).len(), 1);
        assert!(center.active(now + Duration::from_secs(8)).is_empty());
        assert_eq!(center.prune_expired(now + Duration::from_secs(9)), 1);
        assert!(center.all().is_empty());
    }

    #[test]
    fn test_error_notice_carries_signature() {
        let sig = Signature::new_unique();
        let err = SdkError::Confirmation {
            message: "timed out".to_string(),
            signature: sig,
        };
        let notice = Notice::from_error(&err);
        assert_eq!(notice.kind, NotificationKind::Error);
        assert_eq!(notice.txid, Some(sig));

        let center = NotificationCenter::new();
        center.notify(notice);
        let posted = &center.all()[0];
        assert!(posted
            .explorer_link(Network::Devnet)
            .unwrap()
            .ends_with("?cluster=devnet"));
        assert!(posted.short_txid().unwrap().contains("..."));
    }

    #[test]
    fn test_publish_error_title() {
        let notice = Notice::from_error(&SdkError::Publish("503".to_string()));
        assert_eq!(notice.message, "Metadata upload failed!");
        assert_eq!(notice.txid, None);
    }
}
