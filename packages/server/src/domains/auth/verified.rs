use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// How long a successful OTP check authorizes registration
pub const DEFAULT_VERIFIED_TTL_MINUTES: i64 = 10;

/// In-memory record of phones that recently passed OTP verification
///
/// Keyed by the full E.164 number. Entries expire after the TTL and are
/// consumed by a completed registration.
#[derive(Clone)]
pub struct VerifiedPhoneStore {
    verified: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    ttl: Duration,
}

impl VerifiedPhoneStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            verified: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn mark_verified(&self, phone_number: &str) {
        self.mark_verified_at(phone_number, Utc::now()).await;
    }

    async fn mark_verified_at(&self, phone_number: &str, at: DateTime<Utc>) {
        let mut verified = self.verified.write().await;
        verified.insert(phone_number.to_string(), at);
    }

    /// Whether the phone was verified within the TTL
    pub async fn is_verified(&self, phone_number: &str) -> bool {
        let verified = self.verified.read().await;
        match verified.get(phone_number) {
            Some(at) => Utc::now().signed_duration_since(*at) < self.ttl,
            None => false,
        }
    }

    /// Remove the mark, returning when it was made if it was still live.
    ///
    /// Only one caller can take a given mark.
    pub async fn take(&self, phone_number: &str) -> Option<DateTime<Utc>> {
        let mut verified = self.verified.write().await;
        verified
            .remove(phone_number)
            .filter(|at| Utc::now().signed_duration_since(*at) < self.ttl)
    }

    /// Put back a mark previously returned by [`take`](Self::take)
    pub async fn restore(&self, phone_number: &str, at: DateTime<Utc>) {
        self.mark_verified_at(phone_number, at).await;
    }

    /// Clean up expired marks (run periodically)
    pub async fn cleanup_expired(&self) {
        let mut verified = self.verified.write().await;
        let now = Utc::now();
        let ttl = self.ttl;
        verified.retain(|_, at| now.signed_duration_since(*at) < ttl);
    }

    pub async fn len(&self) -> usize {
        self.verified.read().await.len()
    }
}

impl Default for VerifiedPhoneStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_VERIFIED_TTL_MINUTES))
    }
}
