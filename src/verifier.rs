//! Password verification state machine.
//!
//! A [`Verifier`] owns the expected digest and a handle to the key-value
//! store. A successful [`Verifier::verify`] persists a [`VerificationRecord`]
//! and notifies every listener registered with [`Verifier::on_verified`].
//! Whether that record is still trusted is decided lazily on every
//! [`Verifier::status`] call; nothing is ever evicted.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::config::GateConfig;
use crate::error::{GateError, Result};
use crate::hashers::digest_hex;
use crate::models::{Algorithm, GateStatus, PasswordVerified, UnverifiedReason, VerificationRecord};
use crate::storage::Storage;
use crate::utils::{normalize_expected_hash, short_hash};

/// Storage key of the verification record when none is configured.
pub const DEFAULT_RECORD_KEY: &str = "passwordVerification";

type Listener = Arc<dyn Fn(&PasswordVerified) + Send + Sync>;

pub struct Verifier {
    storage: Arc<dyn Storage>,
    algorithm: Algorithm,
    expected_hash: Option<String>,
    ttl: Duration,
    record_key: String,
    listeners: RwLock<Vec<Listener>>,
}

impl Verifier {
    /// Create a verifier. `expected_hash` is normalized; an unusable value
    /// leaves the gate unprotected.
    pub fn new(
        storage: Arc<dyn Storage>,
        algorithm: Algorithm,
        expected_hash: Option<&str>,
        ttl: Duration,
    ) -> Self {
        let normalized = normalize_expected_hash(expected_hash, algorithm);
        match (&normalized, expected_hash) {
            (Some(hash), _) => {
                tracing::debug!(algorithm = %algorithm, hash = %short_hash(hash), "password gate enabled")
            }
            (None, Some(raw)) if !raw.trim().is_empty() => tracing::warn!(
                algorithm = %algorithm,
                "configured password hash is not a {} digest, gate disabled",
                algorithm
            ),
            (None, _) => tracing::debug!("no password hash configured, gate disabled"),
        }
        Self {
            storage,
            algorithm,
            expected_hash: normalized,
            ttl,
            record_key: DEFAULT_RECORD_KEY.to_string(),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Build from configuration. Fails with [`GateError::DigestUnavailable`]
    /// when the configured algorithm is not supported.
    pub fn from_config(config: &GateConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let algorithm = config.algorithm()?;
        Ok(Self::new(
            storage,
            algorithm,
            config.password_hash.as_deref(),
            config.verification_ttl(),
        )
        .with_record_key(config.storage.verification_key.clone()))
    }

    pub fn with_record_key(mut self, key: impl Into<String>) -> Self {
        self.record_key = key.into();
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn record_key(&self) -> &str {
        &self.record_key
    }

    /// Register a callback for the `passwordVerified` notification.
    pub fn on_verified<F>(&self, listener: F)
    where
        F: Fn(&PasswordVerified) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Digest of `candidate` under the configured algorithm. Runs on a
    /// blocking worker; fails only if that worker cannot deliver a result.
    pub async fn digest(&self, candidate: &str) -> Result<String> {
        let algorithm = self.algorithm;
        let input = candidate.to_owned();
        tokio::task::spawn_blocking(move || digest_hex(&input, algorithm))
            .await
            .map_err(|e| GateError::DigestUnavailable(e.to_string()))
    }

    pub fn is_protected(&self) -> bool {
        self.expected_hash.is_some()
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified_at(Utc::now())
    }

    pub fn is_verified_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status_at(now), GateStatus::Verified { .. })
    }

    /// True when no prompt is needed: either there is no gate or the stored
    /// verification is still trusted.
    pub fn is_unlocked(&self) -> bool {
        self.status().is_unlocked()
    }

    pub fn status(&self) -> GateStatus {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> GateStatus {
        let Some(expected) = self.expected_hash.as_deref() else {
            return GateStatus::Unprotected;
        };
        let Some(raw) = self.storage.get(&self.record_key) else {
            return GateStatus::Unverified(UnverifiedReason::Missing);
        };
        let record: VerificationRecord = match serde_json::from_str(&raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed verification record");
                return GateStatus::Unverified(UnverifiedReason::Malformed);
            }
        };
        if !record.verified {
            return GateStatus::Unverified(UnverifiedReason::NotVerified);
        }
        // a rotated password invalidates every earlier verification
        if record.password_hash != expected {
            return GateStatus::Unverified(UnverifiedReason::HashMismatch);
        }
        if now.signed_duration_since(record.timestamp) >= self.ttl {
            return GateStatus::Unverified(UnverifiedReason::Expired);
        }
        let expires_at = record
            .timestamp
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        GateStatus::Verified { expires_at }
    }

    /// Check `candidate` against the expected digest.
    ///
    /// On a match the verification record is overwritten with a fresh
    /// timestamp and listeners are notified. A mismatch, or a gate with no
    /// expected hash, touches nothing and returns `false`.
    pub async fn verify(&self, candidate: &str) -> Result<bool> {
        let Some(expected) = self.expected_hash.as_deref() else {
            tracing::debug!("verify called but no password is configured");
            return Ok(false);
        };

        let computed = self.digest(candidate).await?;
        if computed != expected {
            tracing::info!("password rejected");
            return Ok(false);
        }

        let now = Utc::now();
        let record = VerificationRecord::new(expected, now);
        let json = serde_json::to_string(&record).map_err(GateError::storage)?;

        // the record write and the listeners may touch the disk
        let storage = Arc::clone(&self.storage);
        let key = self.record_key.clone();
        let listeners: Vec<Listener> = self.listeners.read().clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            storage.set(&key, &json)?;
            notify(&listeners, &PasswordVerified { verified_at: now });
            Ok(())
        })
        .await
        .map_err(GateError::storage)??;

        tracing::info!(hash = %short_hash(expected), "password verified");
        Ok(true)
    }
}

fn notify(listeners: &[Listener], event: &PasswordVerified) {
    tracing::debug!(listeners = listeners.len(), "dispatching passwordVerified");
    for listener in listeners {
        listener(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TESTPASS: &str = "13d249f2cb4127b40cfa757866850278793f814ded3c587fe5889e889a7a9f6c";

    fn ttl() -> Duration {
        Duration::milliseconds(crate::config::DEFAULT_VERIFICATION_TTL_MS as i64)
    }

    fn verifier(storage: &Arc<MemoryStorage>, hash: Option<&str>) -> Verifier {
        Verifier::new(storage.clone(), Algorithm::Sha256, hash, ttl())
    }

    fn put_record(storage: &MemoryStorage, record: &VerificationRecord) {
        storage
            .set(DEFAULT_RECORD_KEY, &serde_json::to_string(record).unwrap())
            .unwrap();
    }

    #[tokio::test]
    async fn correct_password_verifies_and_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        assert!(v.is_protected());
        assert!(!v.is_verified());

        assert!(v.verify("testpass").await.unwrap());
        assert!(v.is_verified());

        let raw = storage.get(DEFAULT_RECORD_KEY).unwrap();
        let record: VerificationRecord = serde_json::from_str(&raw).unwrap();
        assert!(record.verified);
        assert_eq!(record.password_hash, TESTPASS);
    }

    #[tokio::test]
    async fn wrong_password_writes_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        assert!(!v.verify("wrongpass").await.unwrap());
        assert!(!v.verify("wrongpass").await.unwrap());
        assert!(storage.is_empty());
        assert_eq!(v.status(), GateStatus::Unverified(UnverifiedReason::Missing));
    }

    #[tokio::test]
    async fn wrong_password_keeps_existing_verification() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        assert!(v.verify("testpass").await.unwrap());
        let before = storage.get(DEFAULT_RECORD_KEY);

        assert!(!v.verify("nope").await.unwrap());
        assert_eq!(storage.get(DEFAULT_RECORD_KEY), before);
        assert!(v.is_verified());
    }

    #[test]
    fn expiry_boundary() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        let now = Utc::now();

        put_record(&storage, &VerificationRecord::new(TESTPASS, now));
        assert!(v.is_verified_at(now));

        put_record(&storage, &VerificationRecord::new(TESTPASS, now - ttl() - Duration::milliseconds(1)));
        assert!(!v.is_verified_at(now));
        assert_eq!(v.status_at(now), GateStatus::Unverified(UnverifiedReason::Expired));

        put_record(&storage, &VerificationRecord::new(TESTPASS, now - ttl() + Duration::milliseconds(1)));
        assert!(v.is_verified_at(now));
    }

    #[test]
    fn verified_status_reports_expiry() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        let stamped = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
        put_record(&storage, &VerificationRecord::new(TESTPASS, stamped));

        assert_eq!(
            v.status_at(stamped + Duration::days(1)),
            GateStatus::Verified { expires_at: stamped + Duration::days(90) }
        );
    }

    #[test]
    fn malformed_records_are_unverified() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        for raw in ["not json", "{}", r#"{"verified":true}"#, r#"{"verified":"yes","timestamp":1,"passwordHash":"x"}"#] {
            storage.set(DEFAULT_RECORD_KEY, raw).unwrap();
            assert_eq!(v.status(), GateStatus::Unverified(UnverifiedReason::Malformed), "{raw}");
            assert!(!v.is_verified());
        }
    }

    #[test]
    fn record_marked_unverified_is_not_trusted() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        let mut record = VerificationRecord::new(TESTPASS, Utc::now());
        record.verified = false;
        put_record(&storage, &record);
        assert_eq!(v.status(), GateStatus::Unverified(UnverifiedReason::NotVerified));
    }

    #[tokio::test]
    async fn rotating_password_invalidates_verification() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        assert!(v.verify("testpass").await.unwrap());

        let rotated = digest_hex("newpass", Algorithm::Sha256);
        let v2 = verifier(&storage, Some(&rotated));
        assert!(!v2.is_verified());
        assert_eq!(v2.status(), GateStatus::Unverified(UnverifiedReason::HashMismatch));

        assert!(v2.verify("newpass").await.unwrap());
        assert!(v2.is_verified());
    }

    #[tokio::test]
    async fn event_fires_once_per_success() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        v.on_verified(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!v.verify("wrongpass").await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(v.verify("testpass").await.unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn listeners_run_on_blocking_worker() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, Some(TESTPASS));
        let async_thread = std::thread::current().id();
        let listener_thread = Arc::new(parking_lot::Mutex::new(None));
        let seen = listener_thread.clone();
        v.on_verified(move |_| {
            *seen.lock() = Some(std::thread::current().id());
        });

        assert!(v.verify("testpass").await.unwrap());
        let ran_on = listener_thread.lock().clone().expect("listener ran");
        assert_ne!(ran_on, async_thread);
    }

    #[tokio::test]
    async fn unprotected_gate_never_verifies() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, None);
        assert!(!v.is_protected());
        assert!(v.is_unlocked());
        assert!(!v.is_verified());
        assert!(!v.verify("anything").await.unwrap());
        assert!(storage.is_empty());
        assert_eq!(v.status(), GateStatus::Unprotected);
    }

    #[test]
    fn unsupported_algorithm_fails_construction() {
        let config = GateConfig {
            algorithm: "md5".into(),
            ..GateConfig::default()
        };
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        assert!(matches!(
            Verifier::from_config(&config, storage),
            Err(GateError::DigestUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn digest_matches_hasher() {
        let storage = Arc::new(MemoryStorage::new());
        let v = verifier(&storage, None);
        assert_eq!(v.digest("testpass").await.unwrap(), TESTPASS);
    }
}
