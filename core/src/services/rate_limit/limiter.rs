//! Sliding-window counter with lockout escalation

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

use md_shared::config::rate_limit::{LimitPreset, RateLimitPurpose};

/// How many increments pass between opportunistic sweeps of dead entries
const SWEEP_INTERVAL: u64 = 64;

/// Build a limiter key from its parts: `purpose:identity[:ip]`
pub fn rate_limit_key(purpose: RateLimitPurpose, identity: &str, ip: Option<&str>) -> String {
    match ip {
        Some(ip) => format!("{}:{}:{}", purpose.as_str(), identity, ip),
        None => format!("{}:{}", purpose.as_str(), identity),
    }
}

/// Outcome of a limiter check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Attempts left in the current window (0 when denied)
    pub remaining: u32,

    /// Seconds until the caller may retry; set when denied
    pub retry_after_seconds: Option<u64>,

    /// True when the denial comes from a lockout rather than window pressure
    pub locked: bool,
}

impl RateLimitDecision {
    fn allowed(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after_seconds: None,
            locked: false,
        }
    }

    fn denied(retry_after: Duration, locked: bool) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            retry_after_seconds: Some(retry_after.num_seconds().max(1) as u64),
            locked,
        }
    }
}

/// One tracked key
#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    window_resets_at: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl RateLimitEntry {
    fn fresh(now: DateTime<Utc>, preset: &LimitPreset) -> Self {
        Self {
            count: 0,
            window_resets_at: now + Duration::seconds(preset.window_seconds as i64),
            locked_until: None,
        }
    }

    fn window_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.window_resets_at
    }

    fn locked_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.locked_until.filter(|until| now < *until)
    }

    /// Fully expired and unlocked entries carry no information and can be
    /// garbage-collected
    fn dead(&self, now: DateTime<Utc>) -> bool {
        self.window_expired(now) && self.locked_at(now).is_none()
    }
}

/// Process-wide in-memory rate limiter.
///
/// State is a single mutex-guarded map: same-key operations serialize, and
/// no lock is ever held across an await point. Window resets happen lazily
/// on access; dead entries are swept opportunistically every
/// [`SWEEP_INTERVAL`] increments.
///
/// The limiter is single-process: it resets on restart and does not
/// coordinate across instances. A multi-instance deployment swaps in a
/// shared counter store behind the same interface at the construction site.
#[derive(Debug, Default)]
pub struct RateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    increments: Mutex<u64>,
}

impl RateLimiter {
    /// Create a new limiter with no tracked keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a request under `key` may proceed. Pure read: the entry
    /// is not mutated (expired windows are *treated* as reset, not rewritten).
    pub fn check(&self, key: &str, preset: &LimitPreset) -> RateLimitDecision {
        self.check_at(key, preset, Utc::now())
    }

    /// Record one attempt under `key`, creating the entry if absent and
    /// escalating to a lockout when the attempt ceiling is hit inside a live
    /// window.
    pub fn increment(&self, key: &str, preset: &LimitPreset) {
        self.increment_at(key, preset, Utc::now());
    }

    /// Remove the entry for `key`. Called when a guarded flow completes
    /// successfully so earlier failures stop counting against the caller.
    pub fn clear(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Number of live tracked keys
    pub fn tracked_keys(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub(crate) fn check_at(
        &self,
        key: &str,
        preset: &LimitPreset,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let entries = self.entries.lock().unwrap();

        let entry = match entries.get(key) {
            Some(entry) => entry,
            None => return RateLimitDecision::allowed(preset.max_requests),
        };

        // A lockout overrides window state entirely
        if let Some(until) = entry.locked_at(now) {
            return RateLimitDecision::denied(until - now, true);
        }

        if entry.window_expired(now) {
            return RateLimitDecision::allowed(preset.max_requests);
        }

        if entry.count >= preset.max_requests {
            return RateLimitDecision::denied(entry.window_resets_at - now, false);
        }

        RateLimitDecision::allowed(preset.max_requests - entry.count)
    }

    pub(crate) fn increment_at(&self, key: &str, preset: &LimitPreset, now: DateTime<Utc>) {
        {
            let mut entries = self.entries.lock().unwrap();

            let entry = entries
                .entry(key.to_string())
                .or_insert_with(|| RateLimitEntry::fresh(now, preset));

            if entry.window_expired(now) && entry.locked_at(now).is_none() {
                *entry = RateLimitEntry::fresh(now, preset);
            }

            entry.count += 1;

            if entry.count >= preset.max_requests {
                if let Some(lockout_seconds) = preset.lockout_seconds {
                    if entry.locked_at(now).is_none() {
                        entry.locked_until =
                            Some(now + Duration::seconds(lockout_seconds as i64));
                        warn!(
                            key = key,
                            attempts = entry.count,
                            lockout_seconds = lockout_seconds,
                            "Rate limit ceiling reached, key locked out"
                        );
                    }
                }
            }
        }

        self.maybe_sweep(now);
    }

    /// Lazy eviction: every SWEEP_INTERVAL increments, drop entries whose
    /// window has expired and which hold no live lockout
    fn maybe_sweep(&self, now: DateTime<Utc>) {
        let due = {
            let mut increments = self.increments.lock().unwrap();
            *increments += 1;
            *increments % SWEEP_INTERVAL == 0
        };

        if due {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|_, entry| !entry.dead(now));
        }
    }
}
