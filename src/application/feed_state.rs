use crate::domain::ports::feed_source::CacheValidators;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

/// Poll pacing for one source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub min_interval: Duration,
    /// Added to the interval per consecutive error.
    pub error_penalty: Duration,
    pub max_error_penalty: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::seconds(30),
            error_penalty: Duration::seconds(30),
            max_error_penalty: Duration::seconds(300),
        }
    }
}

impl PollPolicy {
    pub fn penalty(&self, consecutive_errors: u32) -> Duration {
        let penalty = self.error_penalty * consecutive_errors.min(i32::MAX as u32) as i32;
        penalty.min(self.max_error_penalty)
    }
}

/// Process-local polling state of one feed source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub last_fingerprint: Option<String>,
    pub last_poll: Option<DateTime<Utc>>,
    pub consecutive_errors: u32,
}

impl FeedState {
    /// A source that never polled is due. After errors the wait is the
    /// minimum interval plus the capped penalty and must be strictly exceeded.
    pub fn should_poll(&self, now: DateTime<Utc>, policy: &PollPolicy) -> bool {
        let Some(last) = self.last_poll else {
            return true;
        };
        let elapsed = now - last;
        if self.consecutive_errors > 0 {
            elapsed > policy.min_interval + policy.penalty(self.consecutive_errors)
        } else {
            elapsed >= policy.min_interval
        }
    }

    pub fn validators(&self) -> CacheValidators {
        CacheValidators {
            etag: self.etag.clone(),
            last_modified: self.last_modified.clone(),
        }
    }

    pub fn is_unchanged(&self, fingerprint: &str) -> bool {
        self.last_fingerprint.as_deref() == Some(fingerprint)
    }

    /// 304: only the poll time moves.
    pub fn record_not_modified(&mut self, now: DateTime<Utc>) {
        self.last_poll = Some(now);
        self.consecutive_errors = 0;
    }

    /// Body fetched and, if it changed, parsed.
    pub fn record_success(
        &mut self,
        now: DateTime<Utc>,
        etag: Option<String>,
        last_modified: Option<String>,
        fingerprint: String,
    ) {
        self.last_poll = Some(now);
        self.etag = etag;
        self.last_modified = last_modified;
        self.last_fingerprint = Some(fingerprint);
        self.consecutive_errors = 0;
    }

    pub fn record_error(&mut self, now: DateTime<Utc>) {
        self.last_poll = Some(now);
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
    }
}

/// SHA-256 of a payload, hex encoded.
pub fn fingerprint(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
