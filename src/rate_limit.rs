// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    start: Instant,
}

/// Fixed-window request counter keyed by client IP.
///
/// Entries are never evicted, so memory grows with the number of distinct keys seen.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Records a request at `now`; `false` means it must be rejected.
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match entries.get_mut(key) {
            Some(w) if now.saturating_duration_since(w.start) <= self.window => {
                if w.count >= self.max_requests {
                    false
                } else {
                    w.count += 1;
                    true
                }
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        start: now,
                    },
                );
                true
            }
        }
    }
}
