//! Bounded, age-faded position history, one buffer per body
//!
//! Entries are kept oldest first in a `VecDeque`. Eviction only ever pops
//! from the front, so insertion order and age order always agree.
//! Two independent caps apply: `max_age` (in simulation seconds) and
//! `max_count`. Whichever is hit first evicts.

use std::collections::VecDeque;

use crate::error::ConfigError;
use crate::simulation::vector::NVec2;

/// Caps and fade shaping shared by every trail in a simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSettings {
    pub max_age: Option<f64>, // seconds of simulation time
    pub max_count: Option<usize>, // entries
    pub fade_exponent: f64, // 1.0 = linear, 0.5 = sqrt falloff
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            max_age: Some(30.0),
            max_count: Some(200),
            fade_exponent: 0.5,
        }
    }
}

impl TrailSettings {
    /// At least one cap, both caps positive, finite positive exponent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_age.is_none() && self.max_count.is_none() {
            return Err(ConfigError::UnboundedTrail);
        }
        if let Some(age) = self.max_age {
            if !(age > 0.0) || !age.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: "trail.max_age",
                    reason: format!("must be positive, got {age}"),
                });
            }
        }
        if self.max_count == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "trail.max_count",
                reason: "must be at least 1".into(),
            });
        }
        if !(self.fade_exponent > 0.0) || !self.fade_exponent.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "trail.fade_exponent",
                reason: format!("must be positive, got {}", self.fade_exponent),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrailEntry {
    position: NVec2,
    time: f64,
}

/// One rendered trail point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: NVec2,
    pub fade: f64, // in [0, 1], 1 = newest
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrailBuffer {
    settings: TrailSettings,
    entries: VecDeque<TrailEntry>,
    last_now: f64,
}

impl TrailBuffer {
    pub fn new(settings: TrailSettings) -> Self {
        let capacity = settings.max_count.unwrap_or(0);
        Self {
            settings,
            entries: VecDeque::with_capacity(capacity),
            last_now: 0.0,
        }
    }

    pub fn settings(&self) -> &TrailSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last_now = 0.0;
    }

    /// Append a position stamped with `now`
    ///
    /// `now` must not go backwards between calls; a smaller value is raised
    /// to the newest stamp so the buffer stays ordered.
    pub fn record(&mut self, position: NVec2, now: f64) {
        let time = match self.entries.back() {
            Some(last) if now < last.time => last.time,
            _ => now,
        };
        self.entries.push_back(TrailEntry { position, time });
        self.last_now = self.last_now.max(time);
    }

    /// Drop entries older than `max_age` and any excess over `max_count`,
    /// always from the front
    pub fn prune(&mut self, now: f64) {
        self.last_now = self.last_now.max(now);

        if let Some(max_age) = self.settings.max_age {
            while let Some(front) = self.entries.front() {
                if now - front.time > max_age {
                    self.entries.pop_front();
                } else {
                    break;
                }
            }
        }

        if let Some(max_count) = self.settings.max_count {
            while self.entries.len() > max_count {
                self.entries.pop_front();
            }
        }
    }

    /// Ordered (oldest first) read-only copy with fade factors, evaluated at
    /// the time of the last `record`/`prune`
    pub fn snapshot(&self) -> Vec<TrailPoint> {
        let now = self.last_now;
        let len = self.entries.len();

        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| TrailPoint {
                position: e.position,
                fade: self.fade_for(now - e.time, len - 1 - i),
            })
            .collect()
    }

    /// Age of the oldest entry relative to the last observed time
    pub fn oldest_age(&self) -> Option<f64> {
        self.entries.front().map(|e| self.last_now - e.time)
    }

    // Time-based when max_age is set, otherwise by distance from the newest entry
    fn fade_for(&self, age: f64, steps_back: usize) -> f64 {
        let linear = match (self.settings.max_age, self.settings.max_count) {
            (Some(max_age), _) if max_age > 0.0 => 1.0 - age / max_age,
            (_, Some(max_count)) if max_count > 0 => 1.0 - steps_back as f64 / max_count as f64,
            _ => 1.0,
        };
        linear.clamp(0.0, 1.0).powf(self.settings.fade_exponent)
    }
}
