use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{Service, StatusCode, SystemEvent};

/// Batch size used when none is configured.
pub const DEFAULT_EVENT_COUNT: usize = 300;

/// Largest pause between two consecutive events.
const MAX_GAP_MS: i64 = 250;

/// Parameters of a synthetic batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of events to produce.
    pub count: usize,
    /// Random seed. A fresh seed is drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Timestamp of the first event. Defaults to the current time.
    pub start: Option<DateTime<Utc>>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_EVENT_COUNT,
            seed: None,
            start: None,
        }
    }
}

impl GeneratorConfig {
    /// Generates the configured batch.
    #[must_use]
    pub fn generate(&self) -> Vec<SystemEvent> {
        EventGenerator::from_config(self).generate(self.count)
    }
}

/// Synthesizes plausible request events for the monitored services.
///
/// Each event picks a service uniformly, then draws a response time and a status
/// code from that service's profile:
///
/// | service                   | response time                     | failures                      |
/// |---------------------------|-----------------------------------|-------------------------------|
/// | `auth-service`            | 50–150 ms                         | 20%, split evenly 401 / 403   |
/// | `user-profile-service`    | 150–300 ms                        | 15% → 500                     |
/// | `video-streaming-service` | 300–1000 ms                       | 20% → 500                     |
/// | `alert-service`           | 80–200 ms, 15% spikes 800–2000 ms | 500 whenever above 1000 ms    |
///
/// The generator is an endless iterator; ids count up from 1 and timestamps move
/// forward by a random gap of up to 250 ms.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone as _, Utc};
/// use sysmetrics_events::EventGenerator;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let a = EventGenerator::from_seed(42, start).generate(50);
/// let b = EventGenerator::from_seed(42, start).generate(50);
/// assert_eq!(a, b);
/// assert_eq!(a[0].id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct EventGenerator {
    rng: Pcg32,
    next_id: usize,
    clock: DateTime<Utc>,
}

impl Default for EventGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EventGenerator {
    /// Creates a generator seeded from the OS's random data source, starting now.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(Pcg32::from_os_rng(), Utc::now())
    }

    /// Creates a reproducible generator.
    #[must_use]
    pub fn from_seed(seed: u64, start: DateTime<Utc>) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), start)
    }

    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let start = config.start.unwrap_or_else(Utc::now);
        match config.seed {
            Some(seed) => Self::from_seed(seed, start),
            None => Self::with_rng(Pcg32::from_os_rng(), start),
        }
    }

    fn with_rng(rng: Pcg32, start: DateTime<Utc>) -> Self {
        Self {
            rng,
            next_id: 1,
            clock: start,
        }
    }

    /// Produces the next `count` events.
    pub fn generate(&mut self, count: usize) -> Vec<SystemEvent> {
        self.by_ref().take(count).collect()
    }

    /// Produces the next event.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn next_event(&mut self) -> SystemEvent {
        let service = Service::ALL[self.rng.random_range(0..Service::LEN)];
        let (response_time_ms, status_code) = self.simulate(service);

        let event = SystemEvent::new(
            self.next_id,
            self.clock,
            service,
            response_time_ms.round() as u32,
            status_code,
        );
        self.next_id += 1;
        self.clock += TimeDelta::milliseconds(self.rng.random_range(0..=MAX_GAP_MS));
        event
    }

    /// Draws an unrounded response time and a status code for `service`.
    fn simulate(&mut self, service: Service) -> (f64, StatusCode) {
        let rng = &mut self.rng;
        match service {
            Service::Auth => {
                let response = rng.random_range(50.0..150.0);
                let status = if rng.random_bool(0.2) {
                    if rng.random_bool(0.5) {
                        StatusCode::Unauthorized
                    } else {
                        StatusCode::Forbidden
                    }
                } else {
                    StatusCode::Ok
                };
                (response, status)
            }
            Service::UserProfile => {
                let response = rng.random_range(150.0..300.0);
                let status = if rng.random_bool(0.15) {
                    StatusCode::InternalServerError
                } else {
                    StatusCode::Ok
                };
                (response, status)
            }
            Service::VideoStreaming => {
                let response = rng.random_range(300.0..1000.0);
                let status = if rng.random_bool(0.2) {
                    StatusCode::InternalServerError
                } else {
                    StatusCode::Ok
                };
                (response, status)
            }
            Service::Alert => {
                let response = if rng.random_bool(0.15) {
                    rng.random_range(800.0..2000.0)
                } else {
                    rng.random_range(80.0..200.0)
                };
                let status = if response > 1000.0 {
                    StatusCode::InternalServerError
                } else {
                    StatusCode::Ok
                };
                (response, status)
            }
        }
    }
}

impl Iterator for EventGenerator {
    type Item = SystemEvent;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_event())
    }
}
