use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::address::QueryPlan;
use crate::errors::GeocodeError;
use crate::geocoder::Geocoder;
use crate::records::Coordinates;

/// Every failure degrades to `None`.
pub struct AddressResolver {
    geocoder: Arc<dyn Geocoder>,
    rate_limiter: RateLimiter,
    calls: AtomicUsize,
}

impl AddressResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, request_delay: Duration) -> Self {
        Self {
            geocoder,
            rate_limiter: RateLimiter::new(request_delay),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub async fn resolve(&self, full_address: &str, city: &str) -> Option<Coordinates> {
        let plan = QueryPlan::new(full_address, city)?;
        self.execute(&plan).await
    }

    pub async fn execute(&self, plan: &QueryPlan) -> Option<Coordinates> {
        info!(query = %plan.primary, "attempting to geocode");
        match self.lookup(&plan.primary).await {
            Ok(Some(found)) => {
                info!(
                    latitude = found.latitude,
                    longitude = found.longitude,
                    "found"
                );
                return Some(found);
            }
            Ok(None) => {}
            Err(_) => return None,
        }

        if let Some(fallback) = &plan.fallback {
            info!(query = %fallback, "retrying with simpler address");
            if let Ok(Some(found)) = self.lookup(fallback).await {
                info!(
                    latitude = found.latitude,
                    longitude = found.longitude,
                    "found with simplified address"
                );
                return Some(found);
            }
        }

        info!(query = %plan.primary, "address not found by geocoder");
        None
    }

    async fn lookup(&self, query: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let outcome = self
            .rate_limiter
            .run(self.geocoder.geocode(query))
            .await;
        match outcome {
            Ok(location) => Ok(location.map(|loc| Coordinates {
                latitude: loc.latitude,
                longitude: loc.longitude,
            })),
            Err(err) => {
                match &err {
                    GeocodeError::TimedOut => warn!(query, "geocoding timed out"),
                    GeocodeError::Unavailable(reason) => {
                        warn!(query, reason = %reason, "geocoding service unavailable; try again later")
                    }
                    GeocodeError::Unexpected(reason) => {
                        warn!(query, reason = %reason, "unexpected error during geocoding")
                    }
                }
                Err(err)
            }
        }
    }
}

/// Fixed-interval gate: the permit is held across the call and the pause after
/// it, so consecutive calls are always at least `interval` apart.
struct RateLimiter {
    interval: Duration,
    gate: AsyncMutex<()>,
}

impl RateLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            gate: AsyncMutex::new(()),
        }
    }

    async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self.gate.lock().await;
        let outcome = call.await;
        if !self.interval.is_zero() {
            debug!(
                delay_ms = self.interval.as_millis() as u64,
                "pausing between geocoder calls"
            );
            sleep(self.interval).await;
        }
        outcome
    }
}
