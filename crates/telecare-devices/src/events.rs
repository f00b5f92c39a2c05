//! Explicit domain events.
//!
//! Side effects that would otherwise hide behind persistence hooks are
//! modeled as events published on a bus with named subscribers. Each
//! subscriber is an independently testable unit; a failing subscriber is
//! logged and never breaks the publisher or its sibling subscribers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use telecare_core::LocationId;
use telecare_emr::FacilityLocation;

use crate::error::ActionError;

/// A domain event the plugins react to.
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A location's encounter association changed.
    LocationEncounterChanged {
        /// The location after the change.
        location: FacilityLocation,
    },
    /// A specimen was collected and is ready for analysis.
    SpecimenCollected {
        /// Locations the originating service request is tied to.
        locations: Vec<LocationId>,
        /// Prepared order payload (patient/facility/service-request
        /// summary), serialized by the host.
        order: Value,
    },
}

impl DeviceEvent {
    /// Stable event name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LocationEncounterChanged { .. } => "location-encounter-changed",
            Self::SpecimenCollected { .. } => "specimen-collected",
        }
    }
}

/// A named event subscriber.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Subscriber name for logging.
    fn name(&self) -> &'static str;

    /// React to an event. Events the subscriber doesn't care about must
    /// be ignored with `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reaction fails; the bus logs it and
    /// continues.
    async fn handle(&self, event: &DeviceEvent) -> Result<(), ActionError>;
}

/// Dispatches events to every registered subscriber.
#[derive(Default)]
pub struct DeviceEventBus {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl DeviceEventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Publish an event to all subscribers, in registration order.
    ///
    /// Subscriber failures are logged and swallowed.
    pub async fn publish(&self, event: &DeviceEvent) {
        tracing::debug!(event = event.name(), "Publishing device event");
        for subscriber in &self.subscribers {
            if let Err(err) = subscriber.handle(event).await {
                tracing::error!(
                    event = event.name(),
                    subscriber = subscriber.name(),
                    error = %err,
                    "Event subscriber failed"
                );
            }
        }
    }
}
