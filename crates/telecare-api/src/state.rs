//! Shared application state.

use std::sync::Arc;

use telecare_auth::{GatewayTokenVerifier, TokenIssuer};
use telecare_devices::camera::{CameraActions, PresetService};
use telecare_devices::lab_analyzer::LabAnalyzerActions;
use telecare_emr::{DeviceStore, ObservationSink, PermissionBackend, PresetStore, ReportStore};
use telecare_registry::DeviceTypeRegistry;

use crate::config::ApiConfig;

/// Everything the request handlers need.
pub struct ApiState {
    /// Sealed device-type registry.
    pub registry: Arc<DeviceTypeRegistry>,
    /// Host device/location store.
    pub devices: Arc<dyn DeviceStore>,
    /// Inbound token verifier.
    pub verifier: Arc<GatewayTokenVerifier>,
    /// Outbound token issuer (also publishes the platform JWKS).
    pub issuer: Arc<TokenIssuer>,
    /// Camera relay actions.
    pub camera_actions: Arc<CameraActions>,
    /// Lab-analyzer relay actions.
    pub lab_actions: Arc<LabAnalyzerActions>,
    /// Camera position presets.
    pub presets: Arc<PresetService>,
    /// Host observation sink.
    pub observations: Arc<dyn ObservationSink>,
    /// Service configuration.
    pub config: ApiConfig,
}

/// Host collaborator handles used to assemble an [`ApiState`].
#[derive(Clone)]
pub struct HostBackends {
    /// Device/location store.
    pub devices: Arc<dyn DeviceStore>,
    /// Preset store.
    pub presets: Arc<dyn PresetStore>,
    /// Diagnostic report store.
    pub reports: Arc<dyn ReportStore>,
    /// Observation sink.
    pub observations: Arc<dyn ObservationSink>,
    /// Permission engine.
    pub permissions: Arc<dyn PermissionBackend>,
}

impl ApiState {
    /// Assemble the state from a sealed registry, host backends, and an
    /// issuer.
    #[must_use]
    pub fn new(
        registry: Arc<DeviceTypeRegistry>,
        backends: &HostBackends,
        issuer: Arc<TokenIssuer>,
        config: ApiConfig,
    ) -> Self {
        let relay = config.relay_config();
        let camera_actions = Arc::new(CameraActions::new(
            backends.devices.clone(),
            backends.permissions.clone(),
            issuer.clone(),
            relay.clone(),
        ));
        let lab_actions = Arc::new(LabAnalyzerActions::new(
            backends.devices.clone(),
            backends.reports.clone(),
            issuer.clone(),
            relay,
        ));
        let presets = Arc::new(PresetService::new(
            backends.presets.clone(),
            backends.devices.clone(),
        ));

        Self {
            registry,
            devices: backends.devices.clone(),
            verifier: Arc::new(GatewayTokenVerifier::new()),
            issuer,
            camera_actions,
            lab_actions,
            presets,
            observations: backends.observations.clone(),
            config,
        }
    }
}
