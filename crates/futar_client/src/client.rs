//! FUTÁR API client
//!
//! One method per endpoint. Every call validates its options, builds the
//! query with the configured defaults, issues a single GET and unwraps the
//! `{code, text, data}` envelope.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::FutarConfig;
use crate::error::FutarError;
use crate::models::ResponseEnvelope;
use crate::options::{
    AlertSearchOptions, ApiRequest, ArrivalsAndDeparturesOptions, BicycleRentalRequest,
    BuildRequest, CallContext, MetadataRequest, PlanTripOptions, RouteDetailsForStopOptions,
    RouteDetailsOptions, RouteOptions, ScheduleForStopOptions, SearchOptions, StopOptions,
    StopsForLocationOptions, TripDetailsOptions, VehiclesForRouteOptions, VehiclesForStopOptions,
};
use crate::params::RequestParams;

/// Trait for FUTÁR API clients
///
/// Every method resolves to the envelope's `data` payload, untouched.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait FutarApi: Send + Sync {
    /// Upcoming arrivals and departures at a stop
    async fn arrivals_and_departures_for_stop(
        &self,
        options: ArrivalsAndDeparturesOptions,
    ) -> Result<Value, FutarError>;

    /// Stops within a radius of a coordinate
    async fn stops_for_location(
        &self,
        options: StopsForLocationOptions,
    ) -> Result<Value, FutarError>;

    /// Timetable of a stop for one service day
    async fn schedule_for_stop(&self, options: ScheduleForStopOptions)
    -> Result<Value, FutarError>;

    /// Routes serving a stop
    async fn route_details_for_stop(
        &self,
        options: RouteDetailsForStopOptions,
    ) -> Result<Value, FutarError>;

    /// Vehicles approaching a stop
    async fn vehicles_for_stop(&self, options: VehiclesForStopOptions)
    -> Result<Value, FutarError>;

    /// A single stop
    async fn stop(&self, options: StopOptions) -> Result<Value, FutarError>;

    /// A single route
    async fn route(&self, options: RouteOptions) -> Result<Value, FutarError>;

    /// Variants, stops and geometry of a route
    async fn route_details(&self, options: RouteDetailsOptions) -> Result<Value, FutarError>;

    /// Vehicles currently running on a route
    async fn vehicles_for_route(
        &self,
        options: VehiclesForRouteOptions,
    ) -> Result<Value, FutarError>;

    /// Stop times and vehicle of a single trip
    async fn trip_details(&self, options: TripDetailsOptions) -> Result<Value, FutarError>;

    /// Free-text search over stops and routes
    async fn search(&self, options: SearchOptions) -> Result<Value, FutarError>;

    /// Service metadata (feed validity, bounds)
    async fn metadata(&self) -> Result<Value, FutarError>;

    /// Bicycle rental stations and availability
    async fn bicycle_rental(&self) -> Result<Value, FutarError>;

    /// Service alerts
    async fn alert_search(&self, options: AlertSearchOptions) -> Result<Value, FutarError>;

    /// Itineraries between two coordinates
    async fn plan_trip(&self, options: PlanTripOptions) -> Result<Value, FutarError>;

    /// Check if the FUTÁR service is reachable
    async fn is_healthy(&self) -> bool;
}

/// HTTP client for the FUTÁR API
#[derive(Debug)]
pub struct FutarClient {
    client: Client,
    config: FutarConfig,
    base_url: Url,
    tz: Tz,
}

impl FutarClient {
    /// Create a new FUTÁR client
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &FutarConfig) -> Result<Self, FutarError> {
        config.validate().map_err(FutarError::ConfigurationError)?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FutarError::ConfigurationError(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FutarError::ConfigurationError(format!(
                "base_url cannot carry a path: {base_url}"
            )));
        }

        let tz = config.tz().map_err(FutarError::ConfigurationError)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FutarError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            base_url,
            tz,
        })
    }

    /// Create a client with the default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_defaults() -> Result<Self, FutarError> {
        Self::new(&FutarConfig::default())
    }

    /// Create a shareable client wrapped in Arc
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be initialized.
    pub fn new_shared(config: &FutarConfig) -> Result<Arc<Self>, FutarError> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// The configuration this client was built with
    #[must_use]
    pub const fn config(&self) -> &FutarConfig {
        &self.config
    }

    /// Defaults applied to the next call
    fn context(&self) -> CallContext {
        CallContext {
            defaulting: self.config.defaulting,
            include_references: self.config.include_references,
            api_version: self.config.api_version,
            tz: self.tz,
            now: Utc::now(),
        }
    }

    /// Absolute URL of a request, with `.json` appended to the last segment
    fn endpoint_url(&self, request: &ApiRequest) -> Result<Url, FutarError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                FutarError::ConfigurationError("base_url cannot carry a path".to_string())
            })?;
            segments.pop_if_empty();
            if let Some((last, rest)) = request.segments.split_last() {
                segments.extend(rest);
                segments.push(&format!("{last}.json"));
            }
        }
        Ok(url)
    }

    /// Unwrap a parsed envelope into its payload
    fn unwrap_envelope(envelope: ResponseEnvelope) -> Result<Value, FutarError> {
        if envelope.is_ok() {
            return Ok(envelope.data);
        }

        warn!(code = envelope.code, text = %envelope.text, "FUTÁR reported an error");
        Err(FutarError::Upstream {
            code: envelope.code,
            text: envelope.text,
        })
    }

    /// Perform one GET against an endpoint and unwrap the envelope
    ///
    /// `endpoint` is relative to the base URL and without the `.json`
    /// suffix, e.g. `stops-for-location` or `stop/F01234`. No defaults are
    /// added to `params`.
    ///
    /// # Errors
    ///
    /// Returns [`FutarError::Upstream`] when the envelope code is not 200, or
    /// a transport/parse error when the call itself fails.
    pub async fn send_request(
        &self,
        endpoint: &str,
        params: &RequestParams,
    ) -> Result<Value, FutarError> {
        let request = ApiRequest {
            segments: endpoint
                .split('/')
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
            params: params.clone(),
        };
        self.dispatch(&request).await
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Value, FutarError> {
        let url = self.endpoint_url(request)?;

        debug!(%url, params = ?request.params, "Sending FUTÁR request");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(&request.params.to_query())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FutarError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    FutarError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FutarError::ParseError(e.to_string()))?;

        let envelope: ResponseEnvelope = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                FutarError::ParseError(e.to_string())
            } else {
                FutarError::ParseError(format!("HTTP {status}: {e}"))
            }
        })?;

        debug!(code = envelope.code, "FUTÁR response received");
        Self::unwrap_envelope(envelope)
    }

    async fn execute<R: BuildRequest + Sync>(&self, options: &R) -> Result<Value, FutarError> {
        let request = options.build(&self.context())?;
        self.dispatch(&request).await
    }
}

#[async_trait]
impl FutarApi for FutarClient {
    #[instrument(skip(self))]
    async fn arrivals_and_departures_for_stop(
        &self,
        options: ArrivalsAndDeparturesOptions,
    ) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn stops_for_location(
        &self,
        options: StopsForLocationOptions,
    ) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn schedule_for_stop(
        &self,
        options: ScheduleForStopOptions,
    ) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn route_details_for_stop(
        &self,
        options: RouteDetailsForStopOptions,
    ) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn vehicles_for_stop(
        &self,
        options: VehiclesForStopOptions,
    ) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn stop(&self, options: StopOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn route(&self, options: RouteOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn route_details(&self, options: RouteDetailsOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn vehicles_for_route(
        &self,
        options: VehiclesForRouteOptions,
    ) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn trip_details(&self, options: TripDetailsOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn search(&self, options: SearchOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn metadata(&self) -> Result<Value, FutarError> {
        self.execute(&MetadataRequest).await
    }

    #[instrument(skip(self))]
    async fn bicycle_rental(&self) -> Result<Value, FutarError> {
        self.execute(&BicycleRentalRequest).await
    }

    #[instrument(skip(self))]
    async fn alert_search(&self, options: AlertSearchOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    #[instrument(skip(self))]
    async fn plan_trip(&self, options: PlanTripOptions) -> Result<Value, FutarError> {
        self.execute(&options).await
    }

    async fn is_healthy(&self) -> bool {
        self.metadata().await.is_ok()
    }
}
