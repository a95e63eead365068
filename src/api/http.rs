use url::Url;

use crate::cancel::CallContext;
use crate::config::{ApiSettings, ConfigError};
use crate::http_client;

use super::envelope::{decode_ack, decode_data};
use super::{
    Analytics, AnalysisReport, ApiError, DashboardBackend, DocumentSummary, Endpoint,
    HealthReport, Notification, Overview, TimelineEvent,
};

const MAX_ERROR_BODY_BYTES: usize = 16 * 1024;

/// [`DashboardBackend`] over HTTP using the shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base: Url,
    max_response_bytes: usize,
}

impl HttpBackend {
    pub fn new(settings: &ApiSettings) -> Result<Self, ConfigError> {
        Ok(Self::with_base_url(
            settings.parsed_base_url()?,
            settings.max_response_bytes,
        ))
    }

    pub fn with_base_url(base: Url, max_response_bytes: usize) -> Self {
        Self {
            base,
            max_response_bytes,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn url_for(&self, endpoint: &Endpoint) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base.to_string()))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    fn call(&self, endpoint: &Endpoint, ctx: &CallContext) -> Result<String, ApiError> {
        if ctx.cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let url = self.url_for(endpoint)?;
        tracing::debug!("Requesting {endpoint}");
        let request = http_client::agent()
            .request(endpoint.method(), url.as_str())
            .set("Accept", "application/json")
            .timeout(ctx.timeout);
        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = http_client::read_body_limited(response, MAX_ERROR_BODY_BYTES)
                    .unwrap_or_else(|err| err);
                return Err(ApiError::Status { code, body });
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(ApiError::Transport(err.to_string()));
            }
        };
        http_client::read_body_limited(response, self.max_response_bytes)
            .map_err(ApiError::Transport)
    }
}

impl DashboardBackend for HttpBackend {
    fn health(&self, ctx: &CallContext) -> Result<HealthReport, ApiError> {
        let body = self.call(&Endpoint::Health, ctx)?;
        Ok(parse_health(&body))
    }

    fn overview(&self, ctx: &CallContext) -> Result<Option<Overview>, ApiError> {
        decode_data(&self.call(&Endpoint::Overview, ctx)?)
    }

    fn documents(&self, ctx: &CallContext) -> Result<Vec<DocumentSummary>, ApiError> {
        decode_data(&self.call(&Endpoint::Documents, ctx)?).map(Option::unwrap_or_default)
    }

    fn notifications(&self, ctx: &CallContext) -> Result<Vec<Notification>, ApiError> {
        decode_data(&self.call(&Endpoint::Notifications, ctx)?).map(Option::unwrap_or_default)
    }

    fn timeline(&self, ctx: &CallContext) -> Result<Vec<TimelineEvent>, ApiError> {
        decode_data(&self.call(&Endpoint::Timeline, ctx)?).map(Option::unwrap_or_default)
    }

    fn analytics(&self, ctx: &CallContext) -> Result<Option<Analytics>, ApiError> {
        decode_data(&self.call(&Endpoint::Analytics, ctx)?)
    }

    fn mark_notification_read(&self, id: &str, ctx: &CallContext) -> Result<(), ApiError> {
        decode_ack(&self.call(&Endpoint::MarkRead(id.to_string()), ctx)?)
    }

    fn analyze_document(
        &self,
        document_id: &str,
        ctx: &CallContext,
    ) -> Result<AnalysisReport, ApiError> {
        let body = self.call(&Endpoint::Analyze(document_id.to_string()), ctx)?;
        decode_data(&body).map(Option::unwrap_or_default)
    }

    fn refresh_analytics(&self, ctx: &CallContext) -> Result<Option<Analytics>, ApiError> {
        decode_data(&self.call(&Endpoint::RefreshAnalytics, ctx)?)
    }
}

/// The probe only needs a 2xx; a body that is not the usual JSON is tolerated.
fn parse_health(body: &str) -> HealthReport {
    match serde_json::from_str::<HealthReport>(body.trim()) {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!("Health probe returned an unparseable body: {err}");
            HealthReport::default()
        }
    }
}
