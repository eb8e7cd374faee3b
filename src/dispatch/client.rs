use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{DispatchError, DocumentDispatcher, DocumentFields, SessionGrant};
use crate::config::DispatcherConfig;
use crate::model::DocumentKind;
use crate::observability::LifecycleMetrics;

/// Rate-limited client for the document & notification service.
///
/// Requests are never retried; a failure is returned to the caller as is.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: reqwest::Client,
    base_url: String,
    public_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    lookup_cache: Cache<String, String>,
    metrics: Arc<LifecycleMetrics>,
}

/// Envelope every endpoint answers with
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ServiceResponse {
    success: bool,
    url: Option<String>,
    case_id: Option<String>,
    token: Option<String>,
    user_id: Option<String>,
    role: Option<String>,
    partner_ref: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    case_id: &'a str,
    email: &'a str,
    signing_link: String,
    #[serde(flatten)]
    fields: &'a DocumentFields,
}

impl HttpDispatcher {
    pub fn new(settings: &DispatcherConfig) -> Result<Self, DispatchError> {
        let per_minute = NonZeroU32::new(settings.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        // Found case ids change rarely; keep them for five minutes
        let lookup_cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            public_url: settings.public_url.trim_end_matches('/').to_string(),
            rate_limiter,
            lookup_cache,
            metrics: Arc::new(LifecycleMetrics::new()),
        })
    }

    /// Count requests into a metrics set shared with the engine
    pub fn with_metrics(mut self, metrics: Arc<LifecycleMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ServiceResponse, DispatchError> {
        self.rate_limiter.until_ready().await;
        self.metrics.record_dispatch();

        let url = self.endpoint(path);
        debug!(%url, "Calling document service");
        let response = self.http.post(&url).json(body).send().await.inspect_err(|_| {
            self.metrics.record_dispatch_error();
        })?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: Option<ServiceResponse> = serde_json::from_str(&text).ok();
        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.message)
                .unwrap_or_else(|| text.trim().to_string());
            self.metrics.record_dispatch_error();
            warn!(%url, status = status.as_u16(), "Document service request failed");
            return Err(DispatchError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: ServiceResponse = match parsed {
            Some(body) => body,
            None => serde_json::from_str(&text)?,
        };
        if !body.success {
            self.metrics.record_dispatch_error();
            return Err(DispatchError::Service {
                status: status.as_u16(),
                message: body
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            });
        }
        Ok(body)
    }
}

fn missing_in_response(what: &str) -> DispatchError {
    DispatchError::Service {
        status: 200,
        message: format!("response did not include {what}"),
    }
}

#[async_trait]
impl DocumentDispatcher for HttpDispatcher {
    async fn generate_and_send(
        &self,
        kind: DocumentKind,
        case_id: &str,
        email: &str,
        fields: &DocumentFields,
    ) -> Result<String, DispatchError> {
        fields.validate(kind)?;

        let request = GenerateRequest {
            case_id,
            email,
            signing_link: kind.signing_link(&self.public_url, case_id),
            fields,
        };
        let path = match kind {
            DocumentKind::Consent => "generate-consent",
            DocumentKind::Contract => "generate-contract",
        };

        let response = self.post(path, &request).await?;
        let url = response.url.ok_or_else(|| missing_in_response("a document url"))?;
        info!(%case_id, kind = kind.as_str(), "Document generated and sent");
        Ok(url)
    }

    async fn send_document(&self, url: &str, email: &str) -> Result<(), DispatchError> {
        self.post(
            "send-document",
            &serde_json::json!({ "url": url, "email": email }),
        )
        .await?;
        info!(%email, "Document resent");
        Ok(())
    }

    async fn lookup_case_id(&self, email: &str) -> Result<Option<String>, DispatchError> {
        let email = email.trim().to_lowercase();
        if let Some(cached) = self.lookup_cache.get(&email).await {
            debug!("Cache hit for lookup: {}", email);
            return Ok(Some(cached));
        }

        let case_id = match self
            .post("lookup-case", &serde_json::json!({ "email": email }))
            .await
        {
            Ok(response) => response.case_id,
            Err(DispatchError::Service { status: 404, .. }) => None,
            Err(e) => return Err(e),
        };

        // A miss is not cached so a newly registered claimant shows up at once
        if let Some(case_id) = &case_id {
            self.lookup_cache.insert(email, case_id.clone()).await;
        }
        Ok(case_id)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionGrant, DispatchError> {
        let response = self
            .post(
                "sign-in",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        Ok(SessionGrant {
            user_id: response.user_id.ok_or_else(|| missing_in_response("a user id"))?,
            token: response.token.ok_or_else(|| missing_in_response("a session token"))?,
            role: response.role.ok_or_else(|| missing_in_response("a role"))?,
            partner_ref: response.partner_ref,
        })
    }
}
