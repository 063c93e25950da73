/*
[INPUT]:  CDP webhook subscription schema
[OUTPUT]: Typed webhook event kinds, subscription requests and responses
[POS]:    Data layer - webhook subscription types
[UPDATE]: When CDP adds event types or subscription fields
*/

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Onramp/offramp transaction events a subscription can receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "onramp.transaction.created")]
    OnrampCreated,
    #[serde(rename = "onramp.transaction.updated")]
    OnrampUpdated,
    #[serde(rename = "onramp.transaction.success")]
    OnrampSuccess,
    #[serde(rename = "onramp.transaction.failed")]
    OnrampFailed,
    #[serde(rename = "offramp.transaction.created")]
    OfframpCreated,
    #[serde(rename = "offramp.transaction.updated")]
    OfframpUpdated,
    #[serde(rename = "offramp.transaction.success")]
    OfframpSuccess,
    #[serde(rename = "offramp.transaction.failed")]
    OfframpFailed,
}

impl WebhookEventType {
    pub const ALL: [WebhookEventType; 8] = [
        WebhookEventType::OnrampCreated,
        WebhookEventType::OnrampUpdated,
        WebhookEventType::OnrampSuccess,
        WebhookEventType::OnrampFailed,
        WebhookEventType::OfframpCreated,
        WebhookEventType::OfframpUpdated,
        WebhookEventType::OfframpSuccess,
        WebhookEventType::OfframpFailed,
    ];

    /// created/success/failed for both directions
    pub fn defaults() -> Vec<WebhookEventType> {
        Self::ALL
            .into_iter()
            .filter(|kind| !matches!(kind, Self::OnrampUpdated | Self::OfframpUpdated))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventType::OnrampCreated => "onramp.transaction.created",
            WebhookEventType::OnrampUpdated => "onramp.transaction.updated",
            WebhookEventType::OnrampSuccess => "onramp.transaction.success",
            WebhookEventType::OnrampFailed => "onramp.transaction.failed",
            WebhookEventType::OfframpCreated => "offramp.transaction.created",
            WebhookEventType::OfframpUpdated => "offramp.transaction.updated",
            WebhookEventType::OfframpSuccess => "offramp.transaction.success",
            WebhookEventType::OfframpFailed => "offramp.transaction.failed",
        }
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown webhook event type: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookTarget {
    pub url: String,
}

/// Body of `POST /platform/v2/data/webhooks/subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookSubscriptionRequest {
    pub description: String,
    pub event_types: Vec<String>,
    pub target: WebhookTarget,
    pub labels: BTreeMap<String, String>,
    pub is_enabled: bool,
}

impl CreateWebhookSubscriptionRequest {
    pub fn new(description: &str, event_types: &[WebhookEventType], target_url: &str) -> Self {
        Self {
            description: description.to_string(),
            event_types: event_types.iter().map(|kind| kind.as_str().to_string()).collect(),
            target: WebhookTarget {
                url: target_url.to_string(),
            },
            labels: BTreeMap::new(),
            is_enabled: true,
        }
    }
}

/// A subscription as returned by CDP.
///
/// `secret` is only present in the creation response. Only the id is
/// required so a sparse creation response still yields its secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSubscription {
    #[serde(alias = "id")]
    pub subscription_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub event_types: Vec<String>,
    #[serde(default)]
    pub target: WebhookTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl WebhookSubscription {
    pub fn id(&self) -> &str {
        &self.subscription_id
    }

    pub fn target_url(&self) -> &str {
        &self.target.url
    }

    /// Complete fields the creation response left out with what was sent
    pub fn fill_from_request(&mut self, req: &CreateWebhookSubscriptionRequest) {
        if self.description.is_none() {
            self.description = Some(req.description.clone());
        }
        if self.event_types.is_empty() {
            self.event_types = req.event_types.clone();
        }
        if self.target.url.is_empty() {
            self.target = req.target.clone();
        }
        if self.labels.is_empty() {
            self.labels = req.labels.clone();
        }
    }

    /// Same target, ignoring a trailing slash
    pub fn targets(&self, url: &str) -> bool {
        !self.target.url.is_empty()
            && self.target.url.trim_end_matches('/') == url.trim_end_matches('/')
    }
}

impl fmt::Debug for WebhookSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSubscription")
            .field("subscription_id", &self.subscription_id)
            .field("description", &self.description)
            .field("event_types", &self.event_types)
            .field("target", &self.target)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("is_enabled", &self.is_enabled)
            .finish()
    }
}

fn default_enabled() -> bool {
    true
}

/// One page of `GET /platform/v2/data/webhooks/subscriptions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSubscriptionPage {
    #[serde(default)]
    pub subscriptions: Vec<WebhookSubscription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Outcome of an idempotent registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new subscription was created; its secret must be stored now
    Created(WebhookSubscription),
    /// A subscription for the target already existed
    Existing(WebhookSubscription),
}

impl Registration {
    pub fn subscription(&self) -> &WebhookSubscription {
        match self {
            Registration::Created(sub) | Registration::Existing(sub) => sub,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}
