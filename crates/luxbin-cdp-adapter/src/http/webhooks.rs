/*
[INPUT]:  Webhook description, event types and target URL
[OUTPUT]: CDP webhook subscriptions (created or listed)
[POS]:    HTTP layer - webhook registration endpoints (require JWT auth)
[UPDATE]: When webhook endpoints or registration policy change
*/

use reqwest::Method;
use tracing::{info, warn};

use crate::http::{CdpClient, CdpError, Result};
use crate::types::{
    CreateWebhookSubscriptionRequest, Registration, WebhookEventType, WebhookSubscription,
    WebhookSubscriptionPage,
};

const SUBSCRIPTIONS_ENDPOINT: &str = "/platform/v2/data/webhooks/subscriptions";
const MAX_PAGES: usize = 50;

impl CdpClient {
    /// Create a webhook subscription
    ///
    /// POST /platform/v2/data/webhooks/subscriptions
    ///
    /// CDP does not deduplicate: two calls for the same target create two live
    /// subscriptions with two different secrets. The returned secret cannot be
    /// fetched again.
    ///
    /// The creation response is only guaranteed to carry `subscriptionId` and
    /// `secret`; fields it omits are filled in from the request.
    pub async fn register_webhook(
        &self,
        description: &str,
        event_types: &[WebhookEventType],
        target_url: &str,
    ) -> Result<WebhookSubscription> {
        let req = CreateWebhookSubscriptionRequest::new(description, event_types, target_url);
        let mut subscription: WebhookSubscription = self
            .send_json(Method::POST, SUBSCRIPTIONS_ENDPOINT, Some(&req))
            .await?;
        subscription.fill_from_request(&req);

        if subscription.secret.is_none() {
            warn!(
                subscription_id = subscription.id(),
                "CDP created a subscription without returning its secret"
            );
        }
        info!(
            subscription_id = subscription.id(),
            target_url,
            "webhook subscription created"
        );
        Ok(subscription)
    }

    /// List all webhook subscriptions, following page tokens
    ///
    /// A listing that has not ended after `MAX_PAGES` pages is an error,
    /// never a truncated result.
    ///
    /// GET /platform/v2/data/webhooks/subscriptions?pageToken={token}
    pub async fn list_webhook_subscriptions(&self) -> Result<Vec<WebhookSubscription>> {
        let mut subscriptions = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let endpoint = match &page_token {
                Some(token) => {
                    let query = url::form_urlencoded::Serializer::new(String::new())
                        .append_pair("pageToken", token)
                        .finish();
                    format!("{SUBSCRIPTIONS_ENDPOINT}?{query}")
                }
                None => SUBSCRIPTIONS_ENDPOINT.to_string(),
            };

            let page: WebhookSubscriptionPage =
                self.send_json::<_, ()>(Method::GET, &endpoint, None).await?;
            subscriptions.extend(page.subscriptions);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(subscriptions),
            }
        }

        warn!(
            pages = MAX_PAGES,
            fetched = subscriptions.len(),
            "webhook subscription listing did not end within page limit"
        );
        Err(CdpError::InvalidResponse(format!(
            "webhook subscription listing still had a next page after {MAX_PAGES} pages"
        )))
    }

    /// Find the first subscription pointing at `target_url`
    pub async fn find_webhook_by_target(
        &self,
        target_url: &str,
    ) -> Result<Option<WebhookSubscription>> {
        let subscriptions = self.list_webhook_subscriptions().await?;
        Ok(subscriptions.into_iter().find(|sub| sub.targets(target_url)))
    }

    /// List-then-create: only registers when no subscription targets the URL.
    ///
    /// The check and the create are separate calls, so two concurrent callers
    /// can still both create.
    pub async fn register_webhook_if_absent(
        &self,
        description: &str,
        event_types: &[WebhookEventType],
        target_url: &str,
    ) -> Result<Registration> {
        if let Some(existing) = self.find_webhook_by_target(target_url).await? {
            info!(
                subscription_id = existing.id(),
                target_url,
                "webhook subscription already exists"
            );
            return Ok(Registration::Existing(existing));
        }
        self.register_webhook(description, event_types, target_url)
            .await
            .map(Registration::Created)
    }
}
