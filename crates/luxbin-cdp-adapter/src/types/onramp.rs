/*
[INPUT]:  Browser-facing onramp requests (camelCase)
[OUTPUT]: Validated CDP onramp requests (snake_case) and query strings
[POS]:    Data layer - onramp buy options / buy quote types
[UPDATE]: When CDP onramp request fields change
*/

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::http::{CdpError, Result};

/// Query for `GET /onramp/v1/buy/options`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyOptionsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    /// Comma-separated network names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<String>,
}

impl BuyOptionsQuery {
    /// Encoded query string, empty when no parameter is set
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in [
            ("country", &self.country),
            ("subdivision", &self.subdivision),
            ("networks", &self.networks),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                serializer.append_pair(name, value);
            }
        }
        serializer.finish()
    }
}

/// Buy quote request as sent by the browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyQuoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_network: Option<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
}

impl BuyQuoteRequest {
    /// Reject incomplete requests before anything is sent upstream.
    ///
    /// `subdivision` is required when `country` is `US`.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("purchaseCurrency", &self.purchase_currency),
            ("paymentAmount", &self.payment_amount),
            ("paymentCurrency", &self.payment_currency),
            ("paymentMethod", &self.payment_method),
            ("country", &self.country),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| is_blank(value))
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CdpError::InvalidRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let is_us = self
            .country
            .as_deref()
            .is_some_and(|country| country.trim().eq_ignore_ascii_case("US"));
        if is_us && is_blank(&self.subdivision) {
            return Err(CdpError::InvalidRequest(
                "subdivision is required when country is US".to_string(),
            ));
        }
        Ok(())
    }
}

/// Buy quote request in CDP's snake_case form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamBuyQuoteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
}

impl From<BuyQuoteRequest> for UpstreamBuyQuoteRequest {
    fn from(req: BuyQuoteRequest) -> Self {
        Self {
            purchase_currency: req.purchase_currency,
            purchase_network: req.purchase_network,
            payment_amount: req.payment_amount,
            payment_currency: req.payment_currency,
            payment_method: req.payment_method,
            country: req.country,
            subdivision: req.subdivision,
            destination_address: req.destination_address,
        }
    }
}

impl From<UpstreamBuyQuoteRequest> for BuyQuoteRequest {
    fn from(req: UpstreamBuyQuoteRequest) -> Self {
        Self {
            purchase_currency: req.purchase_currency,
            purchase_network: req.purchase_network,
            payment_amount: req.payment_amount,
            payment_currency: req.payment_currency,
            payment_method: req.payment_method,
            country: req.country,
            subdivision: req.subdivision,
            destination_address: req.destination_address,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}
