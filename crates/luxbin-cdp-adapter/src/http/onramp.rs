/*
[INPUT]:  Browser-facing onramp queries and quote requests
[OUTPUT]: CDP buy options and buy quotes with camelCase keys
[POS]:    HTTP layer - onramp endpoints (require JWT auth)
[UPDATE]: When adding onramp endpoints or changing field conversion
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{CdpClient, Result};
use crate::types::{BuyOptionsQuery, BuyQuoteRequest, UpstreamBuyQuoteRequest, camelize_keys};

const BUY_OPTIONS_ENDPOINT: &str = "/onramp/v1/buy/options";
const BUY_QUOTE_ENDPOINT: &str = "/onramp/v1/buy/quote";

impl CdpClient {
    /// Supported currencies and payment methods for a region
    ///
    /// GET /onramp/v1/buy/options?country={country}&subdivision={subdivision}&networks={networks}
    pub async fn get_buy_options(&self, query: &BuyOptionsQuery) -> Result<Value> {
        let query = query.to_query_string();
        let endpoint = if query.is_empty() {
            BUY_OPTIONS_ENDPOINT.to_string()
        } else {
            format!("{BUY_OPTIONS_ENDPOINT}?{query}")
        };

        let response = self.send(Method::GET, &endpoint, None).await?;
        Ok(camelize_keys(response))
    }

    /// Price quote for a purchase
    ///
    /// POST /onramp/v1/buy/quote
    /// Incomplete requests fail with `CdpError::InvalidRequest` and are never sent.
    pub async fn create_buy_quote(&self, req: &BuyQuoteRequest) -> Result<Value> {
        req.validate()?;
        let body = UpstreamBuyQuoteRequest::from(req.clone());
        let response: Value = self
            .send_json(Method::POST, BUY_QUOTE_ENDPOINT, Some(&body))
            .await?;
        Ok(camelize_keys(response))
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::KeyMaterial;
    use crate::http::{CdpClient, CdpError, ClientConfig};
    use crate::types::{BuyOptionsQuery, BuyQuoteRequest};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use p256::SecretKey;
    use rand::rngs::OsRng;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> CdpClient {
        let der = SecretKey::random(&mut OsRng).to_sec1_der().unwrap();
        let key = KeyMaterial::from_secret("key-1", &STANDARD.encode(der.as_slice())).unwrap();
        CdpClient::with_config_and_base_url(key, ClientConfig::default(), &server.uri())
            .expect("client init")
    }

    #[tokio::test]
    async fn test_get_buy_options_camelizes_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/onramp/v1/buy/options"))
            .and(query_param("country", "US"))
            .and(query_param("subdivision", "NY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "payment_currencies": [{"id": "USD", "limits": [{"id": "CARD", "min": "2"}]}],
                "purchase_currencies": [{"symbol": "USDC", "networks": [{"name": "base", "chain_id": "8453"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let query = BuyOptionsQuery {
            country: Some("US".into()),
            subdivision: Some("NY".into()),
            networks: None,
        };
        let options = client.get_buy_options(&query).await.expect("get_buy_options failed");

        assert_eq!(options["paymentCurrencies"][0]["id"], json!("USD"));
        assert_eq!(
            options["purchaseCurrencies"][0]["networks"][0]["chainId"],
            json!("8453")
        );
    }

    #[tokio::test]
    async fn test_create_buy_quote_sends_snake_case() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/onramp/v1/buy/quote"))
            .and(body_json(json!({
                "purchase_currency": "USDC",
                "purchase_network": "base",
                "payment_amount": "50",
                "payment_currency": "USD",
                "payment_method": "CARD",
                "country": "DE"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "quote_id": "q-123",
                "purchase_amount": {"value": "49.1", "currency": "USDC"},
                "coinbase_fee": {"value": "0.9", "currency": "USD"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let req: BuyQuoteRequest = serde_json::from_value(json!({
            "purchaseCurrency": "USDC",
            "purchaseNetwork": "base",
            "paymentAmount": 50,
            "paymentCurrency": "USD",
            "paymentMethod": "CARD",
            "country": "DE"
        }))
        .unwrap();
        let quote = client.create_buy_quote(&req).await.expect("create_buy_quote failed");

        assert_eq!(quote["quoteId"], json!("q-123"));
        assert_eq!(quote["coinbaseFee"]["value"], json!("0.9"));
    }

    #[tokio::test]
    async fn test_invalid_quote_is_never_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let req = BuyQuoteRequest {
            purchase_currency: Some("ETH".into()),
            ..Default::default()
        };
        let result = client.create_buy_quote(&req).await;
        assert!(matches!(result, Err(CdpError::InvalidRequest(_))));
    }
}
