//! Stripe REST client for Checkout Sessions.
//!
//! Stripe takes `application/x-www-form-urlencoded` bodies with nested
//! fields flattened into bracket keys (`line_items[0][quantity]=2`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{CreatedSession, PaymentError, PaymentGateway, SessionRequest};
use crate::config::StripeApiConfig;

/// Typed client for `POST /v1/checkout/sessions`.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: Client,
    api_base: Url,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl StripeClient {
    /// Build a client with the configured request timeout.
    pub fn new(config: &StripeApiConfig) -> Result<Self, PaymentError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
        })
    }
}

/// Resolve the sessions endpoint below `api_base`, keeping any path prefix
/// whether or not it ends in a slash.
fn sessions_endpoint(api_base: &Url) -> Result<Url, url::ParseError> {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    base.join("v1/checkout/sessions")
}

/// Flatten a session request into Stripe's bracketed form fields.
pub(crate) fn session_form(request: &SessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.to_string()),
        ("cancel_url".to_string(), request.cancel_url.to_string()),
        ("billing_address_collection".to_string(), "auto".to_string()),
        ("customer_email".to_string(), request.customer_email.clone()),
    ];

    for (i, method) in request.payment_method_types.iter().enumerate() {
        form.push((format!("payment_method_types[{i}]"), method.clone()));
    }

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(image) = &item.image {
            form.push((
                format!("{prefix}[price_data][product_data][images][0]"),
                image.clone(),
            ));
        }
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeClient {
    #[tracing::instrument(skip_all, err, name = "Stripe:CreateCheckoutSession")]
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, PaymentError> {
        let url = sessions_endpoint(&self.api_base)?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.secret_key)
            .form(&session_form(request))
            .send()
            .await?;

        parse_response(resp).await
    }
}

async fn parse_response(resp: reqwest::Response) -> Result<CreatedSession, PaymentError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let message = match serde_json::from_slice::<ApiErrorBody>(&bytes) {
            Ok(body) => body
                .error
                .message
                .or(body.error.kind)
                .unwrap_or_else(|| "unknown error".to_string()),
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        return Err(PaymentError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::LineItem;
    use std::collections::BTreeMap;

    fn lookup<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_session_form_fields() {
        let mut metadata = BTreeMap::new();
        metadata.insert("customer_name".to_string(), "Asha".to_string());
        let request = SessionRequest {
            line_items: vec![
                LineItem {
                    name: "Pizza".to_string(),
                    image: Some("https://img/pizza.png".to_string()),
                    unit_amount: 1000,
                    quantity: 2,
                },
                LineItem {
                    name: "Lassi".to_string(),
                    image: None,
                    unit_amount: 250,
                    quantity: 1,
                },
            ],
            currency: "inr".to_string(),
            customer_email: "a@b.com".to_string(),
            success_url: Url::parse("http://localhost:3000/success").unwrap(),
            cancel_url: Url::parse("http://localhost:3000/cancel").unwrap(),
            payment_method_types: vec!["card".to_string()],
            metadata,
        };

        let form = session_form(&request);
        assert_eq!(lookup(&form, "mode"), Some("payment"));
        assert_eq!(lookup(&form, "billing_address_collection"), Some("auto"));
        assert_eq!(lookup(&form, "customer_email"), Some("a@b.com"));
        assert_eq!(
            lookup(&form, "success_url"),
            Some("http://localhost:3000/success")
        );
        assert_eq!(lookup(&form, "payment_method_types[0]"), Some("card"));
        assert_eq!(
            lookup(&form, "line_items[0][price_data][currency]"),
            Some("inr")
        );
        assert_eq!(
            lookup(&form, "line_items[0][price_data][product_data][images][0]"),
            Some("https://img/pizza.png")
        );
        assert_eq!(
            lookup(&form, "line_items[0][price_data][unit_amount]"),
            Some("1000")
        );
        assert_eq!(lookup(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            lookup(&form, "line_items[1][price_data][product_data][name]"),
            Some("Lassi")
        );
        assert_eq!(
            lookup(&form, "line_items[1][price_data][product_data][images][0]"),
            None
        );
        assert_eq!(lookup(&form, "metadata[customer_name]"), Some("Asha"));
        assert_eq!(lookup(&form, "metadata[customer_address]"), None);
    }

    #[test]
    fn test_sessions_endpoint_keeps_base_path() {
        let endpoint = |base: &str| {
            sessions_endpoint(&Url::parse(base).unwrap())
                .unwrap()
                .to_string()
        };
        assert_eq!(
            endpoint("https://api.stripe.com"),
            "https://api.stripe.com/v1/checkout/sessions"
        );
        assert_eq!(
            endpoint("http://mock/stripe/"),
            "http://mock/stripe/v1/checkout/sessions"
        );
        assert_eq!(
            endpoint("http://mock/stripe"),
            "http://mock/stripe/v1/checkout/sessions"
        );
    }
}
