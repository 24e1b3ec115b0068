use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Payments;
use crate::payments::{
    PaymentError, PaymentResult,
    event::{PurchaseKind, WebhookEvent, construct_event},
};

/// Everything needed to open a hosted checkout page for a single item.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub kind: PurchaseKind,
    pub item_id: Uuid,
    pub title: String,
    pub amount_cents: i64,
    pub customer_email: String,
    pub user_id: Option<Uuid>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync + std::fmt::Debug {
    async fn create_checkout_session(&self, request: CheckoutRequest)
    -> PaymentResult<CheckoutSession>;

    /// Verifies the signature of a raw webhook body and parses it.
    fn construct_event(&self, payload: &[u8], signature_header: &str) -> PaymentResult<WebhookEvent>;
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
    webhook_secret: String,
    currency: String,
    webhook_tolerance_secs: i64,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl StripeClient {
    pub fn from_config(config: &Payments) -> PaymentResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base().to_string(),
            secret_key: config.secret_key().to_string(),
            webhook_secret: config.webhook_secret().to_string(),
            currency: config.currency().to_string(),
            webhook_tolerance_secs: config.webhook_tolerance_secs(),
        })
    }

    /// Form fields of a one line item, payment mode session.
    fn session_form(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("mode", String::from("payment")),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("customer_email", request.customer_email.clone()),
            ("line_items[0][quantity]", String::from("1")),
            ("line_items[0][price_data][currency]", self.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                request.amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                request.title.clone(),
            ),
            ("metadata[kind]", request.kind.to_string()),
            ("metadata[item_id]", request.item_id.to_string()),
        ];

        if let Some(user_id) = request.user_id {
            form.push(("metadata[user_id]", user_id.to_string()));
        }

        form
    }
}

#[async_trait::async_trait]
impl PaymentProvider for StripeClient {
    #[tracing::instrument(skip(self, request), fields(kind = %request.kind, item_id = %request.item_id))]
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> PaymentResult<CheckoutSession> {
        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&self.session_form(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| String::from("unknown provider error"));
            return Err(PaymentError::ProviderError {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        let url = session.url.ok_or_else(|| PaymentError::ProviderError {
            status: status.as_u16(),
            message: format!("session {} has no redirect url", session.id),
        })?;

        tracing::debug!(session_id = %session.id, "checkout session created");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    fn construct_event(&self, payload: &[u8], signature_header: &str) -> PaymentResult<WebhookEvent> {
        construct_event(
            payload,
            signature_header,
            &self.webhook_secret,
            self.webhook_tolerance_secs,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Config;

    fn client() -> StripeClient {
        let config = Config::from_toml(
            r#"
            [host]
            bindto = "127.0.0.1:0"
            [app]
            jwt = "j"
            database_uri = "postgres://localhost/db"
            admin_email = "admin@example.com"
            impersonation_secret = "imp"
            public_url = "http://localhost:3000"
            [payments]
            secret_key = "sk_test"
            webhook_secret = "whsec"
            currency = "eur"
            "#,
        )
        .unwrap();
        StripeClient::from_config(config.payments()).unwrap()
    }

    fn request(user_id: Option<Uuid>) -> CheckoutRequest {
        CheckoutRequest {
            kind: PurchaseKind::Course,
            item_id: Uuid::nil(),
            title: String::from("Rust 101"),
            amount_cents: 4900,
            customer_email: String::from("buyer@example.com"),
            user_id,
            success_url: String::from("http://localhost:3000/dashboard"),
            cancel_url: String::from("http://localhost:3000/courses/rust-101"),
        }
    }

    fn field<'a>(form: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn session_form_test() {
        let user = Uuid::new_v4();
        let form = client().session_form(&request(Some(user)));

        assert_eq!(field(&form, "mode"), Some("payment"));
        assert_eq!(field(&form, "line_items[0][price_data][currency]"), Some("eur"));
        assert_eq!(field(&form, "line_items[0][price_data][unit_amount]"), Some("4900"));
        assert_eq!(field(&form, "metadata[kind]"), Some("course"));
        assert_eq!(
            field(&form, "metadata[item_id]"),
            Some("00000000-0000-0000-0000-000000000000")
        );
        assert_eq!(field(&form, "metadata[user_id]"), Some(user.to_string().as_str()));
    }

    #[test]
    fn guest_session_form_test() {
        let form = client().session_form(&request(None));
        assert_eq!(field(&form, "metadata[user_id]"), None);
        assert_eq!(field(&form, "customer_email"), Some("buyer@example.com"));
    }
}
