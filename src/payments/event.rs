use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payments::{PaymentError, PaymentResult, signature};

pub static CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKind {
    Course,
    Product,
}

impl std::fmt::Display for PurchaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Course => write!(f, "course"),
            Self::Product => write!(f, "product"),
        }
    }
}

impl std::str::FromStr for PurchaseKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "course" => Ok(Self::Course),
            "product" => Ok(Self::Product),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

/// The parts of a checkout session object fulfillment cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub amount_total: Option<i64>,
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// What a completed checkout session bought and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseTarget {
    pub kind: PurchaseKind,
    pub item_id: Uuid,
    pub user_id: Option<Uuid>,
}

impl WebhookEvent {
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_SESSION_COMPLETED
    }

    pub fn checkout_session(&self) -> PaymentResult<CheckoutSessionObject> {
        Ok(serde_json::from_value(self.data.object.clone())?)
    }
}

impl CheckoutSessionObject {
    /// Email the buyer typed at checkout, falling back to the prefilled one.
    pub fn email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|details| details.email.as_deref())
            .or(self.customer_email.as_deref())
            .filter(|email| !email.trim().is_empty())
    }

    /// Sessions paid with delayed methods complete before the money arrives.
    pub fn is_unpaid(&self) -> bool {
        self.payment_status.as_deref() == Some("unpaid")
    }

    pub fn target(&self) -> PaymentResult<PurchaseTarget> {
        let invalid = |reason: &str| PaymentError::InvalidMetadata {
            session_id: self.id.clone(),
            reason: reason.to_string(),
        };

        let kind = self
            .metadata
            .get("kind")
            .ok_or_else(|| invalid("missing `kind`"))?
            .parse::<PurchaseKind>()
            .map_err(|_| invalid("unknown `kind`"))?;

        let item_id = self
            .metadata
            .get("item_id")
            .ok_or_else(|| invalid("missing `item_id`"))?
            .parse::<Uuid>()
            .map_err(|_| invalid("`item_id` is not a uuid"))?;

        let user_id = match self.metadata.get("user_id").map(|s| s.trim()) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Uuid>()
                    .map_err(|_| invalid("`user_id` is not a uuid"))?,
            ),
        };

        Ok(PurchaseTarget {
            kind,
            item_id,
            user_id,
        })
    }
}

/// Verifies the signature header and parses the event.
pub fn construct_event(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    tolerance_secs: i64,
) -> PaymentResult<WebhookEvent> {
    let now = chrono::Utc::now().timestamp();
    signature::verify_signature(secret, payload, signature_header, tolerance_secs, now)?;
    Ok(serde_json::from_slice(payload)?)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn session(metadata: serde_json::Value) -> CheckoutSessionObject {
        serde_json::from_value(json!({
            "id": "cs_test_1",
            "customer_email": "prefill@example.com",
            "customer_details": { "email": "typed@example.com" },
            "amount_total": 4900,
            "payment_status": "paid",
            "metadata": metadata,
        }))
        .unwrap()
    }

    #[test]
    fn target_test() {
        let item = Uuid::new_v4();
        let user = Uuid::new_v4();
        let target = session(json!({
            "kind": "course",
            "item_id": item.to_string(),
            "user_id": user.to_string(),
        }))
        .target()
        .unwrap();

        assert_eq!(
            target,
            PurchaseTarget {
                kind: PurchaseKind::Course,
                item_id: item,
                user_id: Some(user),
            }
        );
    }

    #[test]
    fn guest_target_test() {
        let target = session(json!({ "kind": "product", "item_id": Uuid::new_v4().to_string(), "user_id": "" }))
            .target()
            .unwrap();
        assert_eq!(target.kind, PurchaseKind::Product);
        assert_eq!(target.user_id, None);
    }

    #[test]
    fn invalid_metadata_test() {
        for metadata in [
            json!({}),
            json!({ "kind": "bundle", "item_id": Uuid::new_v4().to_string() }),
            json!({ "kind": "course", "item_id": "42" }),
            json!({ "kind": "course", "item_id": Uuid::new_v4().to_string(), "user_id": "me" }),
        ] {
            assert!(matches!(
                session(metadata).target(),
                Err(PaymentError::InvalidMetadata { .. })
            ));
        }
    }

    #[test]
    fn email_prefers_customer_details_test() {
        let mut s = session(json!({}));
        assert_eq!(s.email(), Some("typed@example.com"));

        s.customer_details = None;
        assert_eq!(s.email(), Some("prefill@example.com"));

        s.customer_email = Some(String::from("  "));
        assert_eq!(s.email(), None);
    }

    #[test]
    fn construct_event_test() {
        let payload = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_test_1" } },
        })
        .to_string();
        let now = chrono::Utc::now().timestamp();
        let header = signature::signature_header("whsec", now, payload.as_bytes());

        let event = construct_event(payload.as_bytes(), &header, "whsec", 300).unwrap();
        assert!(event.is_checkout_completed());
        assert_eq!(event.checkout_session().unwrap().id, "cs_test_1");

        assert!(construct_event(payload.as_bytes(), &header, "other", 300).is_err());
    }
}
