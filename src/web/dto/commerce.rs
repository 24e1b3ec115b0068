use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::payments::{FulfillmentOutcome, PurchaseKind};

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct CheckoutBody {
    pub kind: PurchaseKind,
    pub item_id: Uuid,
    /// Required for guests, ignored for signed-in learners
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(flatten)]
    pub outcome: FulfillmentOutcome,
}

impl From<FulfillmentOutcome> for WebhookAck {
    fn from(outcome: FulfillmentOutcome) -> Self {
        Self {
            received: true,
            outcome,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn webhook_ack_shape_test() {
        let id = Uuid::new_v4();
        let ack = WebhookAck::from(FulfillmentOutcome::Recorded { purchase_id: id });
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            serde_json::json!({"received": true, "outcome": "recorded", "purchase_id": id})
        );

        let ack = WebhookAck::from(FulfillmentOutcome::Duplicate);
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            serde_json::json!({"received": true, "outcome": "duplicate"})
        );
    }

    #[test]
    fn checkout_body_email_test() {
        let body: CheckoutBody = serde_json::from_value(serde_json::json!({
            "kind": "course",
            "item_id": Uuid::nil(),
            "email": "not-an-email",
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }
}
