//! Mock payment gateway.
//!
//! Stands in for a hosted checkout. Orders and refunds get random ids, and a
//! payment is proven by `hex(HMAC-SHA256(secret, "<order_id>|<payment_id>"))`,
//! the same shape a real processor's webhook signature takes.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use marquee_auth::secret::random_hex;

use crate::domain::repository::{GatewayOrder, PaymentGateway};

type HmacSha256 = Hmac<Sha256>;

const ID_HEX_LEN: usize = 24;

#[derive(Clone)]
pub struct MockPaymentGateway {
    secret: Arc<str>,
}

impl MockPaymentGateway {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// MAC over `<order_id>|<payment_id>`. HMAC takes keys of any length, so
    /// `None` never happens in practice.
    fn mac(&self, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(format!("{order_id}|{payment_id}").as_bytes());
        Some(mac)
    }

    fn sign(&self, order_id: &str, payment_id: &str) -> String {
        self.mac(order_id, payment_id)
            .map(|mac| {
                mac.finalize()
                    .into_bytes()
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn create_order(&self, amount: i64, currency: &str) -> GatewayOrder {
        let order_id = format!("mock_order_{}", random_hex(ID_HEX_LEN));
        let payment_id = format!("mock_payment_{}", random_hex(ID_HEX_LEN));
        let signature = self.sign(&order_id, &payment_id);
        tracing::debug!(order_id = %order_id, amount, currency, "mock order created");
        GatewayOrder {
            order_id,
            payment_id,
            signature,
        }
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let (Some(mac), Some(expected)) = (self.mac(order_id, payment_id), decode_hex(signature))
        else {
            return false;
        };
        mac.verify_slice(&expected).is_ok()
    }

    fn refund(&self, gateway_payment_id: &str, amount: i64) -> String {
        let refund_id = format!("mock_refund_{}", random_hex(ID_HEX_LEN));
        tracing::debug!(
            payment_id = gateway_payment_id,
            amount,
            refund_id = %refund_id,
            "mock refund issued"
        );
        refund_id
    }
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}
