use crate::external::RecordStore;
use crate::models::PaymentNotification;
use chrono::{DateTime, Months, Utc};
use log::{error, info, warn};
use std::sync::Arc;

/// Notification authenticity check over the raw request body. The payment
/// provider is currently trusted by network origin alone; `AllowAll`
/// reproduces that. A provider-signature implementation plugs in here without
/// touching the handler or the reconciler.
pub trait WebhookVerifier: Send + Sync {
    fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> bool;
}

/// Accepts every notification. Known hardening gap: anyone who can reach the
/// endpoint can forge an activation until a signature verifier replaces this.
pub struct AllowAllVerifier;

impl WebhookVerifier for AllowAllVerifier {
    fn verify(&self, _raw_body: &[u8], _signature: Option<&str>) -> bool {
        true
    }
}

/// What the reconciler did with a notification. Every variant is acknowledged
/// with 200 by the handler; the provider only retries on transport-level
/// failure, never on business outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Subscription activated for the user.
    Applied {
        user_id: String,
        end_date: DateTime<Utc>,
    },
    /// Nothing to do: wrong event type, wrong status, or missing user id.
    Ignored,
    /// The notification was relevant but the record store update failed.
    /// Redelivery cannot fix a store outage, so this is still acknowledged;
    /// the inconsistency surfaces through the error log only.
    StoreFailed,
}

/// Applies `payment.succeeded` notifications to the subscription record of
/// the user named in the payment metadata.
pub struct Reconciler {
    store: Arc<dyn RecordStore>,
    verifier: Arc<dyn WebhookVerifier>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn RecordStore>, verifier: Arc<dyn WebhookVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Whether the record store credentials are present. Checked by the
    /// handler before processing; an unconfigured deployment must answer 500,
    /// not acknowledge notifications it can never apply.
    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    pub fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> bool {
        self.verifier.verify(raw_body, signature)
    }

    pub async fn process(&self, notification: &PaymentNotification) -> ReconcileOutcome {
        self.process_at(notification, Utc::now()).await
    }

    /// Linear filter-then-apply sequence, with the clock passed in so the
    /// time-dependent end-date computation is observable.
    ///
    /// The end date is always `now + 1 month`, never an extension of the
    /// previous end date. A redelivered notification processed at a later
    /// instant therefore moves the end date forward; see the tests that pin
    /// this behavior down.
    pub async fn process_at(
        &self,
        notification: &PaymentNotification,
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        let Some(payment) = notification.succeeded_payment() else {
            info!(
                "Ignoring non-actionable notification (event: {:?})",
                notification.event
            );
            return ReconcileOutcome::Ignored;
        };

        let user_id = payment
            .metadata
            .as_ref()
            .and_then(|m| m.user_id.as_deref())
            .filter(|id| !id.is_empty());
        let Some(user_id) = user_id else {
            // Upstream data-quality problem, not a failure of this service.
            warn!(
                "payment.succeeded without metadata.userId (payment id: {:?})",
                payment.id
            );
            return ReconcileOutcome::Ignored;
        };

        let end_date = subscription_end_date(now);

        match self.store.activate_subscription(user_id, end_date).await {
            Ok(()) => {
                info!("Subscription activated for user {user_id} until {end_date}");
                ReconcileOutcome::Applied {
                    user_id: user_id.to_string(),
                    end_date,
                }
            }
            Err(e) => {
                error!("Failed to update profile for user {user_id}: {e}");
                ReconcileOutcome::StoreFailed
            }
        }
    }
}

/// `now + 1 calendar month`; when the day-of-month does not exist in the
/// target month, `chrono` clamps to its last valid day (Jan 31 -> Feb 28).
pub fn subscription_end_date(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(1)).unwrap_or(now)
}
