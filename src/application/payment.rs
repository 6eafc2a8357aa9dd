use super::command::PaymentOutcome;
use super::engine::VoucherEngine;
use crate::domain::order::{Order, PaymentStatus};
use crate::domain::payment::PaymentNotification;
use crate::domain::ports::VoucherInsert;
use crate::domain::voucher::Voucher;
use crate::error::{Result, VoucherError};
use tracing::{debug, info, warn};

impl VoucherEngine {
    /// Applies a payment gateway notification to its order.
    ///
    /// The first `PAID` notification moves the order out of `PENDING` and
    /// issues its voucher. Repeats are answered from the stored state, and a
    /// repeat for a paid order without a voucher finishes the issuance.
    pub async fn confirm_payment(
        &self,
        notification: PaymentNotification,
    ) -> Result<PaymentOutcome> {
        let target = notification.target_status()?;
        let mut order = self.get_order(notification.order).await?;

        if let Some(received) = notification.gross_amount
            && !order.total.matches(received)
        {
            return Err(VoucherError::AmountMismatch {
                order: order.id,
                expected: order.total.value(),
                received,
            });
        }

        let Some(target) = target else {
            debug!(order = order.id, "payment still pending");
            let voucher = self.vouchers.find_by_order(order.id).await?;
            return Ok(PaymentOutcome { order, voucher });
        };

        if order.payment_status != target {
            if !order.payment_status.can_transition_to(target) {
                return Err(VoucherError::InvalidTransition {
                    order: order.id,
                    from: order.payment_status,
                    to: target,
                });
            }
            if self
                .orders
                .update_status(order.id, order.payment_status, target)
                .await?
            {
                order.payment_status = target;
                info!(order = order.id, status = %target, "payment status updated");
            } else {
                // Another notification got there first.
                order = self.get_order(order.id).await?;
                if order.payment_status != target {
                    return Err(VoucherError::InvalidTransition {
                        order: order.id,
                        from: order.payment_status,
                        to: target,
                    });
                }
            }
        }

        let voucher = match target {
            PaymentStatus::Paid => Some(self.issue_voucher(&order).await?),
            PaymentStatus::Pending | PaymentStatus::Failed => None,
        };
        Ok(PaymentOutcome { order, voucher })
    }

    /// Returns the voucher of a paid order, creating it on first call.
    async fn issue_voucher(&self, order: &Order) -> Result<Voucher> {
        if let Some(existing) = self.vouchers.find_by_order(order.id).await? {
            return Ok(existing);
        }

        // Paid orders are honoured even if the service was taken off sale since.
        let service = self
            .services
            .get(order.service)
            .await?
            .ok_or(VoucherError::ServiceNotFound(order.service))?;
        let issued_at = self.clock.now();

        for attempt in 1..=self.config.max_code_attempts {
            let voucher = Voucher::issue(
                self.codes.generate(),
                order,
                &service,
                issued_at,
                self.config.validity_months,
            )?;
            match self.vouchers.insert(voucher.clone()).await? {
                VoucherInsert::Inserted => {
                    info!(
                        order = order.id,
                        code = %voucher.code,
                        expires_on = %voucher.expires_on,
                        "voucher issued"
                    );
                    return Ok(voucher);
                }
                VoucherInsert::CodeTaken => {
                    warn!(order = order.id, attempt, "voucher code collision, drawing again");
                }
                VoucherInsert::OrderHasVoucher => {
                    return self.vouchers.find_by_order(order.id).await?.ok_or_else(|| {
                        VoucherError::InternalError(Box::new(std::io::Error::other(format!(
                            "voucher index for order {} points nowhere",
                            order.id
                        ))))
                    });
                }
            }
        }

        Err(VoucherError::CodeSpaceExhausted(self.config.max_code_attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::test_support::{checkout, clock, engine, massage};
    use crate::domain::voucher::VoucherStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_paid_notification_issues_voucher() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();

        let outcome = engine
            .confirm_payment(PaymentNotification::new(1, "settlement").with_amount(dec!(250000.00)))
            .await
            .unwrap();

        assert_eq!(outcome.order.payment_status, PaymentStatus::Paid);
        let voucher = outcome.voucher.unwrap();
        assert_eq!(voucher.order, 1);
        assert_eq!(voucher.status, VoucherStatus::Active);
        assert_eq!(voucher.code.as_str().len(), 5);
        assert_eq!(voucher.expires_on, NaiveDate::from_ymd_opt(2027, 1, 15).unwrap());
    }

    #[tokio::test]
    async fn test_repeated_paid_notification_is_idempotent() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();

        let first = engine
            .confirm_payment(PaymentNotification::new(1, "capture"))
            .await
            .unwrap();
        let second = engine
            .confirm_payment(PaymentNotification::new(1, "settlement"))
            .await
            .unwrap();

        assert_eq!(first.voucher, second.voucher);
        assert_eq!(engine.list_vouchers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_notification_changes_nothing() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();

        let outcome = engine
            .confirm_payment(PaymentNotification::new(1, "pending"))
            .await
            .unwrap();
        assert_eq!(outcome.order.payment_status, PaymentStatus::Pending);
        assert!(outcome.voucher.is_none());
    }

    #[tokio::test]
    async fn test_failed_payment_is_terminal() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();

        let outcome = engine
            .confirm_payment(PaymentNotification::new(1, "deny"))
            .await
            .unwrap();
        assert_eq!(outcome.order.payment_status, PaymentStatus::Failed);
        assert!(outcome.voucher.is_none());

        engine
            .confirm_payment(PaymentNotification::new(1, "expire"))
            .await
            .unwrap();

        assert!(matches!(
            engine.confirm_payment(PaymentNotification::new(1, "settlement")).await,
            Err(VoucherError::InvalidTransition {
                from: PaymentStatus::Failed,
                to: PaymentStatus::Paid,
                ..
            })
        ));
        assert!(engine.voucher_for_order(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_conflicting_notifications_race() {
        let engine = std::sync::Arc::new(engine(clock()));
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();

        let handles: Vec<_> = ["settlement", "deny", "capture", "cancel"]
            .into_iter()
            .cycle()
            .take(16)
            .map(|status| {
                let engine = std::sync::Arc::clone(&engine);
                tokio::spawn(async move {
                    engine
                        .confirm_payment(PaymentNotification::new(1, status))
                        .await
                })
            })
            .collect();

        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(outcome) => assert!(outcome.order.payment_status.is_terminal()),
                Err(VoucherError::InvalidTransition { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        // Whichever side won, the other side's eight notifications were refused.
        assert_eq!(rejected, 8);

        let order = engine.get_order(1).await.unwrap();
        let voucher = engine.voucher_for_order(1).await.unwrap();
        assert_eq!(voucher.is_some(), order.payment_status == PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_amount_mismatch_leaves_order_pending() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();

        assert!(matches!(
            engine
                .confirm_payment(PaymentNotification::new(1, "settlement").with_amount(dec!(1000)))
                .await,
            Err(VoucherError::AmountMismatch { order: 1, .. })
        ));
        let order = engine.get_order(1).await.unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let engine = engine(clock());
        assert!(matches!(
            engine.confirm_payment(PaymentNotification::new(77, "settlement")).await,
            Err(VoucherError::OrderNotFound(77))
        ));
    }

    #[tokio::test]
    async fn test_voucher_issued_after_service_deactivated() {
        let engine = engine(clock());
        engine.add_service(massage()).await.unwrap();
        engine.place_order(checkout(1)).await.unwrap();
        engine.deactivate_service(1).await.unwrap();

        let outcome = engine
            .confirm_payment(PaymentNotification::new(1, "settlement"))
            .await
            .unwrap();
        assert!(outcome.voucher.is_some());
    }
}
