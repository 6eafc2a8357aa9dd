use super::engine::VoucherEngine;
use crate::domain::voucher::{Voucher, VoucherCode, VoucherStatus};
use crate::error::{Result, VoucherError};
use tracing::{debug, info};

impl VoucherEngine {
    /// Looks a voucher up for display at the front desk.
    ///
    /// An active voucher found past its expiry date is marked `EXPIRED`
    /// on the way out.
    pub async fn verify(&self, code: &str) -> Result<Voucher> {
        let code = self.parse_code(code)?;
        let voucher = self.fetch(&code).await?;

        if voucher.status != VoucherStatus::Active || !voucher.is_past_expiry(self.clock.today()) {
            return Ok(voucher);
        }

        let mut expired = voucher;
        expired.expire();
        if self
            .vouchers
            .replace_if_status(expired.clone(), VoucherStatus::Active)
            .await?
        {
            info!(code = %code, expires_on = %expired.expires_on, "voucher expired");
            Ok(expired)
        } else {
            self.fetch(&code).await
        }
    }

    /// Consumes a voucher. Succeeds at most once per code.
    ///
    /// Checks run in order: unknown code, past expiry, already redeemed.
    pub async fn redeem(&self, code: &str) -> Result<Voucher> {
        let voucher = self.verify(code).await?;
        self.ensure_redeemable(&voucher)?;

        let mut redeemed = voucher.clone();
        redeemed.redeem(self.clock.now())?;
        if self
            .vouchers
            .replace_if_status(redeemed.clone(), VoucherStatus::Active)
            .await?
        {
            info!(code = %redeemed.code, order = redeemed.order, "voucher redeemed");
            return Ok(redeemed);
        }

        // Lost a race with another redemption or an expiry.
        debug!(code = %voucher.code, "voucher changed during redemption");
        let current = self.fetch(&voucher.code).await?;
        self.ensure_redeemable(&current)?;
        Err(VoucherError::AlreadyRedeemed {
            code: current.code.to_string(),
        })
    }

    /// Rejects input that cannot be a code this engine issues.
    fn parse_code(&self, input: &str) -> Result<VoucherCode> {
        let code = VoucherCode::parse(input)?;
        if code.as_str().len() != self.codes.length() {
            return Err(VoucherError::InvalidCode(input.to_string()));
        }
        Ok(code)
    }

    async fn fetch(&self, code: &VoucherCode) -> Result<Voucher> {
        self.vouchers
            .get(code)
            .await?
            .ok_or_else(|| VoucherError::VoucherNotFound(code.to_string()))
    }

    fn ensure_redeemable(&self, voucher: &Voucher) -> Result<()> {
        if voucher.status == VoucherStatus::Expired || voucher.is_past_expiry(self.clock.today()) {
            return Err(voucher.expired_error());
        }
        if voucher.status == VoucherStatus::Redeemed {
            return Err(VoucherError::AlreadyRedeemed {
                code: voucher.code.to_string(),
            });
        }
        Ok(())
    }
}
