use tracing::info;

use crate::{
    accrue_points::AccruePointsCommandHandler,
    get_or_create_account::GetOrCreateAccountCommandHandler,
    list_coupons::ListCouponsQueryHandler,
    loyalty::{Coupon, LoyaltyAccount, LoyaltyErrors, LoyaltyStore},
    redeem_coupon::RedeemCouponCommandHandler,
    values::SpendAmount,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatorMode {
    /// Customers look up their balance and redeem coupons.
    #[default]
    Customer,
    /// Staff look up customers and record spend.
    Staff,
}

/// State of a single point-of-sale terminal: who is operating it, which
/// account is on screen, the coupon list and the keypad buffer.
#[derive(Debug, Default)]
pub struct PointOfSaleSession {
    mode: OperatorMode,
    current_account: Option<LoyaltyAccount>,
    coupons: Vec<Coupon>,
    entered_amount: String,
}

impl PointOfSaleSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> OperatorMode {
        self.mode
    }

    pub fn current_account(&self) -> Option<&LoyaltyAccount> {
        self.current_account.as_ref()
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn entered_amount(&self) -> &str {
        &self.entered_amount
    }

    pub fn toggle_mode(&mut self) -> OperatorMode {
        self.mode = match self.mode {
            OperatorMode::Customer => OperatorMode::Staff,
            OperatorMode::Staff => OperatorMode::Customer,
        };

        info!("Switched to {:?} mode", self.mode);

        self.mode
    }

    /// Looks up the phone, provisioning an account on a miss, and puts it on
    /// screen.
    #[tracing::instrument(name = "session_search", skip(self, loyalty_store))]
    pub async fn search<T: LoyaltyStore>(
        &mut self,
        loyalty_store: &T,
        phone: &str,
    ) -> Result<&LoyaltyAccount, LoyaltyErrors> {
        let account = GetOrCreateAccountCommandHandler::handle(loyalty_store, phone).await?;

        Ok(self.current_account.insert(account))
    }

    pub fn press_digit(&mut self, digit: u8) -> Result<(), LoyaltyErrors> {
        if digit > 9 {
            return Err(LoyaltyErrors::InvalidValues(format!(
                "'{}' is not a keypad digit",
                digit
            )));
        }

        self.entered_amount.push(char::from(b'0' + digit));

        Ok(())
    }

    pub fn clear_amount(&mut self) {
        self.entered_amount.clear();
    }

    /// Accrues the keypad amount against the on-screen account and clears the
    /// keypad on success.
    #[tracing::instrument(name = "session_confirm_accrual", skip(self, loyalty_store), fields(entered_amount=self.entered_amount))]
    pub async fn confirm_accrual<T: LoyaltyStore>(
        &mut self,
        loyalty_store: &T,
    ) -> Result<&LoyaltyAccount, LoyaltyErrors> {
        self.require_mode(OperatorMode::Staff)?;

        let account = self.require_account()?;
        let spend_amount = SpendAmount::parse(&self.entered_amount)?;

        let updated =
            AccruePointsCommandHandler::accrue(loyalty_store, account, spend_amount.value())
                .await?;

        self.entered_amount.clear();

        Ok(self.current_account.insert(updated))
    }

    #[tracing::instrument(name = "session_load_coupons", skip(self, loyalty_store))]
    pub async fn load_coupons<T: LoyaltyStore>(
        &mut self,
        loyalty_store: &T,
    ) -> Result<&[Coupon], LoyaltyErrors> {
        self.coupons = ListCouponsQueryHandler::handle(loyalty_store).await?;

        Ok(&self.coupons)
    }

    /// Redeems one of the loaded coupons against the on-screen account.
    #[tracing::instrument(name = "session_redeem", skip(self, loyalty_store))]
    pub async fn redeem<T: LoyaltyStore>(
        &mut self,
        loyalty_store: &T,
        coupon_id: i64,
    ) -> Result<&LoyaltyAccount, LoyaltyErrors> {
        self.require_mode(OperatorMode::Customer)?;

        let account = self.require_account()?;
        let coupon = self
            .coupons
            .iter()
            .find(|coupon| coupon.id() == coupon_id)
            .ok_or(LoyaltyErrors::CouponNotFound(coupon_id))?;

        let updated = RedeemCouponCommandHandler::redeem(loyalty_store, account, coupon).await?;

        Ok(self.current_account.insert(updated))
    }

    fn require_mode(&self, mode: OperatorMode) -> Result<(), LoyaltyErrors> {
        if self.mode != mode {
            return Err(LoyaltyErrors::InvalidValues(format!(
                "Operation is only available in {:?} mode",
                mode
            )));
        }

        Ok(())
    }

    fn require_account(&self) -> Result<&LoyaltyAccount, LoyaltyErrors> {
        self.current_account.as_ref().ok_or_else(|| {
            LoyaltyErrors::InvalidValues("No account has been looked up".to_string())
        })
    }
}
