use serde::Deserialize;
use tracing::{error, info, warn};

use crate::{
    find_account::FindAccountQueryHandler,
    list_coupons::ListCouponsQueryHandler,
    loyalty::{Coupon, LoyaltyAccount, LoyaltyErrors, LoyaltyStore},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RedeemCouponCommand {
    phone: String,
    coupon_id: i64,
}

impl RedeemCouponCommand {
    pub fn new(phone: String, coupon_id: i64) -> Self {
        Self { phone, coupon_id }
    }
}

pub struct RedeemCouponCommandHandler;

impl RedeemCouponCommandHandler {
    #[tracing::instrument(name = "handle_redeem_coupon_command", skip(loyalty_store, command), fields(phone=command.phone, coupon_id=command.coupon_id))]
    pub async fn handle<T: LoyaltyStore>(
        loyalty_store: &T,
        command: RedeemCouponCommand,
    ) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let account = FindAccountQueryHandler::handle(loyalty_store, &command.phone).await?;

        let coupon = ListCouponsQueryHandler::handle(loyalty_store)
            .await?
            .into_iter()
            .find(|coupon| coupon.id() == command.coupon_id)
            .ok_or(LoyaltyErrors::CouponNotFound(command.coupon_id))?;

        Self::redeem(loyalty_store, &account, &coupon).await
    }

    /// Persists `points - coupon.points_cost`. Fails with `InsufficientPoints`
    /// before touching the store when the balance does not cover the cost.
    #[tracing::instrument(name = "handle_redeem_coupon", skip(loyalty_store, account, coupon), fields(account_id=account.id(), coupon_id=coupon.id(), points_cost=coupon.points_cost()))]
    pub async fn redeem<T: LoyaltyStore>(
        loyalty_store: &T,
        account: &LoyaltyAccount,
        coupon: &Coupon,
    ) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let mut updated = account.clone();

        if let Err(e) = updated.redeem(coupon) {
            warn!("Redemption refused: {}", e);

            return Err(e);
        }

        loyalty_store
            .update_points(updated.id(), updated.points())
            .await
            .map_err(|e| {
                error!("Failure persisting redemption: {:?}", e);

                e
            })?;

        info!("Redeemed '{}', balance now {}", coupon.title(), updated.points());

        Ok(updated)
    }
}
