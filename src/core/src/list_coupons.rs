use tracing::info;

use crate::loyalty::{Coupon, LoyaltyErrors, LoyaltyStore};

pub struct ListCouponsQueryHandler;

impl ListCouponsQueryHandler {
    #[tracing::instrument(name = "handle_list_coupons", skip(loyalty_store))]
    pub async fn handle<T: LoyaltyStore>(loyalty_store: &T) -> Result<Vec<Coupon>, LoyaltyErrors> {
        let coupons = loyalty_store.list_coupons().await?;

        info!("Loaded {} coupons", coupons.len());

        Ok(coupons)
    }
}
