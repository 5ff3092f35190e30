use loyalty_core::{Coupon, LoyaltyAccount, LoyaltyErrors};
use serde::{Deserialize, Serialize};

/// Row of the `users` table. Points are signed in storage.
#[derive(Deserialize, Serialize, sqlx::FromRow, Debug, Clone)]
pub(crate) struct AccountRow {
    pub id: i64,
    pub phone: String,
    pub points: i64,
}

impl AccountRow {
    pub fn into_account(self) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let points = u64::try_from(self.points).map_err(|_| {
            LoyaltyErrors::PersistenceError(format!(
                "Account {} has a negative stored balance of {}",
                self.id, self.points
            ))
        })?;

        LoyaltyAccount::from(self.id, self.phone, points)
    }
}

/// Row of the `coupons` table.
#[derive(Deserialize, Serialize, sqlx::FromRow, Debug, Clone)]
pub(crate) struct CouponRow {
    pub id: i64,
    pub title: String,
    pub points_cost: i64,
}

impl CouponRow {
    pub fn into_coupon(self) -> Result<Coupon, LoyaltyErrors> {
        let points_cost = u64::try_from(self.points_cost).map_err(|_| {
            LoyaltyErrors::PersistenceError(format!(
                "Coupon {} has a negative cost of {}",
                self.id, self.points_cost
            ))
        })?;

        Ok(Coupon::new(self.id, self.title, points_cost))
    }
}

pub(crate) fn stored_points(points: u64) -> Result<i64, LoyaltyErrors> {
    i64::try_from(points).map_err(|_| {
        LoyaltyErrors::InvalidValues(format!("Balance {} exceeds the storable range", points))
    })
}
