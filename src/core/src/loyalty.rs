use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoyaltyErrors {
    #[error("Invalid Values: {0}")]
    InvalidValues(String),
    #[error("Loyalty Account Not Found: {0}")]
    AccountNotFound(String),
    #[error("Loyalty Account Already Exists: {0}")]
    AccountExists(String),
    #[error("Coupon Not Found: {0}")]
    CouponNotFound(i64),
    #[error("Insufficient Points: {available} available, {required} required")]
    InsufficientPoints { available: u64, required: u64 },
    #[error("Persistence Error: {0}")]
    PersistenceError(String),
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct LoyaltyDto {
    pub id: i64,
    pub phone: String,
    pub points: u64,
}

impl From<LoyaltyAccount> for LoyaltyDto {
    fn from(value: LoyaltyAccount) -> Self {
        LoyaltyDto {
            id: value.id,
            phone: value.phone,
            points: value.points,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoyaltyAccount {
    id: i64,
    phone: String,
    points: u64,
}

impl LoyaltyAccount {
    /// Spend, in the smallest currency unit, that earns a single point.
    pub const SPEND_PER_POINT: u64 = 10;

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn points(&self) -> u64 {
        self.points
    }

    /// Rebuilds an account from a stored row. Stored phone numbers predate any
    /// input contract, so only emptiness is rejected here.
    pub fn from(id: i64, phone: String, points: u64) -> Result<Self, LoyaltyErrors> {
        if phone.trim().is_empty() {
            return Err(LoyaltyErrors::InvalidValues(
                "Phone cannot be empty".to_string(),
            ));
        }

        Ok(Self { id, phone, points })
    }

    pub fn earned_points(spend_amount: u64) -> u64 {
        spend_amount / Self::SPEND_PER_POINT
    }

    #[tracing::instrument(name = "handle_accrue", skip(self), fields(account_id = self.id))]
    pub(crate) fn accrue(&mut self, spend_amount: u64) -> Result<u64, LoyaltyErrors> {
        let earned = Self::earned_points(spend_amount);

        let new_points_total = self.points.checked_add(earned).ok_or_else(|| {
            LoyaltyErrors::InvalidValues(format!(
                "Accruing {} points would overflow the balance",
                earned
            ))
        })?;

        info!("Earned {} points on spend of {}", earned, spend_amount);
        self.points = new_points_total;

        Ok(earned)
    }

    pub(crate) fn redeem(&mut self, coupon: &Coupon) -> Result<(), LoyaltyErrors> {
        let new_points_total = self.points.checked_sub(coupon.points_cost).ok_or(
            LoyaltyErrors::InsufficientPoints {
                available: self.points,
                required: coupon.points_cost,
            },
        )?;

        self.points = new_points_total;

        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    id: i64,
    title: String,
    points_cost: u64,
}

impl Coupon {
    pub fn new(id: i64, title: String, points_cost: u64) -> Self {
        Self {
            id,
            title,
            points_cost,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn points_cost(&self) -> u64 {
        self.points_cost
    }
}

/// Repository over the remote table store holding accounts and coupons.
#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait LoyaltyStore {
    /// Exact match on phone. A miss is `AccountNotFound`.
    async fn find_account_by_phone(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors>;
    /// Inserts `{phone, points: 0}`. A uniqueness conflict is `AccountExists`.
    async fn create_account(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors>;
    async fn update_points(&self, account_id: i64, points: u64) -> Result<(), LoyaltyErrors>;
    async fn list_coupons(&self) -> Result<Vec<Coupon>, LoyaltyErrors>;
}
