use std::collections::BTreeMap;

use async_trait::async_trait;
use loyalty_core::{Coupon, LoyaltyAccount, LoyaltyErrors, LoyaltyStore};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<String, LoyaltyAccount>,
    coupons: Vec<Coupon>,
    next_id: i64,
}

/// Process-local store, used by tests and the `memory` backend.
#[derive(Default)]
pub struct InMemoryLoyaltyStore {
    tables: RwLock<Tables>,
}

impl InMemoryLoyaltyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coupons(coupons: Vec<Coupon>) -> Self {
        Self {
            tables: RwLock::new(Tables {
                coupons,
                ..Tables::default()
            }),
        }
    }

    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }
}

#[async_trait]
impl LoyaltyStore for InMemoryLoyaltyStore {
    async fn find_account_by_phone(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        self.tables
            .read()
            .await
            .accounts
            .get(phone)
            .cloned()
            .ok_or_else(|| LoyaltyErrors::AccountNotFound(phone.to_string()))
    }

    async fn create_account(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let mut tables = self.tables.write().await;

        if tables.accounts.contains_key(phone) {
            return Err(LoyaltyErrors::AccountExists(phone.to_string()));
        }

        tables.next_id += 1;
        let account = LoyaltyAccount::from(tables.next_id, phone.to_string(), 0)?;
        tables.accounts.insert(phone.to_string(), account.clone());

        Ok(account)
    }

    async fn update_points(&self, account_id: i64, points: u64) -> Result<(), LoyaltyErrors> {
        let mut tables = self.tables.write().await;

        let account = tables
            .accounts
            .values_mut()
            .find(|account| account.id() == account_id)
            .ok_or_else(|| LoyaltyErrors::AccountNotFound(account_id.to_string()))?;

        *account = LoyaltyAccount::from(account_id, account.phone().to_string(), points)?;

        Ok(())
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, LoyaltyErrors> {
        Ok(self.tables.read().await.coupons.clone())
    }
}

#[cfg(test)]
mod tests {
    use loyalty_core::{
        AccruePointsCommandHandler, FindAccountQueryHandler, GetOrCreateAccountCommandHandler,
        RedeemCouponCommandHandler,
    };

    use super::*;

    #[tokio::test]
    async fn repeated_lookup_creates_exactly_one_account() {
        let store = InMemoryLoyaltyStore::new();

        let first = GetOrCreateAccountCommandHandler::handle(&store, "0912345678")
            .await
            .unwrap();
        let second = GetOrCreateAccountCommandHandler::handle(&store, "0912345678")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.points(), 0);
        assert_eq!(store.account_count().await, 1);
    }

    #[tokio::test]
    async fn accrual_and_redemption_round_trip_to_starting_balance() {
        let store = InMemoryLoyaltyStore::new();
        let coupon = Coupon::new(1, "Free drink".to_string(), 40);
        let account = GetOrCreateAccountCommandHandler::handle(&store, "0912345678")
            .await
            .unwrap();

        let accrued = AccruePointsCommandHandler::accrue(&store, &account, 400)
            .await
            .unwrap();
        let redeemed = RedeemCouponCommandHandler::redeem(&store, &accrued, &coupon)
            .await
            .unwrap();

        assert_eq!(redeemed, account);
        let stored = FindAccountQueryHandler::handle(&store, "0912345678")
            .await
            .unwrap();
        assert_eq!(stored.points(), 0);
    }

    #[tokio::test]
    async fn stored_phone_with_separators_stays_reachable() {
        let store = InMemoryLoyaltyStore::new();
        let stored = store.create_account("0912-345-678").await.unwrap();
        store.update_points(stored.id(), 80).await.unwrap();

        let found = FindAccountQueryHandler::handle(&store, "0912-345-678")
            .await
            .unwrap();
        let looked_up = GetOrCreateAccountCommandHandler::handle(&store, "0912-345-678")
            .await
            .unwrap();

        assert_eq!(found.points(), 80);
        assert_eq!(looked_up, found);
        assert_eq!(store.account_count().await, 1);
    }

    #[tokio::test]
    async fn seeded_coupons_are_listed() {
        let store = InMemoryLoyaltyStore::with_coupons(vec![
            Coupon::new(2, "Free meal".to_string(), 50),
            Coupon::new(1, "Free drink".to_string(), 40),
        ]);

        let coupons = store.list_coupons().await.unwrap();

        let ids: Vec<i64> = coupons.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn update_of_unknown_account_is_not_found() {
        let store = InMemoryLoyaltyStore::new();

        let result = store.update_points(5, 10).await;

        assert!(matches!(result, Err(LoyaltyErrors::AccountNotFound(_))));
    }
}
