use async_trait::async_trait;
use loyalty_core::{Coupon, LoyaltyAccount, LoyaltyErrors, LoyaltyStore};
use tracing::info;

use crate::{
    config::StoreSettings, memory::InMemoryLoyaltyStore, postgres::PostgresLoyaltyStore,
    rest::RestTableStore,
};

/// The store selected at startup.
pub enum ApplicationStore {
    Rest(RestTableStore),
    Postgres(PostgresLoyaltyStore),
    Memory(InMemoryLoyaltyStore),
}

impl ApplicationStore {
    #[tracing::instrument(name = "connect_application_store")]
    pub async fn connect(settings: &StoreSettings) -> Result<Self, anyhow::Error> {
        let store = match settings {
            StoreSettings::Rest { url, access_key } => {
                info!("Using hosted table store at {}", url);
                ApplicationStore::Rest(RestTableStore::new(url, access_key)?)
            }
            StoreSettings::Postgres { database_url } => {
                info!("Using Postgres store");
                let store = PostgresLoyaltyStore::new(database_url).await?;
                store.migrate().await?;
                ApplicationStore::Postgres(store)
            }
            StoreSettings::Memory { coupons } => {
                info!("Using in-memory store with {} coupons", coupons.len());
                ApplicationStore::Memory(InMemoryLoyaltyStore::with_coupons(coupons.clone()))
            }
        };

        Ok(store)
    }
}

#[async_trait]
impl LoyaltyStore for ApplicationStore {
    async fn find_account_by_phone(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        match self {
            ApplicationStore::Rest(store) => store.find_account_by_phone(phone).await,
            ApplicationStore::Postgres(store) => store.find_account_by_phone(phone).await,
            ApplicationStore::Memory(store) => store.find_account_by_phone(phone).await,
        }
    }

    async fn create_account(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        match self {
            ApplicationStore::Rest(store) => store.create_account(phone).await,
            ApplicationStore::Postgres(store) => store.create_account(phone).await,
            ApplicationStore::Memory(store) => store.create_account(phone).await,
        }
    }

    async fn update_points(&self, account_id: i64, points: u64) -> Result<(), LoyaltyErrors> {
        match self {
            ApplicationStore::Rest(store) => store.update_points(account_id, points).await,
            ApplicationStore::Postgres(store) => store.update_points(account_id, points).await,
            ApplicationStore::Memory(store) => store.update_points(account_id, points).await,
        }
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, LoyaltyErrors> {
        match self {
            ApplicationStore::Rest(store) => store.list_coupons().await,
            ApplicationStore::Postgres(store) => store.list_coupons().await,
            ApplicationStore::Memory(store) => store.list_coupons().await,
        }
    }
}
