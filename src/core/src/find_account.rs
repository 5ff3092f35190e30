use crate::{
    loyalty::{LoyaltyAccount, LoyaltyErrors, LoyaltyStore},
    values::PhoneNumber,
};

pub struct FindAccountQueryHandler;

impl FindAccountQueryHandler {
    /// Strict lookup. Never provisions an account.
    #[tracing::instrument(name = "handle_find_account", skip(loyalty_store))]
    pub async fn handle<T: LoyaltyStore>(
        loyalty_store: &T,
        phone: &str,
    ) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let phone = PhoneNumber::lookup_key(phone)?;

        loyalty_store.find_account_by_phone(phone).await
    }
}
