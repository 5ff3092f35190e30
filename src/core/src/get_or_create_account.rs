use tracing::{error, info, warn};

use crate::{
    loyalty::{LoyaltyAccount, LoyaltyErrors, LoyaltyStore},
    values::PhoneNumber,
};

pub struct GetOrCreateAccountCommandHandler;

impl GetOrCreateAccountCommandHandler {
    #[tracing::instrument(name = "handle_get_or_create_account", skip(loyalty_store))]
    pub async fn handle<T: LoyaltyStore>(
        loyalty_store: &T,
        phone: &str,
    ) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let key = PhoneNumber::lookup_key(phone)?;

        match loyalty_store.find_account_by_phone(key).await {
            Ok(account) => {
                info!("Existing loyalty account found");

                Ok(account)
            }
            Err(LoyaltyErrors::AccountNotFound(_)) => {
                let phone = PhoneNumber::parse(key)?;

                info!("No loyalty account for {}, creating one", phone);

                match loyalty_store.create_account(phone.as_str()).await {
                    Ok(account) => Ok(account),
                    Err(LoyaltyErrors::AccountExists(_)) => {
                        warn!("Account for {} was created concurrently, reading it back", phone);

                        loyalty_store.find_account_by_phone(phone.as_str()).await
                    }
                    Err(e) => {
                        error!("Failure creating new account: {:?}", e);

                        Err(e)
                    }
                }
            }
            Err(e) => {
                error!("Failure retrieving account: {:?}", e);

                Err(e)
            }
        }
    }
}
