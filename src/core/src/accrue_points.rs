use serde::Deserialize;
use tracing::{error, info};

use crate::{
    find_account::FindAccountQueryHandler,
    loyalty::{LoyaltyAccount, LoyaltyErrors, LoyaltyStore},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccruePointsCommand {
    phone: String,
    spend_amount: u64,
}

impl AccruePointsCommand {
    pub fn new(phone: String, spend_amount: u64) -> Self {
        Self {
            phone,
            spend_amount,
        }
    }
}

pub struct AccruePointsCommandHandler;

impl AccruePointsCommandHandler {
    /// Accrues against the account currently stored for `command.phone`.
    #[tracing::instrument(name = "handle_accrue_points_command", skip(loyalty_store, command), fields(phone=command.phone, spend_amount=command.spend_amount))]
    pub async fn handle<T: LoyaltyStore>(
        loyalty_store: &T,
        command: AccruePointsCommand,
    ) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let account = FindAccountQueryHandler::handle(loyalty_store, &command.phone).await?;

        Self::accrue(loyalty_store, &account, command.spend_amount).await
    }

    /// Persists `points + floor(spend_amount / 10)` and returns the updated
    /// account. `account` itself is never modified.
    #[tracing::instrument(name = "handle_accrue_points", skip(loyalty_store, account), fields(account_id=account.id()))]
    pub async fn accrue<T: LoyaltyStore>(
        loyalty_store: &T,
        account: &LoyaltyAccount,
        spend_amount: u64,
    ) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let mut updated = account.clone();
        let earned = updated.accrue(spend_amount)?;

        loyalty_store
            .update_points(updated.id(), updated.points())
            .await
            .map_err(|e| {
                error!("Failure persisting accrued points: {:?}", e);

                e
            })?;

        info!("Accrued {} points, balance now {}", earned, updated.points());

        Ok(updated)
    }
}
