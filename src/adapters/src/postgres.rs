use async_trait::async_trait;
use loyalty_core::{Coupon, LoyaltyAccount, LoyaltyErrors, LoyaltyStore};
use sqlx::PgPool;
use tracing::info;

use crate::rows::{stored_points, AccountRow, CouponRow};

pub struct PostgresLoyaltyStore {
    db: PgPool,
}

impl PostgresLoyaltyStore {
    pub async fn new(database_url: &str) -> Result<Self, anyhow::Error> {
        let database_pool = PgPool::connect(database_url).await?;

        Ok(Self { db: database_pool })
    }

    pub async fn migrate(&self) -> Result<(), anyhow::Error> {
        sqlx::migrate!("./migrations").run(&self.db).await?;

        info!("Migrations applied");

        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> LoyaltyErrors {
    tracing::error!("Database error: {:?}", e);

    LoyaltyErrors::PersistenceError(format!("Database Error: {}", e))
}

#[async_trait]
impl LoyaltyStore for PostgresLoyaltyStore {
    #[tracing::instrument(name = "db_find_account_by_phone", skip(self))]
    async fn find_account_by_phone(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let record = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, phone, points
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.db)
        .await
        .map_err(database_error)?;

        match record {
            Some(row) => row.into_account(),
            None => Err(LoyaltyErrors::AccountNotFound(phone.to_string())),
        }
    }

    #[tracing::instrument(name = "db_create_account", skip(self))]
    async fn create_account(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let record = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO users ( phone, points )
            VALUES ( $1, 0 )
            RETURNING id, phone, points
            "#,
        )
        .bind(phone)
        .fetch_one(&self.db)
        .await;

        match record {
            Ok(row) => row.into_account(),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(LoyaltyErrors::AccountExists(phone.to_string()))
            }
            Err(e) => Err(database_error(e)),
        }
    }

    #[tracing::instrument(name = "db_update_points", skip(self))]
    async fn update_points(&self, account_id: i64, points: u64) -> Result<(), LoyaltyErrors> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET points = $1
            WHERE id = $2
            "#,
        )
        .bind(stored_points(points)?)
        .bind(account_id)
        .execute(&self.db)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(LoyaltyErrors::AccountNotFound(account_id.to_string()));
        }

        info!("Updated account");

        Ok(())
    }

    #[tracing::instrument(name = "db_list_coupons", skip(self))]
    async fn list_coupons(&self) -> Result<Vec<Coupon>, LoyaltyErrors> {
        sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, title, points_cost
            FROM coupons
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(database_error)?
        .into_iter()
        .map(CouponRow::into_coupon)
        .collect()
    }
}
