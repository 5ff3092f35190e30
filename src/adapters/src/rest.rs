use anyhow::Context;
use async_trait::async_trait;
use loyalty_core::{Coupon, LoyaltyAccount, LoyaltyErrors, LoyaltyStore};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::rows::{stored_points, AccountRow, CouponRow};

const ACCOUNTS_TABLE: &str = "users";
const COUPONS_TABLE: &str = "coupons";

/// Hosted table store speaking the PostgREST dialect. The access key is sent
/// both as `apikey` and as a bearer token.
#[derive(Clone)]
pub struct RestTableStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct NewAccount<'a> {
    phone: &'a str,
    points: i64,
}

#[derive(Serialize)]
struct PointsUpdate {
    points: i64,
}

impl RestTableStore {
    pub fn new(base_url: &str, access_key: &str) -> Result<Self, anyhow::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("apikey"),
            HeaderValue::from_str(access_key).context("Invalid access key format")?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_key))
                .context("Invalid access key format")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn rows<R: DeserializeOwned>(response: Response) -> Result<Vec<R>, LoyaltyErrors> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Store responded with {}: {}", status, body);

            return Err(LoyaltyErrors::PersistenceError(format!(
                "Store responded with {}",
                status
            )));
        }

        response.json::<Vec<R>>().await.map_err(|e| {
            LoyaltyErrors::PersistenceError(format!("Unexpected store response: {}", e))
        })
    }
}

fn request_failed(e: reqwest::Error) -> LoyaltyErrors {
    LoyaltyErrors::PersistenceError(format!("Request to store failed: {}", e))
}

#[async_trait]
impl LoyaltyStore for RestTableStore {
    #[tracing::instrument(name = "rest_find_account_by_phone", skip(self))]
    async fn find_account_by_phone(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let response = self
            .client
            .get(self.table_url(ACCOUNTS_TABLE))
            .query(&[("phone", format!("eq.{}", phone)), ("select", "*".to_string())])
            .send()
            .await
            .map_err(request_failed)?;

        match Self::rows::<AccountRow>(response).await?.into_iter().next() {
            Some(row) => row.into_account(),
            None => Err(LoyaltyErrors::AccountNotFound(phone.to_string())),
        }
    }

    #[tracing::instrument(name = "rest_create_account", skip(self))]
    async fn create_account(&self, phone: &str) -> Result<LoyaltyAccount, LoyaltyErrors> {
        let response = self
            .client
            .post(self.table_url(ACCOUNTS_TABLE))
            .header("Prefer", "return=representation")
            .json(&[NewAccount { phone, points: 0 }])
            .send()
            .await
            .map_err(request_failed)?;

        if response.status() == StatusCode::CONFLICT {
            return Err(LoyaltyErrors::AccountExists(phone.to_string()));
        }

        let account = Self::rows::<AccountRow>(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                LoyaltyErrors::PersistenceError("Store did not return the new account".to_string())
            })?
            .into_account()?;

        info!("Created account {}", account.id());

        Ok(account)
    }

    #[tracing::instrument(name = "rest_update_points", skip(self))]
    async fn update_points(&self, account_id: i64, points: u64) -> Result<(), LoyaltyErrors> {
        let response = self
            .client
            .patch(self.table_url(ACCOUNTS_TABLE))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", account_id))])
            .json(&PointsUpdate {
                points: stored_points(points)?,
            })
            .send()
            .await
            .map_err(request_failed)?;

        if Self::rows::<AccountRow>(response).await?.is_empty() {
            return Err(LoyaltyErrors::AccountNotFound(account_id.to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(name = "rest_list_coupons", skip(self))]
    async fn list_coupons(&self) -> Result<Vec<Coupon>, LoyaltyErrors> {
        let response = self
            .client
            .get(self.table_url(COUPONS_TABLE))
            .query(&[("select", "*")])
            .send()
            .await
            .map_err(request_failed)?;

        Self::rows::<CouponRow>(response)
            .await?
            .into_iter()
            .map(CouponRow::into_coupon)
            .collect()
    }
}
