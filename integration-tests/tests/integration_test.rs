use rand::Rng;
use serde::Deserialize;
use tracing::info;

#[derive(Deserialize, Debug)]
pub struct LoyaltyDto {
    pub id: i64,
    pub phone: String,
    pub points: u64,
}

#[derive(Deserialize, Debug)]
pub struct Coupon {
    id: i64,
    points_cost: u64,
}

fn api_endpoint() -> String {
    std::env::var("API_ENDPOINT").unwrap_or("http://localhost:8080".to_string())
}

fn phone_under_test() -> String {
    let digits: u64 = rand::thread_rng().gen_range(0..100_000_000);
    format!("09{:08}", digits)
}

#[tokio::test]
#[ignore = "requires a running loyalty-web instance at API_ENDPOINT"]
async fn when_spend_recorded_points_are_added_and_can_be_redeemed() {
    let _ = tracing_subscriber::fmt().json().try_init();

    let api_endpoint = api_endpoint();
    let phone = phone_under_test();
    let client = reqwest::Client::new();

    info!("Phone under test is {} against {}", &phone, api_endpoint);

    let missing = client
        .get(format!("{}/accounts/{}", api_endpoint, phone))
        .send()
        .await
        .expect("Lookup should complete");
    assert_eq!(missing.status(), 404);

    let created = client
        .post(format!("{}/accounts/{}", api_endpoint, phone))
        .send()
        .await
        .expect("Account should be provisioned")
        .json::<LoyaltyDto>()
        .await
        .unwrap();
    assert_eq!(created.phone, phone);
    assert_eq!(created.points, 0);

    let again = client
        .post(format!("{}/accounts/{}", api_endpoint, phone))
        .send()
        .await
        .expect("Lookup should complete")
        .json::<LoyaltyDto>()
        .await
        .unwrap();
    assert_eq!(again.id, created.id);

    let coupons = client
        .get(format!("{}/coupons", api_endpoint))
        .send()
        .await
        .expect("Coupons should be listed")
        .json::<Vec<Coupon>>()
        .await
        .unwrap();

    let Some(coupon) = coupons.first() else {
        info!("No coupons configured, skipping redemption");
        return;
    };

    let accrued = client
        .post(format!("{}/accounts/{}/accrue", api_endpoint, phone))
        .json(&serde_json::json!({ "spendAmount": coupon.points_cost * 10 }))
        .send()
        .await
        .expect("Accrual should complete");
    assert_eq!(accrued.status(), 200);
    let accrued = accrued.json::<LoyaltyDto>().await.unwrap();
    assert_eq!(accrued.points, coupon.points_cost);

    let redeemed = client
        .post(format!("{}/accounts/{}/redeem", api_endpoint, phone))
        .json(&serde_json::json!({ "couponId": coupon.id }))
        .send()
        .await
        .expect("Redemption should complete");
    assert_eq!(redeemed.status(), 200);
    let redeemed = redeemed.json::<LoyaltyDto>().await.unwrap();
    assert_eq!(redeemed.points, 0);

    if coupon.points_cost > 0 {
        let refused = client
            .post(format!("{}/accounts/{}/redeem", api_endpoint, phone))
            .json(&serde_json::json!({ "couponId": coupon.id }))
            .send()
            .await
            .expect("Redemption should complete");
        assert_eq!(refused.status(), 409);
    }
}
