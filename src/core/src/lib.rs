mod accrue_points;
mod find_account;
mod get_or_create_account;
mod list_coupons;
mod loyalty;
mod redeem_coupon;
mod session;
mod values;

pub use accrue_points::{AccruePointsCommand, AccruePointsCommandHandler};
pub use find_account::FindAccountQueryHandler;
pub use get_or_create_account::GetOrCreateAccountCommandHandler;
pub use list_coupons::ListCouponsQueryHandler;
pub use loyalty::{Coupon, LoyaltyAccount, LoyaltyDto, LoyaltyErrors, LoyaltyStore};
pub use redeem_coupon::{RedeemCouponCommand, RedeemCouponCommandHandler};
pub use session::{OperatorMode, PointOfSaleSession};
pub use values::{PhoneNumber, SpendAmount};

#[cfg(feature = "mocks")]
pub use loyalty::MockLoyaltyStore;
