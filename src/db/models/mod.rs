pub mod brand;
pub mod category;
pub mod coupon;
pub mod customer;
pub mod deal_of_the_day;
pub mod device_token;
pub mod flash_deal;
pub mod notification;
pub mod order;
pub mod product;
pub mod refund;
pub mod seller;
pub mod withdrawal_method;
