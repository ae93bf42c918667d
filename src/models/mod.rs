pub mod common;
pub mod coupon;
pub mod deposit;
pub mod fact;
pub mod lottery;
pub mod member;
pub mod pagination;
pub mod payment;
pub mod point;
pub mod study;

pub use common::*;
pub use coupon::*;
pub use deposit::*;
pub use fact::*;
pub use lottery::*;
pub use member::*;
pub use pagination::*;
pub use payment::*;
pub use point::*;
pub use study::*;
