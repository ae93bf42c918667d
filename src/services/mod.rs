pub mod coupon_service;
pub mod member_service;
pub mod outbox_service;
pub mod point_ledger_service;
pub mod point_shop_service;
pub mod reconciliation_service;
pub mod reward_service;
pub mod study_service;
pub mod transaction_parser;

pub use coupon_service::*;
pub use member_service::*;
pub use outbox_service::*;
pub use point_ledger_service::*;
pub use point_shop_service::*;
pub use reconciliation_service::*;
pub use reward_service::*;
pub use study_service::*;
