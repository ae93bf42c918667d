use crate::entities::ShopPrize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawResponse {
    pub prize: ShopPrize,
    pub remaining_balance: i64,
    pub transaction_id: i64,
    pub draw_id: i64,
}
