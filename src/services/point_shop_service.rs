use crate::config::{FlagStore, PointsConfig};
use crate::entities::{ShopPrize, point_shop_draw_entity as draws};
use crate::error::{AppError, AppResult};
use crate::models::{DrawResponse, DrawSnapshot, Fact};
use crate::services::{OutboxService, PointLedgerService};
use chrono::Utc;
use rand::Rng;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};

/// Fixed draw catalog. Declaration order is the tie-break order of the
/// cumulative walk in `pick_prize`, independent of weight magnitude.
pub const CATALOG: [(ShopPrize, u32); 5] = [
    (ShopPrize::Blank, 610),
    (ShopPrize::SnackCoupon, 320),
    (ShopPrize::CoffeeCoupon, 55),
    (ShopPrize::ChickenCoupon, 10),
    (ShopPrize::MealVoucher, 5),
];

pub fn total_weight() -> u32 {
    CATALOG.iter().map(|(_, weight)| weight).sum()
}

/// Select the prize for a 1-indexed roll in `[1, total_weight()]`: walk the
/// catalog accumulating weights and take the first entry whose cumulative
/// weight reaches the roll.
pub fn pick_prize(roll: u32) -> ShopPrize {
    let mut cumulative = 0u32;
    for (prize, weight) in CATALOG {
        cumulative += weight;
        if roll <= cumulative {
            return prize;
        }
    }
    // unreachable for rolls within range; clamp to the last entry
    CATALOG[CATALOG.len() - 1].0
}

/// Weighted lottery paid from the point ledger. The debit, the draw record
/// and the outbox fact share one transaction under the account lock, so a
/// member is never charged for a draw that was not recorded.
#[derive(Clone)]
pub struct PointShopService {
    pool: DatabaseConnection,
    ledger: PointLedgerService,
    outbox: OutboxService,
    flags: FlagStore,
    points: PointsConfig,
}

impl PointShopService {
    pub fn new(
        pool: DatabaseConnection,
        ledger: PointLedgerService,
        outbox: OutboxService,
        flags: FlagStore,
        points: PointsConfig,
    ) -> Self {
        Self {
            pool,
            ledger,
            outbox,
            flags,
            points,
        }
    }

    pub async fn draw(&self, member_id: i64) -> AppResult<DrawResponse> {
        let flags = self.flags.snapshot();
        if !flags.point_shop_enabled {
            return Err(AppError::ValidationError(
                "the point shop is currently closed".to_string(),
            ));
        }

        let _guard = self.ledger.locks().acquire(member_id).await?;
        let txn = self.pool.begin().await?;

        let (account, entry) = self
            .ledger
            .debit_locked(
                &txn,
                member_id,
                self.points.draw_cost,
                "point shop draw",
                &flags.current_period,
            )
            .await?;

        let roll = {
            let mut rng = rand::thread_rng();
            rng.gen_range(1..=total_weight())
        };
        let prize = pick_prize(roll);

        let draw = draws::ActiveModel {
            member_id: Set(member_id),
            prize: Set(prize),
            point_transaction_id: Set(entry.id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        self.outbox
            .append(
                &txn,
                &Fact::PointShopDrawn {
                    draw: DrawSnapshot::from(&draw),
                },
            )
            .await?;

        txn.commit().await?;

        log::info!("Member {member_id} drew {prize} (roll {roll})");
        Ok(DrawResponse {
            prize,
            remaining_balance: account.balance,
            transaction_id: entry.id,
            draw_id: draw.id,
        })
    }
}
