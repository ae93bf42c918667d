use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    Name,
    DepositorName,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    MemberId,
    Period,
    Status,
    OriginalPrice,
    FinalPrice,
    CreatedAt,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Deposits {
    Table,
    Id,
    Kind,
    Amount,
    DepositorName,
    BalanceAfter,
    DepositedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Coupons {
    Table,
    Id,
    Name,
    DiscountAmount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IssuedCoupons {
    Table,
    Id,
    CouponId,
    MemberId,
    IsValid,
    UsedAt,
    UsedPaymentId,
    CreatedAt,
}

/// Tentative coupon-to-payment attachment set, owned by the payment side.
/// The coupon side has no payment pointer; the reverse link is derived.
#[derive(DeriveIden)]
enum PaymentCoupons {
    Table,
    Id,
    PaymentId,
    IssuedCouponId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PointAccounts {
    Table,
    Id,
    MemberId,
    Balance,
    TotalEarned,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    AccountId,
    Kind,
    Amount,
    Reason,
    Period,
    CreatedAt,
}

/// Uniqueness marker behind exactly-once reward grants. The unique index on
/// IdempotencyKey is the atomic exists-check-and-insert.
#[derive(DeriveIden)]
enum RewardReceipts {
    Table,
    Id,
    IdempotencyKey,
    MemberId,
    PointTransactionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PointShopDraws {
    Table,
    Id,
    MemberId,
    Prize,
    PointTransactionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum OutboxEvents {
    Table,
    Id,
    Kind,
    Payload,
    CreatedAt,
    DispatchedAt,
}

#[derive(DeriveIden)]
enum StudySessions {
    Table,
    Id,
    Title,
    InstructorId,
    Period,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Members::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Members::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Members::DepositorName)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Members::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Members::CreatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Members::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_members_depositor_name")
                    .table(Members::Table)
                    .col(Members::DepositorName)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::MemberId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Period).string_len(16).not_null())
                    .col(ColumnDef::new(Payments::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Payments::OriginalPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payments::FinalPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Payments::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // one open payment per (member, period)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_member_period_unique")
                    .table(Payments::Table)
                    .col(Payments::MemberId)
                    .col(Payments::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deposits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deposits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Deposits::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Deposits::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Deposits::DepositorName)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deposits::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Deposits::DepositedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deposits::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Coupons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Coupons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Coupons::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Coupons::DiscountAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Coupons::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IssuedCoupons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IssuedCoupons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IssuedCoupons::CouponId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IssuedCoupons::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IssuedCoupons::IsValid)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(IssuedCoupons::UsedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(IssuedCoupons::UsedPaymentId).big_integer())
                    .col(ColumnDef::new(IssuedCoupons::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PaymentCoupons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PaymentCoupons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PaymentCoupons::PaymentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PaymentCoupons::IssuedCouponId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PaymentCoupons::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // a coupon can be tentatively attached to at most one payment
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payment_coupons_issued_unique")
                    .table(PaymentCoupons::Table)
                    .col(PaymentCoupons::IssuedCouponId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointAccounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointAccounts::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointAccounts::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PointAccounts::TotalEarned)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PointAccounts::CreatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(PointAccounts::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_accounts_member_unique")
                    .table(PointAccounts::Table)
                    .col(PointAccounts::MemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::AccountId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Reason)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Period)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_transactions_account")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RewardReceipts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RewardReceipts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RewardReceipts::IdempotencyKey)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RewardReceipts::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RewardReceipts::PointTransactionId).big_integer())
                    .col(ColumnDef::new(RewardReceipts::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_reward_receipts_key_unique")
                    .table(RewardReceipts::Table)
                    .col(RewardReceipts::IdempotencyKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointShopDraws::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointShopDraws::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointShopDraws::MemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointShopDraws::Prize)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointShopDraws::PointTransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointShopDraws::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OutboxEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OutboxEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OutboxEvents::Kind).string_len(64).not_null())
                    .col(ColumnDef::new(OutboxEvents::Payload).json().not_null())
                    .col(ColumnDef::new(OutboxEvents::CreatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(OutboxEvents::DispatchedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_outbox_events_dispatched_at")
                    .table(OutboxEvents::Table)
                    .col(OutboxEvents::DispatchedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudySessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudySessions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudySessions::Title)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudySessions::InstructorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudySessions::Period)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StudySessions::CreatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudySessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OutboxEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointShopDraws::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RewardReceipts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PaymentCoupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IssuedCoupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Coupons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deposits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        Ok(())
    }
}
