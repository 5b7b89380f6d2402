use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create accounts table
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(pk_auto(Accounts::Id))
                    .col(string(Accounts::Name).unique_key())
                    .col(boolean(Accounts::Closed).default(false))
                    .col(boolean(Accounts::Tombstone).default(false))
                    .to_owned(),
            )
            .await?;

        // Create payees table
        manager
            .create_table(
                Table::create()
                    .table(Payees::Table)
                    .if_not_exists()
                    .col(pk_auto(Payees::Id))
                    .col(string(Payees::Name).unique_key())
                    .col(boolean(Payees::Tombstone).default(false))
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Name).unique_key())
                    .col(boolean(Categories::Tombstone).default(false))
                    .to_owned(),
            )
            .await?;

        // Create transactions table
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(date(Transactions::Date))
                    .col(integer(Transactions::AccountId))
                    .col(integer_null(Transactions::PayeeId))
                    .col(integer_null(Transactions::CategoryId))
                    .col(string_null(Transactions::Notes))
                    .col(decimal(Transactions::Amount).decimal_len(16, 4))
                    .col(boolean(Transactions::Cleared).default(false))
                    .col(boolean(Transactions::IsParent).default(false))
                    .col(integer_null(Transactions::ParentId))
                    .col(integer_null(Transactions::TransferId))
                    .col(boolean(Transactions::StartingBalanceFlag).default(false))
                    .col(big_integer(Transactions::SortOrder).default(0))
                    .col(boolean(Transactions::Tombstone).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_account")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_payee")
                            .from(Transactions::Table, Transactions::PayeeId)
                            .to(Payees::Table, Payees::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_parent")
                            .from(Transactions::Table, Transactions::ParentId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_transfer")
                            .from(Transactions::Table, Transactions::TransferId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create rules table
        manager
            .create_table(
                Table::create()
                    .table(Rules::Table)
                    .if_not_exists()
                    .col(pk_auto(Rules::Id))
                    .col(string_null(Rules::Stage))
                    .col(string(Rules::ConditionsOp))
                    .col(text(Rules::Conditions))
                    .col(text(Rules::Actions))
                    .col(boolean(Rules::Tombstone).default(false))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Rules::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Payees::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    Name,
    Closed,
    Tombstone,
}

#[derive(DeriveIden)]
enum Payees {
    Table,
    Id,
    Name,
    Tombstone,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Tombstone,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Date,
    AccountId,
    PayeeId,
    CategoryId,
    Notes,
    Amount,
    Cleared,
    IsParent,
    ParentId,
    TransferId,
    StartingBalanceFlag,
    SortOrder,
    Tombstone,
}

#[derive(DeriveIden)]
enum Rules {
    Table,
    Id,
    Stage,
    ConditionsOp,
    Conditions,
    Actions,
    Tombstone,
}
