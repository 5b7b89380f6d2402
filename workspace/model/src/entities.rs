//! This file serves as the root for all SeaORM entity modules.
//! The ledger schema lives here: accounts own transactions, payees and
//! categories are attached to transactions by nullable references, and
//! rules persist their declarative JSON form.

pub mod account;
pub mod category;
pub mod payee;
pub mod rule;
pub mod transaction;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::category::Entity as Category;
    pub use super::payee::Entity as Payee;
    pub use super::rule::Entity as Rule;
    pub use super::transaction::Entity as Transaction;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_transaction(
        db: &DatabaseConnection,
        account: &account::Model,
        payee: Option<&payee::Model>,
        category: Option<&category::Model>,
        amount: Decimal,
    ) -> Result<transaction::Model, DbErr> {
        transaction::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            account_id: Set(account.id),
            payee_id: Set(payee.map(|p| p.id)),
            category_id: Set(category.map(|c| c.id)),
            notes: Set(None),
            amount: Set(amount),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Create an account, a payee and a category
        let checking = account::ActiveModel {
            name: Set("Checking".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let grocer = payee::ActiveModel {
            name: Set("Grocery Store".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let food = category::ActiveModel {
            name: Set("Food".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Two live transactions and one that will be soft-deleted
        let groceries =
            insert_transaction(&db, &checking, Some(&grocer), Some(&food), Decimal::new(-5000, 2))
                .await?;
        insert_transaction(&db, &checking, Some(&grocer), Some(&food), Decimal::new(-1250, 2))
            .await?;
        let voided =
            insert_transaction(&db, &checking, None, None, Decimal::new(-999, 2)).await?;
        voided.soft_delete(&db).await?;

        // Relation helpers skip the tombstoned row
        let account_txs = checking.transactions(&db).await?;
        assert_eq!(account_txs.len(), 2);
        assert!(account_txs.iter().all(|t| !t.tombstone));

        let payee_txs = grocer.transactions(&db).await?;
        assert_eq!(payee_txs.len(), 2);

        let category_txs = food.transactions(&db).await?;
        assert_eq!(category_txs.len(), 2);

        // The tombstoned row is still physically present
        let all_rows = Transaction::find().all(&db).await?;
        assert_eq!(all_rows.len(), 3);

        // Deleting the payee detaches it without touching the transactions
        grocer.soft_delete(&db).await?;
        let reloaded = Transaction::find_by_id(groceries.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(reloaded.payee_id, None);
        assert_eq!(reloaded.category_id, Some(food.id));

        let payees = Payee::find().all(&db).await?;
        assert_eq!(payees.len(), 1);
        assert!(payees[0].tombstone);

        // Same set-null semantics for the category
        food.soft_delete(&db).await?;
        let reloaded = Transaction::find_by_id(groceries.id)
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(reloaded.category_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_split_and_transfer_navigation() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let wallet = account::ActiveModel {
            name: Set("Wallet".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // A synthetic parent with two ordered children
        let parent = transaction::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
            account_id: Set(wallet.id),
            amount: Set(Decimal::new(-3000, 2)),
            is_parent: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        for (position, cents) in [(0_i64, -2000_i64), (1, -1000)] {
            transaction::ActiveModel {
                date: Set(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
                account_id: Set(wallet.id),
                amount: Set(Decimal::new(cents, 2)),
                parent_id: Set(Some(parent.id)),
                sort_order: Set(position),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        let splits = parent.splits(&db).await?;
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].amount, Decimal::new(-2000, 2));
        assert_eq!(splits[1].amount, Decimal::new(-1000, 2));
        assert_eq!(splits[0].parent(&db).await?, Some(parent.clone()));

        // Cross-linked transfer halves resolve to each other
        let outgoing = transaction::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()),
            account_id: Set(wallet.id),
            amount: Set(Decimal::new(-500, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let incoming = transaction::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()),
            account_id: Set(wallet.id),
            amount: Set(Decimal::new(500, 2)),
            transfer_id: Set(Some(outgoing.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let mut outgoing_active: transaction::ActiveModel = outgoing.clone().into();
        outgoing_active.transfer_id = Set(Some(incoming.id));
        let outgoing = outgoing_active.update(&db).await?;

        assert_eq!(outgoing.transfer(&db).await?.unwrap().id, incoming.id);
        let incoming = Transaction::find_by_id(incoming.id).one(&db).await?.unwrap();
        assert_eq!(incoming.transfer(&db).await?.unwrap().id, outgoing.id);

        Ok(())
    }
}
