#[cfg(test)]
mod integration_tests {
    use crate::error::LedgerError;
    use crate::queries::accounts::{create_account, get_accounts, AccountRef};
    use crate::queries::categories::get_or_create_category;
    use crate::queries::payees::get_or_create_payee;
    use crate::queries::rules::{create_rule, get_ruleset};
    use crate::queries::transactions::{
        create_splits, create_transaction, create_transfer, get_transactions, TransactionQuery,
    };
    use crate::rules::{
        Action, Condition, ConditionOp, ConditionsOp, Rule, RuleField, RuleStage, Value,
    };
    use crate::test_utils::test_utils::setup_test_db;
    use chrono::{Duration, NaiveDate, Utc};
    use compute::{account_balance, category_balance, payee_balance};
    use model::entities::transaction;
    use rust_decimal::Decimal;
    use sea_orm::{EntityTrait, TransactionTrait};
    use serde_json::json;

    #[tokio::test]
    async fn test_account_relationships() {
        let db = setup_test_db().await;
        let today = Utc::now().date_naive();

        let bank = create_account(&db, "Bank", Some(Decimal::from(5000)))
            .await
            .unwrap();
        create_account(&db, "Savings", None).await.unwrap();
        let landlord = get_or_create_payee(&db, "Landlord").await.unwrap();
        let rent = get_or_create_category(&db, "Rent").await.unwrap();

        let rent_payment = create_transaction(
            &db,
            today,
            "Bank",
            Some("Landlord"),
            Some("Paying rent"),
            Some("Rent"),
            Decimal::from(-1200),
        )
        .await
        .unwrap();
        let utilities_payment = create_transaction(
            &db,
            today,
            "Bank",
            Some("Landlord"),
            Some("Utilities"),
            Some("Rent"),
            Decimal::from(-50),
        )
        .await
        .unwrap();
        create_transfer(
            &db,
            today,
            "Bank",
            "Savings",
            Decimal::from(200),
            Some("Saving money"),
        )
        .await
        .unwrap();

        // Derived balances over the live rows
        assert_eq!(
            account_balance(&db, bank.id).await.unwrap(),
            Decimal::from(3550)
        );
        assert_eq!(
            payee_balance(&db, landlord.id).await.unwrap(),
            Decimal::from(-1250)
        );
        assert_eq!(
            category_balance(&db, rent.id).await.unwrap(),
            Decimal::from(-1250)
        );
        assert_eq!(rent_payment.category_id, Some(rent.id));

        // Includes starting balance and the outgoing transfer half
        assert_eq!(bank.transactions(&db).await.unwrap().len(), 4);
        assert_eq!(landlord.transactions(&db).await.unwrap().len(), 2);
        assert_eq!(rent.transactions(&db).await.unwrap().len(), 2);

        // Void the utilities payment; every balance follows immediately
        utilities_payment.soft_delete(&db).await.unwrap();

        assert_eq!(
            account_balance(&db, bank.id).await.unwrap(),
            Decimal::from(3600)
        );
        assert_eq!(
            payee_balance(&db, landlord.id).await.unwrap(),
            Decimal::from(-1200)
        );
        assert_eq!(
            category_balance(&db, rent.id).await.unwrap(),
            Decimal::from(-1200)
        );
        assert_eq!(bank.transactions(&db).await.unwrap().len(), 3);
        assert_eq!(landlord.transactions(&db).await.unwrap().len(), 1);
        assert_eq!(rent.transactions(&db).await.unwrap().len(), 1);

        // Delete the payee and the category: the references are nulled,
        // the transactions themselves survive
        rent.soft_delete(&db).await.unwrap();
        landlord.soft_delete(&db).await.unwrap();

        let rent_payment = transaction::Entity::find_by_id(rent_payment.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rent_payment.category_id, None);
        assert_eq!(rent_payment.payee_id, None);

        // Find the deleted transaction again
        let deleted = get_transactions(
            &db,
            &TransactionQuery {
                start_date: Some(today - Duration::days(1)),
                end_date: Some(today + Duration::days(1)),
                notes: Some("Util"),
                account: Some(AccountRef::from(&bank)),
                include_deleted: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].id, utilities_payment.id);
        assert!(deleted[0].tombstone);

        assert_eq!(get_accounts(&db, Some("Bank")).await.unwrap(), vec![bank]);
    }

    #[tokio::test]
    async fn test_create_splits() {
        let db = setup_test_db().await;
        let today = Utc::now().date_naive();

        let bank = create_account(&db, "Bank", None).await.unwrap();
        let dining = create_transaction(
            &db,
            today,
            &bank,
            None,
            None,
            Some("Dining"),
            Decimal::new(-100, 1),
        )
        .await
        .unwrap();
        let taxes = create_transaction(
            &db,
            today,
            &bank,
            None,
            None,
            Some("Taxes"),
            Decimal::new(-25, 1),
        )
        .await
        .unwrap();

        let parent = create_splits(&db, &[dining.clone(), taxes.clone()], Some("Dining"))
            .await
            .unwrap();
        assert_eq!(parent.amount, Decimal::new(-125, 1));

        // The default query still returns the children, each pointing at
        // the synthetic parent
        let transactions = get_transactions(&db, &TransactionQuery::default())
            .await
            .unwrap();
        assert_eq!(transactions.len(), 2);
        assert!(transactions.iter().any(|t| t.id == dining.id));
        assert!(transactions.iter().any(|t| t.id == taxes.id));
        for tx in &transactions {
            assert_eq!(tx.parent_id, Some(parent.id));
            assert_eq!(tx.parent(&db).await.unwrap(), Some(parent.clone()));
        }

        // Asking for parents yields exactly the synthetic row
        let parents = get_transactions(
            &db,
            &TransactionQuery {
                is_parent: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].id, parent.id);

        let splits = parents[0].splits(&db).await.unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].id, dining.id);
        assert_eq!(splits[1].id, taxes.id);
    }

    #[tokio::test]
    async fn test_create_splits_error() {
        let db = setup_test_db().await;
        let today = Utc::now().date_naive();

        let bank = create_account(&db, "Bank", None).await.unwrap();
        let wallet = create_account(&db, "Wallet", None).await.unwrap();
        let t1 = create_transaction(
            &db,
            today,
            &bank,
            None,
            None,
            Some("Dining"),
            Decimal::new(-100, 1),
        )
        .await
        .unwrap();
        let t2 = create_transaction(
            &db,
            today,
            &wallet,
            None,
            None,
            Some("Taxes"),
            Decimal::new(-25, 1),
        )
        .await
        .unwrap();
        let t3 = create_transaction(
            &db,
            today - Duration::days(1),
            &bank,
            None,
            None,
            Some("Taxes"),
            Decimal::new(-25, 1),
        )
        .await
        .unwrap();

        let err = create_splits(&db, &[t1.clone(), t2], None).await.unwrap_err();
        assert!(matches!(err, LedgerError::SplitFieldMismatch("account")));
        assert!(err
            .to_string()
            .contains("must be the same for all transactions in splits"));

        let err = create_splits(&db, &[t1, t3], None).await.unwrap_err();
        assert!(matches!(err, LedgerError::SplitFieldMismatch("date")));
        assert!(err
            .to_string()
            .contains("must be the same for all transactions in splits"));

        // No parent row was created by either failed attempt
        let parents = get_transactions(
            &db,
            &TransactionQuery {
                is_parent: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(parents.is_empty());
    }

    #[tokio::test]
    async fn test_create_splits_rejects_empty_group() {
        let db = setup_test_db().await;

        let err = create_splits(&db, &[], None).await.unwrap_err();
        assert!(matches!(err, LedgerError::EmptySplits));
    }

    #[tokio::test]
    async fn test_create_transaction_without_account_error() {
        let db = setup_test_db().await;
        let today = Utc::now().date_naive();

        let err = create_transaction(&db, today, "foo", None, None, None, Decimal::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
        assert!(err.to_string().contains("foo"));

        let err = create_transaction(&db, today, 999, None, None, None, Decimal::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));

        // A soft-deleted account is no longer a valid target either
        let closed = create_account(&db, "Old", None).await.unwrap();
        closed.soft_delete(&db).await.unwrap();
        let err = create_transaction(&db, today, "Old", None, None, None, Decimal::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn test_create_transfer_links_both_halves() {
        let db = setup_test_db().await;
        let today = Utc::now().date_naive();

        let bank = create_account(&db, "Bank", Some(Decimal::from(1000)))
            .await
            .unwrap();
        let savings = create_account(&db, "Savings", None).await.unwrap();

        let (outgoing, incoming) = create_transfer(
            &db,
            today,
            &bank,
            &savings,
            Decimal::from(200),
            Some("Saving money"),
        )
        .await
        .unwrap();

        assert_eq!(outgoing.amount, Decimal::from(-200));
        assert_eq!(incoming.amount, Decimal::from(200));
        assert_eq!(outgoing.account_id, bank.id);
        assert_eq!(incoming.account_id, savings.id);
        assert_eq!(outgoing.transfer_id, Some(incoming.id));
        assert_eq!(incoming.transfer_id, Some(outgoing.id));
        assert_eq!(outgoing.transfer(&db).await.unwrap().unwrap().id, incoming.id);

        assert_eq!(
            account_balance(&db, bank.id).await.unwrap(),
            Decimal::from(800)
        );
        assert_eq!(
            account_balance(&db, savings.id).await.unwrap(),
            Decimal::from(200)
        );
    }

    #[tokio::test]
    async fn test_mutations_share_the_unit_of_work_until_commit() {
        let db = setup_test_db().await;
        let today = Utc::now().date_naive();

        let txn = db.begin().await.unwrap();
        let bank = create_account(&txn, "Bank", Some(Decimal::from(100)))
            .await
            .unwrap();
        create_transaction(&txn, today, &bank, None, None, None, Decimal::from(-40))
            .await
            .unwrap();

        // Uncommitted work is already visible inside the same unit of work
        assert_eq!(
            account_balance(&txn, bank.id).await.unwrap(),
            Decimal::from(60)
        );

        txn.commit().await.unwrap();
        assert_eq!(
            account_balance(&db, bank.id).await.unwrap(),
            Decimal::from(60)
        );
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let db = setup_test_db().await;

        let first = get_or_create_payee(&db, "Landlord").await.unwrap();
        let second = get_or_create_payee(&db, "Landlord").await.unwrap();
        assert_eq!(first.id, second.id);

        let first = get_or_create_category(&db, "Rent").await.unwrap();
        let second = get_or_create_category(&db, "Rent").await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_rule_insertion_method() {
        let db = setup_test_db().await;

        // Create one example transaction
        let bank = create_account(&db, "Bank", None).await.unwrap();
        create_transaction(
            &db,
            NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            &bank,
            None,
            None,
            None,
            Decimal::ZERO,
        )
        .await
        .unwrap();

        // Create and run the rule
        let action = Action::set(RuleField::Cleared, Value::Boolean(true));
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"field": "cleared", "op": "set", "type": "boolean", "value": true})
        );
        let condition = Condition::new(
            RuleField::Date,
            ConditionOp::IsApprox,
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        );
        assert_eq!(
            serde_json::to_value(&condition).unwrap(),
            json!({"field": "date", "op": "isapprox", "type": "date", "value": "2024-01-02"})
        );

        let rule = Rule::new(
            vec![condition.clone()],
            ConditionsOp::All,
            vec![action.clone()],
            Some(RuleStage::Pre),
        );
        let created = create_rule(&db, &rule, true).await.unwrap();

        // The persisted JSON round-trips back to the typed form
        assert_eq!(
            serde_json::from_str::<Vec<Condition>>(&created.conditions).unwrap(),
            vec![condition]
        );
        assert_eq!(
            serde_json::from_str::<Vec<Action>>(&created.actions).unwrap(),
            vec![action]
        );
        assert_eq!(created.conditions_op, "and");
        assert_eq!(created.stage.as_deref(), Some("pre"));

        // The transaction two days off still matched and was cleared
        let transactions = get_transactions(&db, &TransactionQuery::default())
            .await
            .unwrap();
        assert!(transactions[0].cleared);

        let ruleset = get_ruleset(&db).await.unwrap();
        assert_eq!(ruleset.rules().len(), 1);
        assert_eq!(
            ruleset.to_string(),
            "If all of these conditions match 'date' isapprox '2024-01-02' then set 'cleared' to 'True'"
        );
    }

    #[tokio::test]
    async fn test_rule_outside_window_leaves_transactions_alone() {
        let db = setup_test_db().await;

        let bank = create_account(&db, "Bank", None).await.unwrap();
        create_transaction(
            &db,
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            &bank,
            None,
            None,
            None,
            Decimal::ZERO,
        )
        .await
        .unwrap();

        let rule = Rule::new(
            vec![Condition::new(
                RuleField::Date,
                ConditionOp::IsApprox,
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            )],
            ConditionsOp::All,
            vec![Action::set(RuleField::Cleared, Value::Boolean(true))],
            Some(RuleStage::Pre),
        );
        create_rule(&db, &rule, true).await.unwrap();

        let transactions = get_transactions(&db, &TransactionQuery::default())
            .await
            .unwrap();
        assert!(!transactions[0].cleared);
    }

    #[tokio::test]
    async fn test_ruleset_orders_rules_by_stage() {
        let db = setup_test_db().await;

        let rule_with_stage = |stage| {
            Rule::new(
                vec![],
                ConditionsOp::Any,
                vec![Action::set(RuleField::Notes, Value::String("x".to_string()))],
                stage,
            )
        };

        create_rule(&db, &rule_with_stage(Some(RuleStage::Post)), false)
            .await
            .unwrap();
        create_rule(&db, &rule_with_stage(None), false).await.unwrap();
        create_rule(&db, &rule_with_stage(Some(RuleStage::Pre)), false)
            .await
            .unwrap();

        let ruleset = get_ruleset(&db).await.unwrap();
        let stages: Vec<_> = ruleset.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![Some(RuleStage::Pre), None, Some(RuleStage::Post)]
        );
    }
}
