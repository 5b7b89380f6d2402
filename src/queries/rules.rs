use model::entities::rule;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::queries::transactions::{get_transactions, TransactionQuery};
use crate::rules::{Rule, RuleSet};

/// Persists a rule. With `run_immediately` the rule is also applied to
/// every currently matching transaction before returning, mutating their
/// fields in place.
#[instrument(skip(db, rule))]
pub async fn create_rule<C: ConnectionTrait>(
    db: &C,
    rule: &Rule,
    run_immediately: bool,
) -> Result<rule::Model> {
    let model = rule::ActiveModel {
        stage: Set(rule.stage.map(|s| s.as_str().to_string())),
        conditions_op: Set(rule.operation.as_db_str().to_string()),
        conditions: Set(serde_json::to_string(&rule.conditions)?),
        actions: Set(serde_json::to_string(&rule.actions)?),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!("Created rule {}", model.id);

    if run_immediately {
        let transactions = get_transactions(db, &TransactionQuery::default()).await?;
        let mut applied = 0usize;
        for tx in transactions {
            if rule.matches(&tx) {
                rule.apply(&tx)?.update(db).await?;
                applied += 1;
            }
        }
        debug!("Rule {} applied to {} transactions", model.id, applied);
    }

    Ok(model)
}

/// Loads all live rules as a [`RuleSet`], ordered pre, unstaged, post.
#[instrument(skip(db))]
pub async fn get_ruleset<C: ConnectionTrait>(db: &C) -> Result<RuleSet> {
    let models = rule::Entity::find()
        .filter(rule::Column::Tombstone.eq(false))
        .order_by_asc(rule::Column::Id)
        .all(db)
        .await?;

    let rules = models
        .iter()
        .map(Rule::from_model)
        .collect::<Result<Vec<_>>>()?;
    debug!("Loaded {} rules", rules.len());
    Ok(RuleSet::new(rules))
}
