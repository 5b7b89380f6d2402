use anyhow::Result;
use compute::account_balance;
use ledgerust::get_accounts;
use sea_orm::Database;

pub async fn print_balances(database_url: &str) -> Result<()> {
    let db = Database::connect(database_url).await?;

    let accounts = get_accounts(&db, None).await?;
    if accounts.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    for account in accounts {
        let balance = account_balance(&db, account.id).await?;
        println!("{:<30} {:>14}", account.name, balance);
    }

    Ok(())
}
