//! # Account Commands

use clap::{Args, Subcommand};
use tracing::info;
use uuid::Uuid;

use super::{to_output, AppContext};
use crate::error::CliResult;
use discount_core::{Account, AccountKind};

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Add an account to the chart
    Add(AddArgs),

    /// List the chart of accounts
    List,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub code: String,

    #[arg(long)]
    pub name: String,

    /// payable, receivable, expense, income, tax, asset or liability
    #[arg(long)]
    pub kind: AccountKind,
}

pub async fn execute(ctx: &AppContext, command: AccountCommand) -> CliResult<serde_json::Value> {
    match command {
        AccountCommand::Add(args) => to_output(&add(ctx, args).await?),
        AccountCommand::List => to_output(&ctx.db.accounts().list(&ctx.company_id).await?),
    }
}

pub async fn add(ctx: &AppContext, args: AddArgs) -> CliResult<Account> {
    let account = Account::new(Uuid::new_v4().to_string(), args.code, args.name, args.kind)?;
    ctx.db.accounts().insert(&ctx.company_id, &account).await?;
    info!(code = %account.code, kind = %account.kind, "Account added");
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use crate::error::CliError;
    use discount_db::DbError;

    #[tokio::test]
    async fn test_add_and_list() {
        let ctx = context().await;
        let account = add(
            &ctx,
            AddArgs { code: "6100".into(), name: "Freight".into(), kind: AccountKind::Expense },
        )
        .await
        .unwrap();

        let listed = ctx.db.accounts().list(&ctx.company_id).await.unwrap();
        assert_eq!(listed.len(), 5);
        assert!(listed.contains(&account));
    }

    #[tokio::test]
    async fn test_duplicate_code() {
        let ctx = context().await;
        let err = add(
            &ctx,
            AddArgs { code: "6000".into(), name: "Again".into(), kind: AccountKind::Expense },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Db(DbError::UniqueViolation { .. })));
        assert_eq!(err.exit_code(), 2);
    }
}
