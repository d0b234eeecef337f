//! CLI handlers for `wayfarer expense` subcommands.

use anyhow::{Context, Result};

use wayfarer_api::ApiClient;
use wayfarer_api::models::{Expense, NewExpense};

use crate::ExpenseCommands;
use crate::resolve::resolve_plan_id_remote;

pub async fn run_expense_command(command: ExpenseCommands, client: &ApiClient) -> Result<()> {
    match command {
        ExpenseCommands::List { plan } => {
            let plan_id = resolve_plan_id_remote(client, &plan).await?;
            let expenses = client
                .expenses(plan_id)
                .await
                .context("failed to load expenses")?;
            print_expenses(&expenses);
            Ok(())
        }
        ExpenseCommands::Add {
            plan,
            amount,
            category,
            description,
            date,
        } => {
            let plan_id = resolve_plan_id_remote(client, &plan).await?;
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let expense = client
                .add_expense(&NewExpense {
                    plan_id,
                    category,
                    amount,
                    description,
                    date,
                })
                .await
                .context("failed to record expense")?;
            println!(
                "Recorded {:.2} ({}) on {}.",
                expense.amount, expense.category, expense.date
            );
            Ok(())
        }
    }
}

fn print_expenses(expenses: &[Expense]) {
    if expenses.is_empty() {
        println!("No expenses recorded.");
        return;
    }

    let cat_w = expenses
        .iter()
        .map(|e| e.category.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    println!("{:<10}  {:<cat_w$}  {:>10}  DESCRIPTION", "DATE", "CATEGORY", "AMOUNT");
    for e in expenses {
        println!(
            "{:<10}  {:<cat_w$}  {:>10.2}  {}",
            e.date.to_string(),
            e.category,
            e.amount,
            e.description
        );
    }
    println!("{:<10}  {:<cat_w$}  {:>10.2}", "", "TOTAL", total(expenses));
}

fn total(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}
