pub mod connection;
pub mod rows;

use crate::models::expense::{ExpenseError, ExpenseQuery};
use crate::models::row::ExpenseRow;

/// Runs an expense procedure and hands back every row it produced.
///
/// Handlers are generic over this so they can be driven without PostgreSQL.
#[allow(async_fn_in_trait)]
pub trait ExpenseSource {
    async fn fetch_expenses(&self, query: &ExpenseQuery) -> Result<Vec<ExpenseRow>, ExpenseError>;
}
