use crate::requests::expense::{
    CategoryExpensesRequest, CustomExpensesRequest, MonthlyExpensesRequest,
};
use thiserror::Error;

pub const MONTHLY_REQUIRED: &str = "Month and year are required";
pub const CATEGORY_REQUIRED: &str = "Category, start date and end date are required";
pub const CUSTOM_REQUIRED: &str = "Min amount, max amount, start date and end date are required";

#[derive(Error, Debug)]
pub enum ExpenseError {
    #[error("{0}")]
    Validation(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Backend(String),
}

/// Validated parameters for one of the expense procedures.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseQuery {
    Monthly {
        month: i32,
        year: i32,
    },
    Category {
        category: String,
        start_date: String,
        end_date: String,
    },
    Custom {
        min_amount: f64,
        max_amount: f64,
        start_date: String,
        end_date: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i32),
    Float(f64),
    Text(String),
}

/// A positional procedure argument and the SQL type it is cast to.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub value: ArgValue,
    pub sql_type: &'static str,
}

impl Argument {
    fn int(value: i32) -> Self {
        Self { value: ArgValue::Int(value), sql_type: "integer" }
    }

    fn numeric(value: f64) -> Self {
        Self { value: ArgValue::Float(value), sql_type: "numeric" }
    }

    fn text(value: &str) -> Self {
        Self { value: ArgValue::Text(value.to_string()), sql_type: "text" }
    }

    fn date(value: &str) -> Self {
        Self { value: ArgValue::Text(value.to_string()), sql_type: "date" }
    }
}

impl ExpenseQuery {
    pub fn procedure(&self) -> &'static str {
        match self {
            ExpenseQuery::Monthly { .. } => "get_monthly_expenses",
            ExpenseQuery::Category { .. } => "get_category_expenses",
            ExpenseQuery::Custom { .. } => "get_custom_expenses",
        }
    }

    /// Session-scoped table the procedure fills with its result rows.
    pub fn temp_table(&self) -> &'static str {
        match self {
            ExpenseQuery::Monthly { .. } => "temp_monthly_expenses",
            ExpenseQuery::Category { .. } => "temp_category_expenses",
            ExpenseQuery::Custom { .. } => "temp_custom_expenses",
        }
    }

    pub fn arguments(&self) -> Vec<Argument> {
        match self {
            ExpenseQuery::Monthly { month, year } => {
                vec![Argument::int(*month), Argument::int(*year)]
            }
            ExpenseQuery::Category { category, start_date, end_date } => vec![
                Argument::text(category),
                Argument::date(start_date),
                Argument::date(end_date),
            ],
            ExpenseQuery::Custom { min_amount, max_amount, start_date, end_date } => vec![
                Argument::numeric(*min_amount),
                Argument::numeric(*max_amount),
                Argument::date(start_date),
                Argument::date(end_date),
            ],
        }
    }

    /// `$1::integer, $2::integer` style argument list.
    fn placeholders(&self) -> String {
        self.arguments()
            .iter()
            .enumerate()
            .map(|(i, arg)| format!("${}::{}", i + 1, arg.sql_type))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn call_statement(&self) -> String {
        format!("CALL {}({})", self.procedure(), self.placeholders())
    }

    pub fn select_temp_table_statement(&self) -> String {
        format!("SELECT * FROM {}", self.temp_table())
    }

    pub fn select_function_statement(&self) -> String {
        format!("SELECT * FROM {}({})", self.procedure(), self.placeholders())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_int(value: Option<&str>) -> Option<i32> {
    value?.trim().parse().ok()
}

fn parse_amount(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

impl TryFrom<MonthlyExpensesRequest> for ExpenseQuery {
    type Error = ExpenseError;

    fn try_from(request: MonthlyExpensesRequest) -> Result<Self, Self::Error> {
        let month = parse_int(request.month.as_deref());
        let year = parse_int(request.year.as_deref());

        match (month, year) {
            (Some(month), Some(year)) => Ok(ExpenseQuery::Monthly { month, year }),
            _ => Err(ExpenseError::Validation(MONTHLY_REQUIRED)),
        }
    }
}

impl TryFrom<CategoryExpensesRequest> for ExpenseQuery {
    type Error = ExpenseError;

    fn try_from(request: CategoryExpensesRequest) -> Result<Self, Self::Error> {
        match (
            non_empty(request.category),
            non_empty(request.start_date),
            non_empty(request.end_date),
        ) {
            (Some(category), Some(start_date), Some(end_date)) => Ok(ExpenseQuery::Category {
                category,
                start_date,
                end_date,
            }),
            _ => Err(ExpenseError::Validation(CATEGORY_REQUIRED)),
        }
    }
}

impl TryFrom<CustomExpensesRequest> for ExpenseQuery {
    type Error = ExpenseError;

    fn try_from(request: CustomExpensesRequest) -> Result<Self, Self::Error> {
        match (
            parse_amount(request.min_amount.as_deref()),
            parse_amount(request.max_amount.as_deref()),
            non_empty(request.start_date),
            non_empty(request.end_date),
        ) {
            (Some(min_amount), Some(max_amount), Some(start_date), Some(end_date)) => {
                Ok(ExpenseQuery::Custom {
                    min_amount,
                    max_amount,
                    start_date,
                    end_date,
                })
            }
            _ => Err(ExpenseError::Validation(CUSTOM_REQUIRED)),
        }
    }
}
