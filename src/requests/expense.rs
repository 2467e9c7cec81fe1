use serde::Deserialize;

// Values stay raw strings so that parse failures become the endpoint's own 400.

#[derive(Debug, Deserialize)]
pub struct MonthlyExpensesRequest {
    pub month: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryExpensesRequest {
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomExpensesRequest {
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
