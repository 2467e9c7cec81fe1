pub mod expense;
pub mod row;
