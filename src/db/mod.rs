pub mod company_queries;
pub mod metric_queries;
