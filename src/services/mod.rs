pub mod benchmark_service;
pub mod llm_service;
pub mod metric_service;
pub mod metric_store;
pub mod numeric;
pub mod periods;
pub mod portfolio_service;
pub mod query_executor;
pub mod query_interpreter;
pub mod stats;
pub mod value_format;
