pub(crate) mod benchmarks;
pub(crate) mod health;
pub(crate) mod query;
