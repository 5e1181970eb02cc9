mod benchmark;
mod company;
mod metric;
mod query;

pub use benchmark::{CompanyBenchmark, CompanyGrowth, GrowthDistributionResponse, MetricBenchmarkResponse};
pub use company::{Company, CompanyFilters};
pub use metric::{MetricRecord, PeriodType};
pub use query::{
    AggregateKind, ChartPoint, PortfolioQuestion, QueryResult, RankOrder, StructuredQuery,
};
