//! Reports for PumpLedger
//!
//! Daily summaries, the HPCL account ledger, customer credit, tank stock
//! and the station dashboard, plus the analytics over aggregated days:
//! anomalies, sales trends and stock depletion.

pub mod anomalies;
pub mod customer_credit;
pub mod daily_summary;
pub mod dashboard;
pub mod depletion;
pub mod hpcl_ledger;
mod stats;
pub mod stock;
pub mod trends;

pub use anomalies::{Anomaly, AnomalyKind, AnomalyReport, Severity};
pub use customer_credit::{CreditOverviewReport, CustomerBalance, CustomerHistoryReport};
pub use daily_summary::{DailySummaryReport, SummaryTotals};
pub use dashboard::Dashboard;
pub use depletion::{DepletionForecast, DepletionReport, DepletionThresholds, StockStatus};
pub use hpcl_ledger::{HpclLedgerReport, LedgerEntry, LedgerEntryKind, LedgerMetrics};
pub use stock::{FuelStock, StockReport, TankStock};
pub use trends::{SalesTrend, SalesTrendReport, TrendDirection, Volatility};
