//! What the dashboards compute on top of the gateway: typed calls, the
//! concurrent first load, derived option lists, report filtering and CSV.

pub mod client;
pub mod export;
pub mod filter;
pub mod loader;
pub mod views;

pub use client::{ ClientError, GatewayClient };
pub use export::{ historical_csv, report_csv, CsvExport, CsvTable };
pub use filter::{ FetchTicket, FilterError, FilterStage, LatestRequest, ReportFilter };
pub use loader::{ load_admin_overview, load_history_filters, AdminOverview, BatchOption, HistoryFilters };
pub use views::{
    defaulters,
    filter_students,
    history_marks,
    is_defaulter,
    lecture_type_options,
    parse_absent_rolls,
    requires_sub_batch,
    split_defaulters,
    sub_batch_numbers,
    unique_batches,
    unique_by_key,
    DefaulterThreshold,
    MissingMark,
    Searchable,
};
