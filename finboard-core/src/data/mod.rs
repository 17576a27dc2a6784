//! Data acquisition, validation and export

pub mod export;
pub mod fetch;
pub mod provider;
pub mod synthetic;
pub mod upload;
pub mod validate;
pub mod yahoo;

pub use export::{
    parse_series_csv, series_file_name, series_to_csv, table_file_name, table_to_csv,
    ExportError,
};
pub use fetch::fetch_series;
pub use provider::{
    DataError, DataProvider, DataSource, FetchOutcome, OfflineProvider, RawBar, RawSeries,
    RawTable, RawValue,
};
pub use synthetic::{SyntheticSeries, SyntheticTips};
pub use upload::{inspect_upload, missing_counts, read_upload, MissingCount, UploadReport};
pub use validate::{validate_series, validate_table, ValidationError};
pub use yahoo::YahooProvider;
