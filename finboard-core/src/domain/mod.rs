//! Domain types for FinBoard

pub mod bar;
pub mod locale;
pub mod session;
pub mod tips;

pub use bar::{PriceBar, TimeSeriesRecord};
pub use locale::Locale;
pub use session::{Page, Period, SessionContext, UploadedFile};
pub use tips::{TabularRecord, TipRecord, TIPS_COLUMNS};
