//! Core domain for greendesk: statutes, periods, quota records, and the
//! derived state behind the quota form.

pub mod availability;
mod error;
pub mod form;
pub mod law;
pub mod pagination;
pub mod period;
pub mod quota;

pub use availability::{Availability, MonthState, QuarterStatus};
pub use error::CoreError;
pub use form::{FormError, QuotaForm, QuotaUpdate, Submission, ValidationErrors, target_path};
pub use law::Law;
pub use pagination::Pagination;
pub use period::{Month, Quarter, ViewMode, YearMonth};
pub use quota::{NewQuota, QuotaPayload, QuotaRecord};
