pub mod archive;
pub mod company;
pub mod document;
pub mod loaders;
pub mod operation;

pub use archive::DocumentKind;
pub use company::{CompanyCredential, DateRange};
pub use document::{CteFields, DocumentRecord, STATUS_AUTORIZADO, STATUS_CANCELADO, SUMMARY_HEADERS};
pub use loaders::load_company_rows;
pub use operation::{OperationResult, OperationStatus};
