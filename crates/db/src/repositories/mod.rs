//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod financial_template_repo;
pub mod offer_value_repo;
pub mod offer_version_repo;
pub mod rfp_repo;
pub mod supplier_repo;
pub mod template_line_repo;

pub use financial_template_repo::FinancialTemplateRepo;
pub use offer_value_repo::OfferValueRepo;
pub use offer_version_repo::OfferVersionRepo;
pub use rfp_repo::RfpRepo;
pub use supplier_repo::SupplierRepo;
pub use template_line_repo::TemplateLineRepo;
