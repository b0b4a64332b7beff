pub mod financial_summary;
pub mod financial_template;
pub mod formula;
pub mod offer_value;
pub mod offer_version;
pub mod template_line;
