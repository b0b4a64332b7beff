//! Query parameter types for the financial read endpoints.
//!
//! Both snake_case and the camelCase names used by the grid UI are accepted.

use rfpeval_core::types::DbId;
use serde::Deserialize;

/// `?version_ids=1,2,3&tco_period=5&sort=tco`
#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams {
    #[serde(alias = "versionIds")]
    pub version_ids: Option<String>,
    #[serde(alias = "tcoPeriod")]
    pub tco_period: Option<String>,
    pub sort: Option<String>,
}

/// `?version_id=4&tco_period=5`
#[derive(Debug, Default, Deserialize)]
pub struct TreeParams {
    #[serde(alias = "versionId")]
    pub version_id: Option<DbId>,
    #[serde(alias = "tcoPeriod")]
    pub tco_period: Option<String>,
}
