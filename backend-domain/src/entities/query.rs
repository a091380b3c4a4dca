// Query parameters accepted by the read endpoints
//
// Numeric fields arrive as strings and are validated by the application
// layer so malformed input maps to a 400 with a readable message.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeriodQuery {
    pub year: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PairingQuery {
    pub year: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub granularity: Option<String>,
    pub loadout_key: Option<String>,
}

impl PairingQuery {
    pub fn period(&self) -> PeriodQuery {
        PeriodQuery {
            year: self.year.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportListQuery {
    pub governor: Option<String>,
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub limit: Option<String>,
}
