//! Query parameters for list endpoints

use crate::domain::ids::Endpoint;
use chrono::NaiveDateTime;

/// Timestamp format accepted by the `after`/`before` parameters
pub const DATE_PARAM_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Which records a list request selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFilter {
    /// No restriction
    All,
    /// Records created in `[after, before]`
    DateRange {
        after: NaiveDateTime,
        before: NaiveDateTime,
    },
    /// Records whose `field` is at least `value`
    FieldLowerBound { field: String, value: String },
}

/// Builds the query parameters for one list request, without the page number
///
/// `status=any` and every filter are only sent to endpoints that support date
/// filters; the customers endpoint receives `per_page` alone.
pub fn list_params(
    endpoint: Endpoint,
    filter: &FetchFilter,
    page_size: u32,
) -> Vec<(String, String)> {
    let mut params = vec![("per_page".to_string(), page_size.to_string())];

    if !endpoint.supports_date_filter() {
        return params;
    }

    params.push(("status".to_string(), "any".to_string()));

    match filter {
        FetchFilter::All => {}
        FetchFilter::DateRange { after, before } => {
            params.push((
                "after".to_string(),
                after.format(DATE_PARAM_FORMAT).to_string(),
            ));
            params.push((
                "before".to_string(),
                before.format(DATE_PARAM_FORMAT).to_string(),
            ));
        }
        FetchFilter::FieldLowerBound { field, value } => {
            params.push((field.clone(), value.clone()));
        }
    }

    params
}
