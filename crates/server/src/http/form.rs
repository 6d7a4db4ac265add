//! Search form decoding.

use url::form_urlencoded;

use super::xsrf::XSRF_NAME;
use crate::error::ServerError;

/// Fields submitted by the search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub search: Option<String>,
    pub earliest_time: Option<String>,
    pub latest_time: Option<String>,
    /// Form token echoed from the `_xsrf` cookie.
    pub xsrf: Option<String>,
}

impl SearchForm {
    /// The query; it is required and must not be blank.
    pub fn query(&self) -> Result<&str, ServerError> {
        self.search
            .as_deref()
            .ok_or(ServerError::MissingParameter("search"))
    }
}

/// Decode an `application/x-www-form-urlencoded` body.
///
/// Blank fields are treated as absent. Unknown fields are ignored; the last
/// value of a repeated field wins.
pub fn parse_search_form(body: &[u8]) -> SearchForm {
    let mut form = SearchForm::default();

    for (key, value) in form_urlencoded::parse(body) {
        let value = value.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        match &*key {
            "search" => form.search = value,
            "earliest_time" => form.earliest_time = value,
            "latest_time" => form.latest_time = value,
            XSRF_NAME => form.xsrf = value,
            _ => {}
        }
    }

    form
}
