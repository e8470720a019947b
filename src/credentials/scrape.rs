//! Markup contract for credential minting.
//!
//! Everything the minter knows about the web UI's HTML lives here. Callers depend
//! on [`extract_token`] and [`extract_key_pair`]; a changed UI surfaces as a
//! [`ScrapeError`] from one of them.

use scraper::{ElementRef, Html, Selector};

use super::ApiCredentials;
use crate::errors::ScrapeError;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

/// Characters left around the secret by the UI's attribute quoting.
const QUOTE_CHARS: &[char] = &['\'', '"'];

/// Pull the authenticated CSRF token out of `<meta name="csrf-token" content="...">`.
pub fn extract_token(html: &str) -> Result<String, ScrapeError> {
    let document = Html::parse_document(html);
    document
        .select(&selector(r#"meta[name="csrf-token"]"#))
        .find_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(ScrapeError::MissingMetaToken)
}

/// Read the API key pair from the first data row of the first table.
///
/// The first row is the header. The client id is the text of the row's first
/// cell; the secret is the `content` attribute of the row's `<lk-hidden-field>`.
pub fn extract_key_pair(html: &str) -> Result<ApiCredentials, ScrapeError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&selector("table"))
        .next()
        .ok_or(ScrapeError::MissingTable)?;
    let row = table
        .select(&selector("tr"))
        .nth(1)
        .ok_or(ScrapeError::MissingDataRow)?;

    let client_id = row
        .select(&selector("td, th"))
        .next()
        .map(cell_text)
        .filter(|id| !id.is_empty())
        .ok_or(ScrapeError::MissingClientId)?;

    let client_secret = row
        .select(&selector("lk-hidden-field"))
        .find_map(|field| field.value().attr("content"))
        .map(|secret| secret.replace(QUOTE_CHARS, "").trim().to_string())
        .filter(|secret| !secret.is_empty())
        .ok_or(ScrapeError::MissingSecret)?;

    Ok(ApiCredentials {
        client_id,
        client_secret,
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}
