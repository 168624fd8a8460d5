//! Identifier validation
//!
//! Values are bound as query parameters, never spliced into query text. These
//! checks reject input that has no business reaching the store at all.

use regex::Regex;
use rglookup_core::{Error, IdentifierKind, Result};

/// An identifier that passed validation. Unchanged from the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedValue(String);

impl ValidatedValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Reject values containing a single quote.
pub fn validate(raw: &str) -> Result<ValidatedValue> {
    if raw.contains('\'') {
        return Err(Error::invalid_format("identifier contains invalid symbols"));
    }
    Ok(ValidatedValue(raw.to_string()))
}

/// Per-scheme allow-list applied on top of [`validate`].
#[derive(Clone, Debug)]
pub struct IdentifierValidator {
    max_len: usize,
}

impl Default for IdentifierValidator {
    fn default() -> Self {
        Self { max_len: 512 }
    }
}

impl IdentifierValidator {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn validate(&self, kind: IdentifierKind, raw: &str) -> Result<ValidatedValue> {
        let name = kind.display_name();
        let value = validate(raw)
            .map_err(|_| Error::invalid_format(format!("{name} contains invalid symbols")))?;

        if raw.is_empty() {
            return Err(Error::invalid_format(format!("{name} is empty")));
        }
        if raw.len() > self.max_len {
            return Err(Error::invalid_format(format!(
                "{name} is longer than {} bytes",
                self.max_len
            )));
        }
        let backslash_ok = kind == IdentifierKind::Doi;
        if raw
            .chars()
            .any(|c| c.is_control() || c.is_whitespace() || c == '"' || (c == '\\' && !backslash_ok))
        {
            return Err(Error::invalid_format(format!("{name} contains invalid symbols")));
        }

        match kind {
            IdentifierKind::Doi => check_doi(raw)?,
            IdentifierKind::Purl => check_purl(raw)?,
            IdentifierKind::Orcid => check_orcid(raw)?,
        }
        Ok(value)
    }
}

/// `10.<registrant>/<suffix>`. DOIs are matched as patterns, so they must also compile as one.
fn check_doi(raw: &str) -> Result<()> {
    let well_formed = raw
        .strip_prefix("10.")
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(registrant, suffix)| !registrant.is_empty() && !suffix.is_empty());
    if !well_formed {
        return Err(Error::invalid_format("DOI must look like 10.<registrant>/<suffix>"));
    }
    Regex::new(raw)
        .map(|_| ())
        .map_err(|_| Error::invalid_format("DOI is not a valid match pattern"))
}

fn check_purl(raw: &str) -> Result<()> {
    let url = url::Url::parse(raw)
        .map_err(|e| Error::invalid_format(format!("PURL is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::invalid_format("PURL must be an absolute http(s) URL"));
    }
    Ok(())
}

/// Bare `dddd-dddd-dddd-dddX` or the same behind `http(s)://orcid.org/`.
/// The check digit is not verified; stored values are matched as they are.
fn check_orcid(raw: &str) -> Result<()> {
    let bare = raw
        .strip_prefix("https://orcid.org/")
        .or_else(|| raw.strip_prefix("http://orcid.org/"))
        .unwrap_or(raw);

    let groups: Vec<&str> = bare.split('-').collect();
    let shaped = groups.len() == 4 && groups.iter().all(|g| g.len() == 4);
    let chars: Vec<char> = groups.concat().chars().collect();
    let digits_ok = chars.len() == 16
        && chars[..15].iter().all(|c| c.is_ascii_digit())
        && (chars[15].is_ascii_digit() || chars[15] == 'X');
    if !shaped || !digits_ok {
        return Err(Error::invalid_format("ORCID must look like 0000-0000-0000-000X"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_is_rejected() {
        assert!(validate("10.1/a'b").is_err());
        assert_eq!(validate("10.1/ab").unwrap().as_str(), "10.1/ab");
    }

    #[test]
    fn orcid_shape() {
        assert!(check_orcid("0000-0002-1825-0097").is_ok());
        assert!(check_orcid("https://orcid.org/0000-0002-1825-0097").is_ok());
        assert!(check_orcid("0000-0002-1694-233X").is_ok());
        // shape is all that is checked
        assert!(check_orcid("0000-0002-1825-0098").is_ok());
        assert!(check_orcid("0000-0002-1825").is_err());
        assert!(check_orcid("0000-0002-1825-00X7").is_err());
        assert!(check_orcid("0000-00021-825-0097").is_err());
    }

    #[test]
    fn doi_shape() {
        assert!(check_doi("10.1/abc").is_ok());
        assert!(check_doi("10.1002/(SICI)1097-4636").is_ok());
        assert!(check_doi("11.1/abc").is_err());
        assert!(check_doi("10./abc").is_err());
        assert!(check_doi("10.1/").is_err());
        assert!(check_doi("10.1/a[b").is_err());
    }
}
