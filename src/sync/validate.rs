use url::Url;

use crate::app::ValidationError;

/// Accept an absolute http(s) URL that is not among `known`.
///
/// Returns the URL in normalized form; uniqueness is checked on that form.
pub fn validate_url<'a, I>(candidate: &str, known: I) -> Result<Url, ValidationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidate = candidate.trim();
    let url = Url::parse(candidate).map_err(|_| ValidationError::Invalid(candidate.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ValidationError::Invalid(candidate.to_string()));
    }

    if known.into_iter().any(|k| k == url.as_str()) {
        return Err(ValidationError::AlreadyAdded(url.to_string()));
    }

    Ok(url)
}
