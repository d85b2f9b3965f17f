//! Parsed identity of a discovered image.

use crate::error::ParseError;

/// Identity of one discovered image: id, source URL and display title.
///
/// Built once from a discovery response and owned by the task that fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    id: String,
    url: String,
    title: String,
}

impl ImageDescriptor {
    /// Builds a descriptor from the image URL and optional title text.
    ///
    /// The id is the last path segment of `url` without its query string.
    /// A missing or blank title falls back to the id.
    pub fn from_parts(url: &str, title: Option<&str>) -> Result<Self, ParseError> {
        let id = id_from_url(url).ok_or_else(|| ParseError::ImageUrl(url.to_string()))?;
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => id.clone(),
        };
        Ok(Self {
            id,
            url: url.to_string(),
            title,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Filename stem used when the image is persisted.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl std::fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?}) <{}>", self.id, self.title, self.url)
    }
}

/// Last non-empty path segment of an absolute URL, query and fragment excluded.
///
/// Returns `None` if the URL does not parse or has no path segment.
pub fn id_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
