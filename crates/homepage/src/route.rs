//! Conventional route templates.
//!
//! A template is a `/` separated list of segments. Each segment is either a literal or a
//! parameter:
//!
//! - `{name}`: required parameter.
//! - `{name=value}`: parameter which takes `value` when the segment is missing.
//! - `{name?}`: optional parameter, must be the last segment.
//!
//! Literals compare without regard to ASCII case.
//!
//! # Example
//!
//! ```
//! use homepage::route::ConventionalRoute;
//!
//! let route = ConventionalRoute::parse("{controller=Home}/{action=Index}/{id?}").unwrap();
//! let values = route.matches("/home/privacy").unwrap();
//! assert_eq!(values.get("controller"), Some("home"));
//! assert_eq!(values.get("action"), Some("privacy"));
//! assert_eq!(values.get("id"), None);
//! ```
use std::fmt::{self, Debug, Formatter};

use percent_encoding::percent_decode_str;

/// Errors raised while parsing a route template.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    /// A segment between two `/` is empty.
    #[error("route template `{0}` contains an empty segment")]
    EmptySegment(String),
    /// Braces are not balanced in a segment.
    #[error("unbalanced braces in route segment `{0}`")]
    Unbalanced(String),
    /// A parameter has no name or a name with invalid characters.
    #[error("invalid parameter name in route segment `{0}`")]
    InvalidName(String),
    /// The same parameter name is used twice.
    #[error("duplicate route parameter `{0}`")]
    Duplicate(String),
    /// An optional parameter is followed by other segments.
    #[error("optional route parameter `{0}` must be the last segment")]
    OptionalNotLast(String),
}

#[derive(Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param {
        name: String,
        default: Option<String>,
        optional: bool,
    },
}

impl Debug for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "Literal({text:?})"),
            Self::Param {
                name,
                default: Some(default),
                ..
            } => write!(f, "Param({name}={default})"),
            Self::Param {
                name,
                optional: true,
                ..
            } => write!(f, "Param({name}?)"),
            Self::Param { name, .. } => write!(f, "Param({name})"),
        }
    }
}

/// Values captured by a matched route, in template order.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct RouteValues(Vec<(String, String)>);

impl RouteValues {
    /// Get a captured value, looking the name up without regard to ASCII case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Number of captured values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was captured.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A parsed route template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConventionalRoute {
    template: String,
    segments: Vec<Segment>,
}

impl ConventionalRoute {
    /// Parse a route template.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let trimmed = template.trim_matches('/');
        let mut segments: Vec<Segment> = Vec::new();
        if !trimmed.is_empty() {
            for part in trimmed.split('/') {
                if part.is_empty() {
                    return Err(RouteError::EmptySegment(template.to_owned()));
                }
                if let Some(Segment::Param {
                    name,
                    optional: true,
                    ..
                }) = segments.last()
                {
                    return Err(RouteError::OptionalNotLast(name.clone()));
                }
                let segment = parse_segment(part)?;
                if let Segment::Param { name, .. } = &segment {
                    let exists = segments.iter().any(|s| match s {
                        Segment::Param { name: other, .. } => other.eq_ignore_ascii_case(name),
                        Segment::Literal(_) => false,
                    });
                    if exists {
                        return Err(RouteError::Duplicate(name.clone()));
                    }
                }
                segments.push(segment);
            }
        }
        Ok(Self {
            template: template.to_owned(),
            segments,
        })
    }

    /// The template this route was parsed from.
    #[inline]
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Match a request path, returning the captured values.
    ///
    /// Empty segments are ignored and each segment is percent decoded before comparison.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<RouteValues> {
        let parts: Vec<_> = path
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| percent_decode_str(part).decode_utf8_lossy())
            .collect();
        if parts.len() > self.segments.len() {
            return None;
        }
        let mut values = Vec::with_capacity(self.segments.len());
        for (index, segment) in self.segments.iter().enumerate() {
            match (segment, parts.get(index)) {
                (Segment::Literal(text), Some(part)) => {
                    if !text.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                (Segment::Literal(_), None) => return None,
                (Segment::Param { name, .. }, Some(part)) => {
                    values.push((name.clone(), part.to_string()));
                }
                (
                    Segment::Param {
                        name,
                        default: Some(default),
                        ..
                    },
                    None,
                ) => values.push((name.clone(), default.clone())),
                (Segment::Param { optional: true, .. }, None) => {}
                (Segment::Param { .. }, None) => return None,
            }
        }
        Some(RouteValues(values))
    }
}

fn parse_segment(part: &str) -> Result<Segment, RouteError> {
    let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
        if part.contains(['{', '}']) {
            return Err(RouteError::Unbalanced(part.to_owned()));
        }
        return Ok(Segment::Literal(part.to_owned()));
    };
    if inner.contains(['{', '}']) {
        return Err(RouteError::Unbalanced(part.to_owned()));
    }
    let (name, default, optional) = if let Some((name, default)) = inner.split_once('=') {
        (name, Some(default.to_owned()), false)
    } else if let Some(name) = inner.strip_suffix('?') {
        (name, None, true)
    } else {
        (inner, None, false)
    };
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(RouteError::InvalidName(part.to_owned()));
    }
    Ok(Segment::Param {
        name: name.to_owned(),
        default,
        optional,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "{controller=Home}/{action=Index}/{id?}";

    fn route() -> ConventionalRoute {
        ConventionalRoute::parse(DEFAULT).unwrap()
    }

    #[test]
    fn test_parse() {
        let route = route();
        assert_eq!(route.template(), DEFAULT);
        assert_eq!(
            format!("{:?}", route.segments),
            "[Param(controller=Home), Param(action=Index), Param(id?)]"
        );
        let literal = ConventionalRoute::parse("/api/{version}/").unwrap();
        assert_eq!(format!("{:?}", literal.segments), r#"[Literal("api"), Param(version)]"#);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ConventionalRoute::parse("a//b"),
            Err(RouteError::EmptySegment("a//b".into()))
        );
        assert_eq!(
            ConventionalRoute::parse("{id"),
            Err(RouteError::Unbalanced("{id".into()))
        );
        assert_eq!(
            ConventionalRoute::parse("{{id}}"),
            Err(RouteError::Unbalanced("{{id}}".into()))
        );
        assert_eq!(
            ConventionalRoute::parse("{}"),
            Err(RouteError::InvalidName("{}".into()))
        );
        assert_eq!(
            ConventionalRoute::parse("{a-b}"),
            Err(RouteError::InvalidName("{a-b}".into()))
        );
        assert_eq!(
            ConventionalRoute::parse("{id}/{ID}"),
            Err(RouteError::Duplicate("ID".into()))
        );
        assert_eq!(
            ConventionalRoute::parse("{id?}/{action}"),
            Err(RouteError::OptionalNotLast("id".into()))
        );
    }

    #[test]
    fn test_defaults() {
        let values = route().matches("/").unwrap();
        assert_eq!(values.get("controller"), Some("Home"));
        assert_eq!(values.get("action"), Some("Index"));
        assert_eq!(values.get("id"), None);
        assert_eq!(values.len(), 2);

        let values = route().matches("/Home").unwrap();
        assert_eq!(values.get("action"), Some("Index"));
    }

    #[test]
    fn test_full_match() {
        let values = route().matches("/Home/Privacy/42/").unwrap();
        assert_eq!(values.get("controller"), Some("Home"));
        assert_eq!(values.get("ACTION"), Some("Privacy"));
        assert_eq!(values.get("id"), Some("42"));
    }

    #[test]
    fn test_too_many_segments() {
        assert!(route().matches("/Home/Index/1/2").is_none());
    }

    #[test]
    fn test_empty_segments_ignored() {
        let values = route().matches("//Home//ContactUs").unwrap();
        assert_eq!(values.get("action"), Some("ContactUs"));
    }

    #[test]
    fn test_percent_decoding() {
        let values = route().matches("/Home/Contact%55s/a%20b").unwrap();
        assert_eq!(values.get("action"), Some("ContactUs"));
        assert_eq!(values.get("id"), Some("a b"));
    }

    #[test]
    fn test_literals_and_required_params() {
        let route = ConventionalRoute::parse("api/{version}").unwrap();
        assert_eq!(route.matches("/API/v1").unwrap().get("version"), Some("v1"));
        assert!(route.matches("/api").is_none());
        assert!(route.matches("/other/v1").is_none());
        assert!(route.matches("/").is_none());
    }

    #[test]
    fn test_empty_template() {
        let route = ConventionalRoute::parse("").unwrap();
        assert!(route.matches("/").unwrap().is_empty());
        assert!(route.matches("/anything").is_none());
    }
}
