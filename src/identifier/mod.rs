//! Post identifier handling for Blog-Harvest
//!
//! This module provides the canonical `PostIdentifier` type and the URL
//! normalization that maps any supplied post link onto its mobile variant.

mod normalize;

use crate::UrlResult;
use std::fmt;
use url::Url;

pub use normalize::normalize_post_url;

/// Canonical reference to one blog post
///
/// Always holds a normalized URL, so two identifiers built from different
/// spellings of the same post compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostIdentifier {
    url: Url,
}

impl PostIdentifier {
    /// Parses and normalizes a post URL
    ///
    /// # Examples
    ///
    /// ```
    /// use blog_harvest::PostIdentifier;
    ///
    /// let id = PostIdentifier::parse("https://blog.naver.com/user/42").unwrap();
    /// assert_eq!(id.as_str(), "https://m.blog.naver.com/user/42");
    /// ```
    pub fn parse(input: &str) -> UrlResult<Self> {
        Ok(Self {
            url: normalize_post_url(input)?,
        })
    }

    /// Returns the normalized URL as a string slice
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Returns the normalized URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for PostIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl std::str::FromStr for PostIdentifier {
    type Err = crate::UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_for_different_spellings() {
        let a = PostIdentifier::parse("https://blog.naver.com/user/1").unwrap();
        let b = PostIdentifier::parse("https://m.blog.naver.com/user/1/#top").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reparse_is_stable() {
        let a = PostIdentifier::parse("http://blog.naver.com/user/7?utm_source=x").unwrap();
        let b: PostIdentifier = a.to_string().parse().unwrap();
        assert_eq!(a, b);
    }
}
