//! Image proxy types.

use std::fmt;

use bytes::Bytes;
use futures::stream::BoxStream;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{MuslimboardError, Result};

/// A validated absolute http(s) URL of an image to proxy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUrl(Url);

impl ImageUrl {
    /// Parses the `image` request parameter.
    ///
    /// The value arrives already query-decoded once; clients encode the URL
    /// on top of that, so it is unescaped a second time here. Empty input,
    /// malformed escapes, and anything that is not an absolute http(s) URL
    /// are rejected.
    pub fn from_param(raw: &str) -> Result<Self> {
        let unescaped = query_unescape(raw)?;
        if unescaped.is_empty() {
            return Err(MuslimboardError::Validation("missing image url".into()));
        }

        let url = Url::parse(&unescaped)
            .map_err(|e| MuslimboardError::Validation(format!("invalid image url: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(MuslimboardError::Validation(format!(
                "unsupported image url scheme '{}'",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(MuslimboardError::Validation("image url has no host".into()));
        }

        Ok(ImageUrl(url))
    }

    /// Returns the parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Query-string unescape: `+` is a space, `%XX` must be two hex digits.
fn query_unescape(raw: &str) -> Result<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(MuslimboardError::Validation(format!(
                    "invalid escape in image url at byte {}",
                    i
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| MuslimboardError::Validation(format!("image url is not utf-8: {}", e)))
}

/// A proxied image: its content type and an incremental body.
///
/// Dropping the stream closes the origin connection.
pub struct ImageStream {
    /// `Content-Type` reported by the origin
    pub content_type: String,
    /// Response body chunks
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl ImageStream {
    /// Creates an image stream.
    pub fn new(content_type: impl Into<String>, body: BoxStream<'static, Result<Bytes>>) -> Self {
        Self {
            content_type: content_type.into(),
            body,
        }
    }
}

impl fmt::Debug for ImageStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
