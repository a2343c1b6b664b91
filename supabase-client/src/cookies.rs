//! Request-scoped cookie storage.
//!
//! The server-side client reads and writes its session through a
//! [`CookieStore`]. [`RequestCookies`] adapts the headers of one HTTP request:
//! cookies come in through `Cookie` and go out through `Set-Cookie`.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::Cookie as HttpCookie;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl From<SameSite> for cookie::SameSite {
    fn from(same_site: SameSite) -> Self {
        match same_site {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

/// Attributes sent with a `Set-Cookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: Some("/".to_string()),
            max_age: None,
            http_only: false,
            secure: false,
            same_site: Some(SameSite::Lax),
        }
    }
}

/// A cookie to be written to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieToSet {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl CookieToSet {
    /// A cookie telling the browser to drop `name`.
    pub fn removal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            options: CookieOptions {
                max_age: Some(0),
                ..Default::default()
            },
        }
    }

    pub fn is_removal(&self) -> bool {
        self.options.max_age == Some(0)
    }

    /// Renders the `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut builder = HttpCookie::build((self.name.as_str(), self.value.as_str()))
            .http_only(self.options.http_only)
            .secure(self.options.secure);
        if let Some(path) = &self.options.path {
            builder = builder.path(path.as_str());
        }
        if let Some(max_age) = self.options.max_age {
            builder = builder.max_age(cookie::time::Duration::seconds(max_age));
        }
        if let Some(same_site) = self.options.same_site {
            builder = builder.same_site(same_site.into());
        }
        builder.build().to_string()
    }
}

#[derive(Debug, Error)]
pub enum CookieError {
    /// Cookies cannot be modified from the current context.
    #[error("cookies are read-only in this context")]
    ReadOnly,

    #[error("invalid cookie {name}: {reason}")]
    Invalid { name: String, reason: String },
}

/// Cookie access for one request.
pub trait CookieStore: Send + Sync {
    fn get_all(&self) -> Vec<Cookie>;

    fn set_all(&self, cookies: Vec<CookieToSet>) -> Result<(), CookieError>;
}

/// Cookie jar backed by the headers of a single request.
#[derive(Debug)]
pub struct RequestCookies {
    jar: Mutex<Vec<Cookie>>,
    pending: Mutex<Vec<CookieToSet>>,
    writable: bool,
}

impl RequestCookies {
    /// Parses every `Cookie` header of the request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let jar = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect();
        Self {
            jar: Mutex::new(jar),
            pending: Mutex::new(Vec::new()),
            writable: true,
        }
    }

    /// Turns off writes, as for rendering contexts that cannot emit headers.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Cookies queued for the response, in write order.
    pub fn pending(&self) -> Vec<CookieToSet> {
        self.pending.lock().clone()
    }

    /// Appends a `Set-Cookie` header per pending cookie.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), CookieError> {
        for cookie in self.pending.lock().iter() {
            let value = HeaderValue::from_str(&cookie.header_value()).map_err(|e| {
                CookieError::Invalid {
                    name: cookie.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            headers.append(SET_COOKIE, value);
        }
        Ok(())
    }
}

impl CookieStore for RequestCookies {
    fn get_all(&self) -> Vec<Cookie> {
        self.jar.lock().clone()
    }

    fn set_all(&self, cookies: Vec<CookieToSet>) -> Result<(), CookieError> {
        if !self.writable {
            return Err(CookieError::ReadOnly);
        }
        let mut jar = self.jar.lock();
        for cookie in &cookies {
            jar.retain(|c| c.name != cookie.name);
            if !cookie.is_removal() {
                jar.push(Cookie {
                    name: cookie.name.clone(),
                    value: cookie.value.clone(),
                });
            }
        }
        self.pending.lock().extend(cookies);
        Ok(())
    }
}

/// Malformed pairs are dropped.
fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    HttpCookie::split_parse(header)
        .filter_map(Result::ok)
        .map(|cookie| Cookie {
            name: cookie.name().to_string(),
            value: cookie.value_trimmed().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(cookie: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(cookie));
        headers
    }

    #[test]
    fn test_parses_cookie_header() {
        let cookies =
            RequestCookies::from_headers(&headers_with("a=1; b=\"two\"; =skip; c; d = 4 "));
        assert_eq!(
            cookies.get_all(),
            vec![
                Cookie { name: "a".into(), value: "1".into() },
                Cookie { name: "b".into(), value: "two".into() },
                Cookie { name: "d".into(), value: "4".into() },
            ]
        );
    }

    #[test]
    fn test_set_all_updates_view_and_queues_headers() {
        let cookies = RequestCookies::from_headers(&headers_with("a=1; b=2"));
        cookies
            .set_all(vec![
                CookieToSet {
                    name: "a".into(),
                    value: "updated".into(),
                    options: CookieOptions::default(),
                },
                CookieToSet::removal("b"),
            ])
            .unwrap();

        assert_eq!(
            cookies.get_all(),
            vec![Cookie { name: "a".into(), value: "updated".into() }]
        );

        let mut response = HeaderMap::new();
        cookies.apply_to(&mut response).unwrap();
        let values: Vec<_> = response
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(
            values,
            vec!["a=updated; SameSite=Lax; Path=/", "b=; SameSite=Lax; Path=/; Max-Age=0"]
        );
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let cookies = RequestCookies::from_headers(&HeaderMap::new()).read_only();
        let result = cookies.set_all(vec![CookieToSet::removal("a")]);
        assert!(matches!(result, Err(CookieError::ReadOnly)));
        assert!(cookies.pending().is_empty());
    }

    #[test]
    fn test_header_value_attributes() {
        let cookie = CookieToSet {
            name: "sid".into(),
            value: "x".into(),
            options: CookieOptions {
                path: None,
                max_age: Some(60),
                http_only: true,
                secure: true,
                same_site: Some(SameSite::Strict),
            },
        };
        assert_eq!(
            cookie.header_value(),
            "sid=x; HttpOnly; SameSite=Strict; Secure; Max-Age=60"
        );
    }

    #[test]
    fn test_rendered_cookie_parses_back() {
        let cookie = CookieToSet {
            name: "sb-abcd-auth-token".into(),
            value: "base64-eyJhIjoxfQ".into(),
            options: CookieOptions::default(),
        };
        let parsed = HttpCookie::parse(cookie.header_value()).unwrap();
        assert_eq!(parsed.name(), "sb-abcd-auth-token");
        assert_eq!(parsed.value(), "base64-eyJhIjoxfQ");
        assert_eq!(parsed.path(), Some("/"));
        assert_eq!(parsed.same_site(), Some(cookie::SameSite::Lax));
        assert_eq!(parsed.http_only(), None);
    }

    #[test]
    fn test_same_site_none_is_sent() {
        let cookie = CookieToSet {
            name: "a".into(),
            value: "1".into(),
            options: CookieOptions {
                same_site: Some(SameSite::None),
                secure: true,
                ..Default::default()
            },
        };
        assert_eq!(cookie.header_value(), "a=1; SameSite=None; Secure; Path=/");
    }
}
