//! Where the remote client keeps its session.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::RwLock;

use crate::cookies::{CookieOptions, CookieStore, CookieToSet};
use crate::models::Session;

/// Cookie values larger than this are split across `name.0`, `name.1`, ...
const MAX_CHUNK_SIZE: usize = 3180;

const BASE64_PREFIX: &str = "base64-";

pub enum SessionStorage {
    /// Session held by the client handle itself.
    Memory(RwLock<Option<Session>>),
    /// Session persisted in the cookies of the current request.
    Cookies {
        store: Arc<dyn CookieStore>,
        cookie_name: String,
    },
}

impl SessionStorage {
    pub fn memory() -> Self {
        SessionStorage::Memory(RwLock::new(None))
    }

    pub fn cookies(store: Arc<dyn CookieStore>, project_ref: &str) -> Self {
        SessionStorage::Cookies {
            store,
            cookie_name: format!("sb-{project_ref}-auth-token"),
        }
    }

    pub fn load(&self) -> Option<Session> {
        match self {
            SessionStorage::Memory(slot) => slot.read().clone(),
            SessionStorage::Cookies { store, cookie_name } => {
                let raw = read_chunked(store.as_ref(), cookie_name)?;
                decode_session(&raw)
            }
        }
    }

    pub fn save(&self, session: &Session) {
        match self {
            SessionStorage::Memory(slot) => *slot.write() = Some(session.clone()),
            SessionStorage::Cookies { store, cookie_name } => {
                let encoded = match serde_json::to_vec(session) {
                    Ok(json) => format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(json)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to serialize session");
                        return;
                    }
                };
                write_cookies(store.as_ref(), chunk_cookies(store.as_ref(), cookie_name, &encoded));
            }
        }
    }

    pub fn clear(&self) {
        match self {
            SessionStorage::Memory(slot) => *slot.write() = None,
            SessionStorage::Cookies { store, cookie_name } => {
                let removals = owned_cookie_names(store.as_ref(), cookie_name)
                    .into_iter()
                    .map(CookieToSet::removal)
                    .collect();
                write_cookies(store.as_ref(), removals);
            }
        }
    }
}

// Setting cookies fails when the request context is read-only. The session
// still lives for this request, so the failure is dropped.
fn write_cookies(store: &dyn CookieStore, cookies: Vec<CookieToSet>) {
    if cookies.is_empty() {
        return;
    }
    if let Err(e) = store.set_all(cookies) {
        tracing::debug!(error = %e, "Ignoring session cookie write failure");
    }
}

fn auth_cookie_options() -> CookieOptions {
    CookieOptions {
        max_age: Some(400 * 24 * 60 * 60),
        ..Default::default()
    }
}

/// Builds the cookies for `value` and expires leftover chunks from a previous, longer value.
fn chunk_cookies(store: &dyn CookieStore, name: &str, value: &str) -> Vec<CookieToSet> {
    let mut cookies: Vec<CookieToSet> = if value.len() <= MAX_CHUNK_SIZE {
        vec![CookieToSet {
            name: name.to_string(),
            value: value.to_string(),
            options: auth_cookie_options(),
        }]
    } else {
        // base64 text is ASCII, so byte chunks are char boundaries.
        value
            .as_bytes()
            .chunks(MAX_CHUNK_SIZE)
            .enumerate()
            .map(|(i, chunk)| CookieToSet {
                name: format!("{name}.{i}"),
                value: String::from_utf8_lossy(chunk).into_owned(),
                options: auth_cookie_options(),
            })
            .collect()
    };

    let written: Vec<String> = cookies.iter().map(|c| c.name.clone()).collect();
    for stale in owned_cookie_names(store, name) {
        if !written.contains(&stale) {
            cookies.push(CookieToSet::removal(stale));
        }
    }
    cookies
}

/// Names of the cookies currently holding (a chunk of) the session.
fn owned_cookie_names(store: &dyn CookieStore, name: &str) -> Vec<String> {
    let chunk_prefix = format!("{name}.");
    store
        .get_all()
        .into_iter()
        .filter(|c| {
            c.name == name
                || c.name
                    .strip_prefix(&chunk_prefix)
                    .is_some_and(|idx| idx.parse::<usize>().is_ok())
        })
        .map(|c| c.name)
        .collect()
}

fn read_chunked(store: &dyn CookieStore, name: &str) -> Option<String> {
    let cookies = store.get_all();
    if let Some(single) = cookies.iter().find(|c| c.name == name) {
        return Some(single.value.clone());
    }

    let mut value = String::new();
    for i in 0.. {
        let chunk_name = format!("{name}.{i}");
        match cookies.iter().find(|c| c.name == chunk_name) {
            Some(chunk) => value.push_str(&chunk.value),
            None => break,
        }
    }
    (!value.is_empty()).then_some(value)
}

fn decode_session(raw: &str) -> Option<Session> {
    let json = match raw.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => match URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "Session cookie is not valid base64");
                return None;
            }
        },
        None => raw.as_bytes().to_vec(),
    };
    match serde_json::from_slice(&json) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::debug!(error = %e, "Session cookie does not hold a session");
            None
        }
    }
}
