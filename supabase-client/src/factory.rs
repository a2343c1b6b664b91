use std::sync::Arc;

use common::SupabaseConfig;

use crate::client::SupabaseClient;
use crate::cookies::CookieStore;
use crate::error::ClientResult;
use crate::mock::MockClient;
use crate::remote::{project_ref, RemoteClient};
use crate::session::SessionStorage;

/// Client whose session lives in the returned handle.
pub fn create_client(config: &SupabaseConfig) -> ClientResult<Arc<dyn SupabaseClient>> {
    build(config, |_| SessionStorage::memory())
}

/// Client whose session is read from and written to the cookies of the current request.
pub fn create_server_client(
    config: &SupabaseConfig,
    cookies: Arc<dyn CookieStore>,
) -> ClientResult<Arc<dyn SupabaseClient>> {
    build(config, |url| SessionStorage::cookies(cookies, &project_ref(url)))
}

fn build(
    config: &SupabaseConfig,
    storage: impl FnOnce(&str) -> SessionStorage,
) -> ClientResult<Arc<dyn SupabaseClient>> {
    match (config.is_live(), &config.url, &config.anon_key) {
        (true, Some(url), Some(anon_key)) => {
            tracing::debug!(url = %url, "Creating remote client");
            let client = RemoteClient::new(url, anon_key, storage(url))?;
            Ok(Arc::new(client))
        }
        _ => {
            tracing::debug!(
                example_mode = config.example_mode,
                "No backend configured, using example-mode client"
            );
            Ok(Arc::new(MockClient::new()))
        }
    }
}
