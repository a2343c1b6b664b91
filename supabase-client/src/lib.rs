//! Handle to the hosted auth and table service.
//!
//! [`create_client`] and [`create_server_client`] return a live client when a
//! project URL and anon key are configured, and an example-mode client that
//! needs no backend otherwise. Both sit behind [`SupabaseClient`].

pub mod client;
pub mod cookies;
pub mod error;
pub mod factory;
pub mod mock;
pub mod models;
pub mod remote;
pub mod session;

pub use client::{SupabaseClient, TableQuery};
pub use cookies::{Cookie, CookieError, CookieOptions, CookieStore, CookieToSet, RequestCookies};
pub use error::{ClientError, ClientResult};
pub use factory::{create_client, create_server_client};
pub use mock::MockClient;
pub use models::{AuthResponse, Credentials, Session, SignUpOptions, User, UserAttributes};
pub use remote::RemoteClient;
pub use session::SessionStorage;
