//! The HTTP core shared by both login stages.
//!
//! Owns the cookie jar for the lifetime of the client and performs every
//! request with redirects disabled, so the redirect walker in `sso` controls
//! each hop and can resolve relative `Location` headers itself.

use crate::account::Account;
use crate::config::ClientConfig;
use crate::error::CczuError;
use crate::sso::LoginMode;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::redirect::Policy;
use reqwest::Response;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

/// Client for one authenticated identity.
///
/// Holds the credential pair, the shared cookie jar, and the login mode
/// resolved by [`universal_login`](CczuClient::universal_login). All mutable
/// session state lives behind the jar (written by reqwest) and the login-mode
/// cell; neither is exposed for outside mutation.
pub struct CczuClient {
    account: Account,
    config: ClientConfig,
    http: reqwest::Client,
    jar: Arc<Jar>,
    login_mode: RwLock<Option<LoginMode>>,
}

impl CczuClient {
    /// Creates a client with the default (production) configuration.
    pub fn new(account: Account) -> Result<Self, CczuError> {
        Self::with_config(account, ClientConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(account: Account, config: ClientConfig) -> Result<Self, CczuError> {
        let jar = Arc::new(Jar::default());

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
        );

        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .cookie_provider(jar.clone())
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CczuError::Network {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            account,
            config,
            http,
            jar,
            login_mode: RwLock::new(None),
        })
    }

    /// The credential pair this client authenticates as.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Which login path the authentication state machine took, once resolved.
    ///
    /// `None` until [`universal_login`](CczuClient::universal_login) has
    /// completed. Collaborators use this to pick the base URL for services
    /// that differ between the direct and tunneled deployments.
    pub fn login_mode(&self) -> Option<LoginMode> {
        self.login_mode.read().ok().and_then(|guard| *guard)
    }

    pub(crate) fn set_login_mode(&self, mode: LoginMode) {
        if let Ok(mut guard) = self.login_mode.write() {
            *guard = Some(mode);
        }
    }

    pub(crate) async fn get(&self, url: Url) -> Result<Response, CczuError> {
        Ok(self.http.get(url).send().await?)
    }

    pub(crate) async fn get_with_headers(
        &self,
        url: Url,
        headers: HeaderMap,
    ) -> Result<Response, CczuError> {
        Ok(self.http.get(url).headers(headers).send().await?)
    }

    pub(crate) async fn post_form(
        &self,
        url: Url,
        form: &HashMap<String, String>,
    ) -> Result<Response, CczuError> {
        Ok(self.http.post(url).form(form).send().await?)
    }

    pub(crate) async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: Url,
        headers: HeaderMap,
        json: &T,
    ) -> Result<Response, CczuError> {
        Ok(self.http.post(url).headers(headers).json(json).send().await?)
    }

    /// Reads a single cookie for `url` back out of the jar by name.
    pub(crate) fn cookie(&self, url: &Url, name: &str) -> Option<String> {
        let header = self.jar.cookies(url)?;
        cookie_from_header(header.to_str().ok()?, name)
    }
}

/// Finds `name` in a `Cookie:` header value (`a=1; b=2`).
fn cookie_from_header(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_lookup_by_name() {
        let header = "route=abc123; clientInfo=eyJ1c2VyaWQiOiIxIn0=; JSESSIONID=X1";
        assert_eq!(
            cookie_from_header(header, "clientInfo"),
            Some("eyJ1c2VyaWQiOiIxIn0=".to_string())
        );
        assert_eq!(cookie_from_header(header, "route"), Some("abc123".to_string()));
        assert_eq!(cookie_from_header(header, "missing"), None);
    }

    #[test]
    fn cookie_lookup_keeps_embedded_equals() {
        // base64 cookie values commonly end in padding
        assert_eq!(
            cookie_from_header("clientInfo=YWJjZA==", "clientInfo"),
            Some("YWJjZA==".to_string())
        );
    }

    #[test]
    fn login_mode_starts_unresolved() {
        let client = CczuClient::new(Account::new("u", "p")).unwrap();
        assert!(client.login_mode().is_none());
    }
}
