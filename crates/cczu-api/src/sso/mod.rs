//! SSO authentication state machine.
//!
//! Login runs in two shapes depending on where the client sits:
//!
//! 1. Probe the SSO portal root. A 200 means the portal is reachable
//!    directly (on-campus); a redirect means the WebVPN reverse proxy is in
//!    front of it (off-campus).
//! 2. Direct path: scrape the login form's hidden fields, POST the
//!    credentials, and follow the outcome.
//! 3. Tunnel path: walk the redirect chain to the proxy's login page, POST
//!    the credentials there, follow the proxy's redirect once more, and read
//!    the identity it drops in the `clientInfo` cookie.
//!
//! Either way the browser-equivalent session cookies end up in the shared
//! jar and the resolved [`LoginMode`] is recorded on the client. Logging in
//! to the downstream academic-affairs service is a separate, composable step
//! (see [`crate::jwqywx`]).

mod form;
mod redirect;
mod vpn;

pub use vpn::VpnIdentity;

use crate::client::CczuClient;
use crate::error::CczuError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use form::parse_hidden_fields;
use redirect::resolve_location;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, REFERER};
use reqwest::{Response, StatusCode};
use std::collections::HashMap;
use tracing::{debug, info};
use url::Url;

/// Cookie the WebVPN proxy uses to publish the authenticated identity.
const CLIENT_INFO_COOKIE: &str = "clientInfo";

/// Which path the authentication state machine resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    /// The SSO portal was reachable without the VPN hop.
    Direct,
    /// Login went through the WebVPN reverse proxy.
    VpnTunnel,
}

/// Result of a service login: the final page after the redirect dance.
#[derive(Debug)]
pub struct ServiceLoginOutcome {
    pub status: StatusCode,
    pub body: String,
    pub final_url: Url,
}

impl CczuClient {
    /// Logs in against the SSO portal, detecting the VPN tunnel
    /// automatically.
    ///
    /// Returns the proxy-issued identity when the tunnel path was taken and
    /// `None` for a direct login. On success the session cookies are in the
    /// jar and [`login_mode`](CczuClient::login_mode) is resolved.
    pub async fn universal_login(&self) -> Result<Option<VpnIdentity>, CczuError> {
        let url = Url::parse(&self.config().sso_login_url)?;
        info!(url = %url, "probing SSO portal");
        let probe = self.get(url).await?;
        let status = probe.status();

        if status.is_redirection() {
            debug!(%status, "SSO probe redirected, taking the VPN tunnel path");
            let identity = self.vpn_tunnel_login(probe).await?;
            self.set_login_mode(LoginMode::VpnTunnel);
            info!(userid = %identity.userid, "logged in through the VPN tunnel");
            return Ok(Some(identity));
        }
        if status == StatusCode::OK {
            self.service_login("").await?;
            self.set_login_mode(LoginMode::Direct);
            info!("logged in against the SSO portal directly");
            return Ok(None);
        }
        Err(CczuError::LoginFailed {
            reason: format!("unexpected status {status} probing the SSO portal"),
        })
    }

    /// Logs in to the SSO portal for a specific downstream `service`
    /// (empty string for the portal itself).
    ///
    /// A 302 outcome is followed to its final page; a 200 outcome on the
    /// credential POST also counts as success, because some deployments
    /// re-serve the page when the session is already authenticated.
    pub async fn service_login(&self, service: &str) -> Result<ServiceLoginOutcome, CczuError> {
        let url = if service.is_empty() {
            Url::parse(&self.config().sso_login_url)?
        } else {
            Url::parse_with_params(&self.config().sso_login_url, [("service", service)])?
        };
        info!(url = %url, "SSO service login");
        let response = self.get(url.clone()).await?;

        if response.status().is_redirection() {
            // Already authenticated in this session; just follow through.
            let location = require_location(&response, "SSO service redirect")?;
            let start = resolve_location(&url, &location)?;
            return self.finish_walk(start).await;
        }
        if response.status() != StatusCode::OK {
            return Err(CczuError::LoginFailed {
                reason: format!(
                    "unexpected status {} from the SSO portal",
                    response.status()
                ),
            });
        }

        let html = response.text().await?;
        let form = self.credential_form(&html);
        debug!(fields = form.len(), "submitting SSO credential form");
        let login_response = self.post_form(url.clone(), &form).await?;

        match login_response.status() {
            status if status.is_redirection() => {
                let location = require_location(&login_response, "SSO login redirect")?;
                let start = resolve_location(&url, &location)?;
                self.finish_walk(start).await
            }
            StatusCode::OK => Ok(ServiceLoginOutcome {
                status: StatusCode::OK,
                body: String::new(),
                final_url: url,
            }),
            status => Err(CczuError::LoginFailed {
                reason: format!("service login failed with status {status}"),
            }),
        }
    }

    /// The WebVPN branch: walk to the proxy's login page, submit the form,
    /// follow its redirect, and decode the identity cookie.
    async fn vpn_tunnel_login(&self, probe: Response) -> Result<VpnIdentity, CczuError> {
        let location =
            location_header(&probe).ok_or_else(|| CczuError::LoginFailed {
                reason: "SSO probe redirected without a Location header".to_string(),
            })?;
        let start = resolve_location(probe.url(), &location)?;

        let (page, login_url) = self.follow_redirects(start).await?;
        let html = page.text().await?;

        let form = self.credential_form(&html);
        debug!(fields = form.len(), url = %login_url, "submitting VPN login form");
        let login_response = self.post_form(login_url.clone(), &form).await?;

        let location =
            location_header(&login_response).ok_or_else(|| CczuError::LoginFailed {
                reason: "VPN login form submission did not redirect".to_string(),
            })?;
        let target = resolve_location(&login_url, &location)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&self.config().vpn_base_url).map_err(|_| {
                CczuError::InvalidResponse {
                    message: "configured VPN base URL is not a valid header value".to_string(),
                }
            })?,
        );
        let _ = self.get_with_headers(target.clone(), headers).await?;

        let raw = self
            .cookie(&target, CLIENT_INFO_COOKIE)
            .ok_or_else(|| CczuError::LoginFailed {
                reason: "no client info cookie after VPN login".to_string(),
            })?;
        vpn::decode_client_info(&raw)
    }

    /// Follows a redirect chain and packages the terminal page.
    async fn finish_walk(&self, start: Url) -> Result<ServiceLoginOutcome, CczuError> {
        let (final_response, final_url) = self.follow_redirects(start).await?;
        let status = final_response.status();
        let body = final_response.text().await?;
        Ok(ServiceLoginOutcome {
            status,
            body,
            final_url,
        })
    }

    /// Hidden fields from the login page plus the credential pair. The
    /// portal expects the password base64-encoded in the form value.
    fn credential_form(&self, html: &str) -> HashMap<String, String> {
        let mut form = parse_hidden_fields(html);
        form.insert("username".to_string(), self.account().username.clone());
        form.insert(
            "password".to_string(),
            STANDARD.encode(self.account().password.as_bytes()),
        );
        form
    }
}

fn location_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

fn require_location(response: &Response, context: &str) -> Result<String, CczuError> {
    location_header(response).ok_or_else(|| CczuError::InvalidResponse {
        message: format!("{context} is missing its Location header"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;

    #[test]
    fn credential_form_injects_base64_password() {
        let client = CczuClient::new(Account::new("230701", "secret")).unwrap();
        let html = r#"
            <input type="hidden" name="lt" value="LT-1">
            <input type="hidden" name="execution" value="e1s1">
        "#;
        let form = client.credential_form(html);
        assert_eq!(form["username"], "230701");
        assert_eq!(form["password"], STANDARD.encode("secret"));
        assert_eq!(form["lt"], "LT-1");
        assert_eq!(form["execution"], "e1s1");
    }

    #[test]
    fn credential_form_overrides_hidden_credentials() {
        let client = CczuClient::new(Account::new("230701", "secret")).unwrap();
        let html = r#"<input type="hidden" name="username" value="someone-else">"#;
        let form = client.credential_form(html);
        assert_eq!(form["username"], "230701");
    }
}
