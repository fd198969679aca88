//! Client configuration.
//!
//! Endpoint URLs are deployment facts, not algorithm: every default below
//! points at the production CCZU services but can be overridden, e.g. to aim
//! the client at a staging mirror or a capture proxy.

use std::time::Duration;

/// Configuration for the HTTP core and the SSO flow.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SSO portal login URL. Probed first; a redirect here means the WebVPN
    /// tunnel is required.
    pub sso_login_url: String,
    /// Base URL of the WebVPN reverse proxy, used as the Referer on the final
    /// tunnel hop.
    pub vpn_base_url: String,
    /// User agent presented to every service.
    pub user_agent: String,
    /// Maximum number of redirects the walker will follow.
    pub max_redirect_depth: u32,
    /// TCP connect timeout per request.
    pub connect_timeout: Duration,
    /// Total timeout per request.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sso_login_url: "http://sso.cczu.edu.cn/sso/login".to_string(),
            vpn_base_url: "https://zmvpn.cczu.edu.cn".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36"
                .to_string(),
            max_redirect_depth: 10,
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration for the academic-affairs (jwqywx) service.
#[derive(Debug, Clone)]
pub struct JwqywxConfig {
    /// Base URL of the service API. The login endpoint lives on port 8180
    /// over plain HTTP.
    pub api_base: String,
    /// Referer header expected by the service.
    pub referer: String,
    /// Origin header expected by the service.
    pub origin: String,
}

impl Default for JwqywxConfig {
    fn default() -> Self {
        Self {
            api_base: "http://jwqywx.cczu.edu.cn:8180/api".to_string(),
            referer: "http://jwqywx.cczu.edu.cn/".to_string(),
            origin: "http://jwqywx.cczu.edu.cn".to_string(),
        }
    }
}
