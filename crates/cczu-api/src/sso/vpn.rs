//! WebVPN identity extraction.
//!
//! After the tunnel login the proxy drops a `clientInfo` cookie whose value
//! is base64 of a UTF-8 JSON object describing the logged-in identity.

use crate::error::CczuError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;

/// Identity record issued by the WebVPN proxy.
///
/// Present if and only if the login resolved to
/// [`LoginMode::VpnTunnel`](crate::sso::LoginMode::VpnTunnel).
#[derive(Debug, Clone, Deserialize)]
pub struct VpnIdentity {
    /// Subject id the proxy authenticated.
    pub userid: String,
    /// Display name, when the proxy includes one.
    #[serde(default)]
    pub username: Option<String>,
}

/// Decodes a `clientInfo` cookie value into a [`VpnIdentity`].
pub(crate) fn decode_client_info(raw: &str) -> Result<VpnIdentity, CczuError> {
    let bytes = STANDARD
        .decode(raw.trim())
        .map_err(|e| CczuError::LoginFailed {
            reason: format!("client info cookie is not valid base64: {e}"),
        })?;
    let json = std::str::from_utf8(&bytes).map_err(|_| CczuError::LoginFailed {
        reason: "client info cookie is not valid UTF-8".to_string(),
    })?;
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_identity() {
        let raw = STANDARD.encode(r#"{"userid":"230701","username":"测试用户"}"#);
        let identity = decode_client_info(&raw).unwrap();
        assert_eq!(identity.userid, "230701");
        assert_eq!(identity.username.as_deref(), Some("测试用户"));
    }

    #[test]
    fn display_name_is_optional() {
        let raw = STANDARD.encode(r#"{"userid":"230701"}"#);
        let identity = decode_client_info(&raw).unwrap();
        assert_eq!(identity.userid, "230701");
        assert!(identity.username.is_none());
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = decode_client_info("!!not-base64!!").unwrap_err();
        assert!(matches!(err, CczuError::LoginFailed { .. }));
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let raw = STANDARD.encode([0xff, 0xfe, 0x00, 0x01]);
        let err = decode_client_info(&raw).unwrap_err();
        assert!(matches!(err, CczuError::LoginFailed { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let raw = STANDARD.encode("{\"userid\":");
        let err = decode_client_info(&raw).unwrap_err();
        assert!(matches!(err, CczuError::Decoding { .. }));
    }
}
