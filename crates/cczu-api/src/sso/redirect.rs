//! Bounded redirect walking.
//!
//! The SSO portal and the WebVPN proxy bounce the browser through several
//! hops before landing on a login page, and misconfigured deployments have
//! been observed to loop. The walker follows at most a configured number of
//! redirects (default 10), resolving each `Location` against the URL it was
//! served from, and treats a redirect without a `Location` header as a hard
//! failure rather than silently stopping.

use crate::client::CczuClient;
use crate::error::CczuError;
use reqwest::header::LOCATION;
use reqwest::Response;
use std::future::Future;
use tracing::debug;
use url::Url;

/// One step of a redirect chain.
pub(crate) enum Hop<R> {
    /// The server answered 3xx; `location` is its `Location` header, if any.
    Redirect { location: Option<String> },
    /// A non-redirect response ends the walk.
    Done(R),
}

/// Follows a redirect chain starting at `start`, fetching each hop through
/// `fetch`, for at most `max_redirects` redirects.
///
/// Returns the terminal value together with the URL it was fetched from.
/// The loop is iterative, so a pathological chain can neither overflow the
/// stack nor spin forever.
pub(crate) async fn walk<R, F, Fut>(
    start: Url,
    max_redirects: u32,
    mut fetch: F,
) -> Result<(R, Url), CczuError>
where
    F: FnMut(Url) -> Fut,
    Fut: Future<Output = Result<Hop<R>, CczuError>>,
{
    let mut current = start;
    let mut depth = 0u32;

    loop {
        match fetch(current.clone()).await? {
            Hop::Done(value) => return Ok((value, current)),
            Hop::Redirect { location } => {
                let location = location.ok_or_else(|| CczuError::InvalidResponse {
                    message: format!("redirect from {current} is missing its Location header"),
                })?;
                depth += 1;
                if depth > max_redirects {
                    return Err(CczuError::TooManyRedirects { depth });
                }
                let next = resolve_location(&current, &location)?;
                debug!(from = %current, to = %next, depth, "following redirect");
                current = next;
            }
        }
    }
}

/// Resolves a `Location` header against the URL of the response that carried
/// it. Relative locations resolve against the *current* URL, not the origin
/// the walk started from; absolute locations replace it.
pub(crate) fn resolve_location(current: &Url, location: &str) -> Result<Url, CczuError> {
    current.join(location).map_err(|e| CczuError::InvalidResponse {
        message: format!("invalid redirect location {location:?}: {e}"),
    })
}

impl CczuClient {
    /// Walks redirects with this client's GET and depth bound, returning the
    /// final non-redirect response and the URL that produced it.
    pub(crate) async fn follow_redirects(
        &self,
        start: Url,
    ) -> Result<(Response, Url), CczuError> {
        let max_redirects = self.config().max_redirect_depth;
        walk(start, max_redirects, |url| self.fetch_hop(url)).await
    }

    async fn fetch_hop(&self, url: Url) -> Result<Hop<Response>, CczuError> {
        let response = self.get(url).await?;
        if response.status().is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string);
            Ok(Hop::Redirect { location })
        } else {
            Ok(Hop::Done(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_url() -> Url {
        Url::parse("http://portal.example/hop/0").unwrap()
    }

    /// Simulates a chain of `redirects` relative redirects before a terminal
    /// response that echoes its own URL.
    async fn chain(url: Url, redirects: u32) -> Result<Hop<Url>, CczuError> {
        let index: u32 = url
            .path()
            .trim_start_matches("/hop/")
            .parse()
            .unwrap_or(0);
        if index < redirects {
            Ok(Hop::Redirect {
                location: Some(format!("/hop/{}", index + 1)),
            })
        } else {
            Ok(Hop::Done(url))
        }
    }

    #[tokio::test]
    async fn short_chain_terminates_at_final_response() {
        let (done, final_url) = walk(start_url(), 10, |u| chain(u, 3)).await.unwrap();
        assert_eq!(done.path(), "/hop/3");
        assert_eq!(final_url.path(), "/hop/3");
    }

    #[tokio::test]
    async fn chain_at_the_bound_still_succeeds() {
        let (done, _) = walk(start_url(), 10, |u| chain(u, 10)).await.unwrap();
        assert_eq!(done.path(), "/hop/10");
    }

    #[tokio::test]
    async fn chain_past_the_bound_errors() {
        let err = walk(start_url(), 10, |u| chain(u, 11)).await.unwrap_err();
        assert!(matches!(err, CczuError::TooManyRedirects { .. }));
    }

    #[tokio::test]
    async fn endless_chain_errors_instead_of_looping() {
        let err = walk(start_url(), 10, |u| chain(u, u32::MAX)).await.unwrap_err();
        assert!(matches!(err, CczuError::TooManyRedirects { .. }));
    }

    #[tokio::test]
    async fn redirect_without_location_is_a_hard_failure() {
        let err = walk(start_url(), 10, |_| async {
            Ok(Hop::<()>::Redirect { location: None })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CczuError::InvalidResponse { .. }));
    }

    #[test]
    fn relative_location_resolves_against_current_url() {
        let current = Url::parse("https://vpn.example/portal/login/index.html").unwrap();
        let next = resolve_location(&current, "do-login").unwrap();
        assert_eq!(next.as_str(), "https://vpn.example/portal/login/do-login");

        let next = resolve_location(&current, "../auth").unwrap();
        assert_eq!(next.as_str(), "https://vpn.example/portal/auth");

        let next = resolve_location(&current, "/sso/entry").unwrap();
        assert_eq!(next.as_str(), "https://vpn.example/sso/entry");
    }

    #[test]
    fn absolute_location_replaces_current_url() {
        let current = Url::parse("http://sso.example/login").unwrap();
        let next = resolve_location(&current, "https://vpn.example/welcome").unwrap();
        assert_eq!(next.as_str(), "https://vpn.example/welcome");
    }
}
