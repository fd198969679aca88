//! Client SDK for Changzhou University services.
//!
//! Authentication runs in two composable stages: the SSO portal login
//! (which detects and traverses the WebVPN tunnel automatically) and the
//! academic-affairs service login, which issues the bearer token used by
//! every data endpoint. The timetable endpoint's packed text format is
//! decoded by the [`schedule`] module.
//!
//! ```no_run
//! use cczu_api::{Account, CczuClient, JwqywxSession};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), cczu_api::CczuError> {
//! let client = Arc::new(CczuClient::new(Account::new("student-id", "password"))?);
//!
//! // Stage one: SSO login. Returns the proxy identity when the WebVPN
//! // tunnel was required, `None` for a direct login.
//! let vpn_identity = client.universal_login().await?;
//!
//! // Stage two: academic-affairs login; issues the bearer token.
//! let session = JwqywxSession::new(client);
//! session.login().await?;
//!
//! let matrix = session.current_class_schedule().await?;
//! let courses = cczu_api::schedule::parse_week_matrix(&matrix);
//! # let _ = (vpn_identity, courses);
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod client;
pub mod config;
pub mod error;
pub mod jwqywx;
pub mod schedule;
pub mod sso;

pub use account::Account;
pub use client::CczuClient;
pub use config::{ClientConfig, JwqywxConfig};
pub use error::CczuError;
pub use jwqywx::JwqywxSession;
pub use schedule::{parse_week_matrix, ParsedCourse, RawScheduleCell};
pub use sso::{LoginMode, ServiceLoginOutcome, VpnIdentity};
