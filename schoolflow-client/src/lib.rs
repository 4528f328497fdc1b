//! Async client for the SchoolFlow session endpoints.
//!
//! An [`AuthClient`] owns one cookie jar and one published [`AuthState`] for a
//! single session cookie (primary staff or teacher). Dashboard code subscribes
//! to the state, calls [`AuthClient::refresh`] on mount, and runs
//! [`AuthClient::check_shell`] before rendering an authenticated area.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use schoolflow_api::api::ErrorResponse;
use schoolflow_api::api::account::AccountStatusResponse;
use schoolflow_api::api::login::LoginSuccessResponse;
use schoolflow_api::api::password::{ChangePasswordRequest, ChangePasswordResponse};
use schoolflow_api::api::session::SessionCheckResponse;
use schoolflow_api::models::{AccountStatus, SessionData};
use schoolflow_api::orm::login::LoginRequest;
use schoolflow_api::session::SessionKind;
use schoolflow_api::shell::{ShellArea, ShellOutcome, check_shell};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Client-side view of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    /// True until the first session check completes.
    pub loading: bool,
    pub session: Option<SessionData>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState {
            loading: true,
            session: None,
        }
    }
}

fn api_prefix(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::Primary => "/api/1",
        SessionKind::Teacher => "/api/1/teacher",
    }
}

fn shell_kind(area: ShellArea) -> SessionKind {
    SessionKind::for_role(area.role())
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    kind: SessionKind,
    state: watch::Sender<AuthState>,
}

impl AuthClient {
    /// Builds a client with its own cookie store.
    pub fn new(base_url: impl Into<String>, kind: SessionKind) -> ClientResult<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self::with_http(http, base_url, kind))
    }

    /// Uses an existing `reqwest` client, which must have a cookie store for
    /// the session cookie to persist between calls.
    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>, kind: SessionKind) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let (state, _) = watch::channel(AuthState::default());
        AuthClient {
            http,
            base_url,
            kind,
            state,
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn url(&self, kind: SessionKind, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url, api_prefix(kind), endpoint)
    }

    fn publish(&self, session: Option<SessionData>) {
        self.state.send_replace(AuthState {
            loading: false,
            session,
        });
    }

    async fn fetch_session(&self, kind: SessionKind) -> ClientResult<Option<SessionData>> {
        let response = self.http.get(self.url(kind, "/session")).send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            status if status.is_success() => {
                let body: SessionCheckResponse = response.json().await?;
                Ok(body.session.filter(|_| body.authenticated))
            }
            status => Err(api_error(status, response).await),
        }
    }

    /// Re-checks the session cookie and publishes the result.
    ///
    /// A transport failure is published as signed out, matching how the
    /// server treats an unreachable session store.
    pub async fn refresh(&self) -> Option<SessionData> {
        let session = match self.fetch_session(self.kind).await {
            Ok(session) => session,
            Err(e) => {
                warn!("[auth-client] Session check failed: {}", e);
                None
            }
        };
        self.publish(session.clone());
        session
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.http.post(url).json(body).send().await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(api_error(response.status(), response).await)
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginSuccessResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let login: LoginSuccessResponse = self.post_json(self.url(self.kind, "/login"), &request).await?;
        self.refresh().await;
        Ok(login)
    }

    /// Ends the session on the server; local state is cleared even when the
    /// request fails.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .http
            .post(self.url(self.kind, "/logout"))
            .send()
            .await
            .map_err(ClientError::from);
        self.publish(None);

        let response = result?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response.status(), response).await)
        }
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<ChangePasswordResponse> {
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.post_json(self.url(self.kind, "/change-password"), &request)
            .await
    }

    async fn account_status(&self, kind: SessionKind) -> ClientResult<AccountStatus> {
        let response = self
            .http
            .get(self.url(kind, "/account/status"))
            .send()
            .await?;
        if response.status().is_success() {
            let body: AccountStatusResponse = response.json().await?;
            Ok(body.status)
        } else {
            Err(api_error(response.status(), response).await)
        }
    }

    /// Decides whether the dashboard shell for `area` may render.
    ///
    /// The session is resolved through the cookie the area's role uses; school
    /// admin and teacher shells then read the live account status. Any failure
    /// along the way sends the user to the login page.
    pub async fn check_shell(&self, area: ShellArea) -> ShellOutcome {
        let role = area.role();
        let kind = shell_kind(area);

        let session = match self.fetch_session(kind).await {
            Ok(session) => session,
            Err(e) => {
                warn!("[auth-client] Shell session check failed: {}", e);
                None
            }
        };
        if kind == self.kind {
            self.publish(session.clone());
        }

        let live_status = match &session {
            Some(s) if s.role == role && role.requires_status_check() => {
                match self.account_status(kind).await {
                    Ok(status) => Some(status),
                    Err(e) => {
                        warn!("[auth-client] Account status check failed: {}", e);
                        return ShellOutcome::redirect(role.login_path());
                    }
                }
            }
            _ => None,
        };

        let outcome = check_shell(role, session.as_ref(), live_status);
        debug!("[auth-client] Shell {:?} -> {:?}", area, outcome);
        outcome
    }

    /// Re-checks the session every `period` until the returned handle is
    /// aborted or the client is dropped.
    pub fn spawn_polling(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let client = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(client) = client.upgrade() else {
                    break;
                };
                client.refresh().await;
            }
        })
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };
    ClientError::Api { status, message }
}
