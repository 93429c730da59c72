//! Session use-case service.
//!
//! # Responsibility
//! - Drive sign-in, profile refresh and sign-out through an `AuthApi`.
//! - Translate remote failures into session outcomes for the caller.
//!
//! # Invariants
//! - A profile result is applied only while its fetch ticket is current, so
//!   a late response never resurrects a cleared session.
//! - A failed profile refresh clears tokens and user; navigation is left to
//!   the caller.
//! - Tokens and credentials are never logged.

use crate::model::session::UserProfile;
use crate::repo::durable_store::DurableStore;
use crate::store::{ProfileFetch, StoreError, TaskStore};
use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure reported by an `AuthApi` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401-equivalent: the credential was rejected.
    Unauthorized,
    /// The response body did not have the expected shape.
    InvalidResponse(String),
    /// Network or server failure.
    Transport(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Transport(_) => "transport",
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "session rejected by server"),
            Self::InvalidResponse(message) => write!(f, "invalid server response: {message}"),
            Self::Transport(message) => write!(f, "request failed: {message}"),
        }
    }
}

impl Error for ApiError {}

/// Body of a successful `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub name: String,
    pub email: String,
    pub token: String,
}

impl LoginResponse {
    pub fn into_parts(self) -> (UserProfile, String) {
        (UserProfile::new(self.name, self.email), self.token)
    }
}

#[derive(Deserialize)]
struct ProfileEnvelope {
    user: UserProfile,
}

/// Parses a `GET /user` body of shape `{"user": {"name", "email"}}`.
pub fn decode_profile_response(body: &str) -> Result<UserProfile, ApiError> {
    serde_json::from_str::<ProfileEnvelope>(body)
        .map(|envelope| envelope.user)
        .map_err(|err| ApiError::InvalidResponse(format!("profile body: {err}")))
}

/// Parses a `POST /login` body of shape `{"name", "email", "token"}`.
pub fn decode_login_response(body: &str) -> Result<LoginResponse, ApiError> {
    serde_json::from_str::<LoginResponse>(body)
        .map_err(|err| ApiError::InvalidResponse(format!("login body: {err}")))
}

/// Remote authentication API consumed by the session flows.
///
/// Implementations perform the HTTP calls; the core never does.
pub trait AuthApi {
    /// `POST /login`.
    fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;
    /// `GET /user` with bearer `token`.
    fn fetch_profile(&self, token: &str) -> Result<UserProfile, ApiError>;
    /// `POST /logout` with bearer `token`.
    fn logout(&self, token: &str) -> Result<(), ApiError>;
}

/// Result of a profile refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Profile fetched and stored.
    Refreshed(UserProfile),
    /// No token held; nothing to refresh.
    SignedOut,
    /// Session was rejected and cleared; the caller should show sign-in.
    RedirectToSignIn,
    /// The session changed while the fetch was in flight; result ignored.
    Discarded,
}

/// Session service error.
#[derive(Debug)]
pub enum SessionError {
    Api(ApiError),
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ApiError> for SessionError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Session flows over an `AuthApi` implementation.
pub struct SessionService<A: AuthApi> {
    api: A,
}

impl<A: AuthApi> SessionService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Authenticates and records the profile and token in the store.
    ///
    /// Store state is unchanged when the API call fails.
    pub fn sign_in<S: DurableStore>(
        &self,
        store: &mut TaskStore<S>,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, SessionError> {
        let (profile, token) = match self.api.login(email, password) {
            Ok(response) => response.into_parts(),
            Err(err) => {
                warn!(
                    "event=session_sign_in module=session status=error error_code={}",
                    err.code()
                );
                return Err(err.into());
            }
        };

        store.sign_in(profile.clone(), token)?;
        info!("event=session_sign_in module=session status=ok");
        Ok(profile)
    }

    /// Fetches the profile for the primary token and applies the result.
    pub fn refresh_profile<S: DurableStore>(
        &self,
        store: &mut TaskStore<S>,
    ) -> Result<SessionOutcome, StoreError> {
        let Some(fetch) = store.begin_profile_fetch() else {
            return Ok(SessionOutcome::SignedOut);
        };
        let result = self.api.fetch_profile(fetch.token());
        complete_profile_fetch(store, &fetch, result)
    }

    /// Ends the server session, then clears tokens and user.
    ///
    /// With no token held the session is cleared locally. When the logout
    /// call fails, store state is left as it was.
    pub fn sign_out<S: DurableStore>(&self, store: &mut TaskStore<S>) -> Result<(), SessionError> {
        if let Some(token) = store.primary_token() {
            if let Err(err) = self.api.logout(token) {
                warn!(
                    "event=session_sign_out module=session status=error error_code={}",
                    err.code()
                );
                return Err(err.into());
            }
        }

        store.sign_out()?;
        info!("event=session_sign_out module=session status=ok");
        Ok(())
    }
}

/// Applies the result of a fetch started with `TaskStore::begin_profile_fetch`.
///
/// Callers that run the request themselves use this once the response
/// arrives. Any failure invalidates the session.
pub fn complete_profile_fetch<S: DurableStore>(
    store: &mut TaskStore<S>,
    fetch: &ProfileFetch,
    result: Result<UserProfile, ApiError>,
) -> Result<SessionOutcome, StoreError> {
    if !store.is_fetch_current(fetch) {
        info!("event=session_refresh module=session status=discarded");
        return Ok(SessionOutcome::Discarded);
    }

    match result {
        Ok(profile) => {
            store.set_user(profile.clone())?;
            info!("event=session_refresh module=session status=ok");
            Ok(SessionOutcome::Refreshed(profile))
        }
        Err(err) => {
            warn!(
                "event=session_refresh module=session status=error error_code={}",
                err.code()
            );
            store.invalidate_session()?;
            Ok(SessionOutcome::RedirectToSignIn)
        }
    }
}
