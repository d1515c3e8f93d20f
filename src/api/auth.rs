//! Platform auth status.
//!
//! The hosting platform owns sign-in. We only ask who is signed in
//! (`/.auth/me`) once at startup and know where its login and logout pages
//! live. There is no token handling, retry, or polling here.

use log::{debug, info, warn};

use super::error::ApiError;
use super::types::{AuthMe, UserInfo};

const AUTH_ME_PATH: &str = "/.auth/me";
const AUTH_LOGIN_PATH: &str = "/.auth/login/aad";
const AUTH_LOGOUT_PATH: &str = "/.auth/logout";

/// Client for the platform-managed `/.auth/*` endpoints of one site.
pub struct AuthClient {
    site_url: String,
    cookie: Option<String>,
    client: reqwest::Client,
}

impl AuthClient {
    /// `cookie` is sent verbatim as the `Cookie` header, which lets a
    /// terminal reuse a browser session.
    pub fn new(site_url: &str, cookie: Option<String>) -> Self {
        Self {
            site_url: site_url.trim().trim_end_matches('/').to_string(),
            cookie,
            client: reqwest::Client::new(),
        }
    }

    pub fn login_url(&self) -> String {
        format!("{}{}", self.site_url, AUTH_LOGIN_PATH)
    }

    pub fn logout_url(&self) -> String {
        format!("{}{}", self.site_url, AUTH_LOGOUT_PATH)
    }

    /// Asks the platform who is signed in. `Ok(None)` means signed out.
    pub async fn fetch_user(&self) -> Result<Option<UserInfo>, ApiError> {
        let url = format!("{}{}", self.site_url, AUTH_ME_PATH);
        info!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let me: AuthMe = response.json().await.map_err(|e| ApiError::Parse(e.to_string()))?;
        debug!("Auth principal present: {}", me.client_principal.is_some());
        Ok(me.client_principal)
    }

    /// Like [`fetch_user`](Self::fetch_user) but any failure counts as signed out.
    pub async fn resolve_user(&self) -> Option<UserInfo> {
        match self.fetch_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!("Auth status unavailable, treating as signed out: {}", e);
                None
            }
        }
    }
}
