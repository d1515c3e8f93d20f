//! # Application State
//!
//! Core business state for Stardust. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── backend: Arc<dyn ChatBackend>  // RAG service client
//! ├── messages: Vec<ChatMessage>     // append-only transcript
//! ├── is_loading: bool               // chat request in flight
//! ├── input_error: Option<String>    // inline validation text
//! ├── sources: SourceSet             // aggregated reference URLs
//! ├── whitelist: Vec<String>         // allowed backend sources
//! ├── auth: AuthState                // platform sign-in status
//! ├── backend_status: BackendStatus  // last health probe
//! └── view: View                     // chat or sources
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::api::{ChatBackend, UserInfo};
use crate::core::config::{ResolvedConfig, SourceDisplay};
use crate::core::message::ChatMessage;
use crate::core::sources::SourceSet;

/// Which page the shell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    Sources,
}

impl View {
    pub fn toggled(self) -> View {
        match self {
            View::Chat => View::Sources,
            View::Sources => View::Chat,
        }
    }
}

/// Sign-in status as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No site URL configured; no auth UI.
    Disabled,
    Loading,
    SignedOut,
    SignedIn(UserInfo),
}

impl AuthState {
    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            AuthState::SignedIn(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

pub struct App {
    pub backend: Arc<dyn ChatBackend>,
    pub messages: Vec<ChatMessage>,
    pub status_message: String,
    pub is_loading: bool,
    pub input_error: Option<String>,
    pub max_message_chars: usize,
    pub source_display: SourceDisplay,
    pub sources: SourceSet,
    pub whitelist: Vec<String>,
    pub sources_loading: bool,
    /// True once the sources view has asked the backend at least once.
    pub sources_requested: bool,
    pub fetch_on_open: bool,
    pub indexed_only: bool,
    pub auth: AuthState,
    pub login_url: Option<String>,
    pub logout_url: Option<String>,
    pub backend_status: BackendStatus,
    pub api_base: String,
    pub view: View,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, api_base: String) -> Self {
        Self {
            backend,
            messages: Vec::new(),
            status_message: String::from("Ready"),
            is_loading: false,
            input_error: None,
            max_message_chars: crate::core::config::DEFAULT_MAX_MESSAGE_CHARS,
            source_display: SourceDisplay::default(),
            sources: SourceSet::new(),
            whitelist: Vec::new(),
            sources_loading: false,
            sources_requested: false,
            fetch_on_open: false,
            indexed_only: false,
            auth: AuthState::Disabled,
            login_url: None,
            logout_url: None,
            backend_status: BackendStatus::Unknown,
            api_base,
            view: View::Chat,
        }
    }

    /// Builds the app from resolved settings. `auth_urls` is `(login, logout)`
    /// when a site is configured; auth starts in `Loading` in that case.
    pub fn from_config(
        backend: Arc<dyn ChatBackend>,
        config: &ResolvedConfig,
        auth_urls: Option<(String, String)>,
    ) -> Self {
        let mut app = Self::new(backend, config.api_base.clone());
        app.max_message_chars = config.max_message_chars;
        app.source_display = config.source_display;
        app.whitelist = config.whitelist.clone();
        app.fetch_on_open = config.fetch_on_open;
        app.indexed_only = config.indexed_only;
        if let Some((login, logout)) = auth_urls {
            app.auth = AuthState::Loading;
            app.login_url = Some(login);
            app.logout_url = Some(logout);
        }
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Ready");
        assert!(!app.is_loading);
        assert!(app.messages.is_empty());
        assert_eq!(app.view, View::Chat);
        assert_eq!(app.auth, AuthState::Disabled);
    }

    #[test]
    fn test_view_toggles_back_and_forth() {
        assert_eq!(View::Chat.toggled(), View::Sources);
        assert_eq!(View::Sources.toggled(), View::Chat);
    }

    #[test]
    fn test_auth_state_accessors() {
        let user = UserInfo {
            user_details: "carl@example.com".to_string(),
            ..Default::default()
        };
        assert!(AuthState::Loading.is_loading());
        assert!(AuthState::SignedOut.user().is_none());
        assert_eq!(
            AuthState::SignedIn(user.clone()).user(),
            Some(&user)
        );
    }
}
