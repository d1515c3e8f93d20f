//! # Actions
//!
//! Everything that can happen in Stardust becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ResponseReceived(reply)`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing the I/O the caller should start.
//! No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use std::fmt;

use log::{debug, info};

use crate::api::{ChatReply, SourcesListing, UserInfo};
use crate::core::config::SourceDisplay;
use crate::core::message::ChatMessage;
use crate::core::sources::apply_whitelist;
use crate::core::state::{App, AuthState, BackendStatus, View};

#[derive(Debug)]
pub enum Action {
    /// User pressed Enter with this text in the input box.
    Submit(String),
    /// Input text changed; clears stale validation.
    InputEdited,
    ResponseReceived(ChatReply),
    ResponseFailed(String),
    AuthResolved(Option<UserInfo>),
    HealthChecked(bool),
    ToggleView,
    RefreshSources,
    SourcesLoaded(SourcesListing),
    SourcesFailed(String),
    OpenUrl(String),
    Login,
    Logout,
    Quit,
}

/// I/O requested by `update()`, performed by the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Input accepted: clear the box and send this text to the backend.
    SendMessage(String),
    FetchSources,
    OpenUrl(String),
}

/// Local rejection of input before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    TooLong { len: usize, max: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::TooLong { len, max } => {
                write!(f, "Message is too long: {len}/{max} characters.")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Checks `text` against the character ceiling (counted in chars, not bytes).
pub fn validate_message(text: &str, max: usize) -> Result<(), InputError> {
    let len = text.chars().count();
    if len > max {
        Err(InputError::TooLong { len, max })
    } else {
        Ok(())
    }
}

/// Prefix of the assistant turn shown when a request fails.
pub const FAILURE_PREFIX: &str = "Sorry, something went wrong";

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if app.is_loading || text.trim().is_empty() {
                return Effect::None;
            }
            if let Err(e) = validate_message(&text, app.max_message_chars) {
                info!("Rejected input locally: {}", e);
                app.input_error = Some(e.to_string());
                return Effect::None;
            }

            app.input_error = None;
            app.messages.push(ChatMessage::user(text.clone()));
            app.is_loading = true;
            app.status_message = String::from("Thinking...");
            Effect::SendMessage(text)
        }
        Action::InputEdited => {
            app.input_error = None;
            Effect::None
        }
        Action::ResponseReceived(reply) => {
            app.is_loading = false;
            let inline_sources = match app.source_display {
                SourceDisplay::Aggregate => {
                    app.sources = app.sources.merged(&reply.sources);
                    None
                }
                SourceDisplay::Inline => {
                    (!reply.sources.is_empty()).then_some(reply.sources)
                }
            };
            app.messages
                .push(ChatMessage::assistant(reply.response, inline_sources));
            app.status_message = String::from("Ready");
            debug!(
                "Reply appended: transcript={} aggregated_sources={}",
                app.messages.len(),
                app.sources.len()
            );
            Effect::None
        }
        Action::ResponseFailed(message) => {
            app.is_loading = false;
            app.messages.push(ChatMessage::assistant(
                format!("{FAILURE_PREFIX}: {message}"),
                None,
            ));
            app.status_message = String::from("Request failed");
            Effect::None
        }
        Action::AuthResolved(user) => {
            if app.auth != AuthState::Disabled {
                app.auth = match user {
                    Some(user) => AuthState::SignedIn(user),
                    None => AuthState::SignedOut,
                };
            }
            Effect::None
        }
        Action::HealthChecked(healthy) => {
            app.backend_status = if healthy {
                BackendStatus::Online
            } else {
                BackendStatus::Offline
            };
            Effect::None
        }
        Action::ToggleView => {
            app.view = app.view.toggled();
            if app.view == View::Sources && app.fetch_on_open && !app.sources_requested {
                return request_sources(app);
            }
            Effect::None
        }
        Action::RefreshSources => request_sources(app),
        Action::SourcesLoaded(listing) => {
            app.sources_loading = false;
            let allowed = apply_whitelist(&listing.sources, &app.whitelist);
            let before = app.sources.len();
            app.sources = app.sources.merged(&allowed);
            app.status_message = match listing.counts {
                Some(counts) => format!(
                    "Loaded {} sources ({} training, {} indexed)",
                    allowed.len(),
                    counts.training,
                    counts.indexed
                ),
                None => format!("Loaded {} sources", allowed.len()),
            };
            debug!(
                "Sources merged: backend={} allowed={} new={}",
                listing.sources.len(),
                allowed.len(),
                app.sources.len() - before
            );
            Effect::None
        }
        Action::SourcesFailed(message) => {
            app.sources_loading = false;
            app.status_message = format!("Could not load sources: {message}");
            Effect::None
        }
        Action::OpenUrl(url) => {
            app.status_message = format!("Opening {url}");
            Effect::OpenUrl(url)
        }
        Action::Login => match app.login_url.clone() {
            Some(url) if app.auth.user().is_none() => {
                app.status_message = String::from("Opening sign-in page");
                Effect::OpenUrl(url)
            }
            Some(_) => Effect::None,
            None => {
                app.status_message = String::from("Sign-in is not configured");
                Effect::None
            }
        },
        Action::Logout => match app.logout_url.clone() {
            Some(url) if app.auth.user().is_some() => {
                app.auth = AuthState::SignedOut;
                app.status_message = String::from("Signed out");
                Effect::OpenUrl(url)
            }
            _ => Effect::None,
        },
        Action::Quit => Effect::Quit,
    }
}

fn request_sources(app: &mut App) -> Effect {
    if app.sources_loading {
        return Effect::None;
    }
    app.sources_loading = true;
    app.sources_requested = true;
    app.status_message = String::from("Loading sources...");
    Effect::FetchSources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceCounts;
    use crate::core::message::Role;
    use crate::test_support::test_app;

    fn reply(response: &str, sources: &[&str]) -> ChatReply {
        ChatReply {
            response: response.to_string(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            metadata: None,
        }
    }

    #[test]
    fn test_submit_appends_user_turn_and_requests_send() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("Why are we made of stardust?".into()));

        assert_eq!(effect, Effect::SendMessage("Why are we made of stardust?".into()));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, Role::User);
        assert_eq!(app.messages[0].content, "Why are we made of stardust?");
        assert!(app.is_loading);
    }

    #[test]
    fn test_reply_appends_exactly_one_assistant_turn() {
        let mut app = test_app();
        update(&mut app, Action::Submit("Why are we made of stardust?".into()));
        update(
            &mut app,
            Action::ResponseReceived(reply("We are star stuff.", &["https://a.example"])),
        );

        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[1].role, Role::Assistant);
        assert_eq!(app.messages[1].content, "We are star stuff.");
        assert!(!app.is_loading);
    }

    #[test]
    fn test_too_long_input_is_rejected_without_sending() {
        let mut app = test_app();
        app.max_message_chars = 10;
        let effect = update(&mut app, Action::Submit("a".repeat(11)));

        assert_eq!(effect, Effect::None);
        assert!(app.messages.is_empty());
        assert!(!app.is_loading);
        let error = app.input_error.as_deref().unwrap();
        assert!(error.contains("11"), "missing length: {error}");
        assert!(error.contains("10"), "missing ceiling: {error}");
    }

    #[test]
    fn test_ceiling_counts_chars_not_bytes() {
        assert!(validate_message(&"é".repeat(10), 10).is_ok());
        assert_eq!(
            validate_message(&"é".repeat(11), 10),
            Err(InputError::TooLong { len: 11, max: 10 })
        );
    }

    #[test]
    fn test_editing_clears_validation() {
        let mut app = test_app();
        app.max_message_chars = 1;
        update(&mut app, Action::Submit("too long".into()));
        assert!(app.input_error.is_some());
        update(&mut app, Action::InputEdited);
        assert!(app.input_error.is_none());
    }

    #[test]
    fn test_blank_and_busy_submits_are_ignored() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Submit("   ".into())), Effect::None);
        assert!(app.messages.is_empty());

        update(&mut app, Action::Submit("first".into()));
        assert_eq!(update(&mut app, Action::Submit("second".into())), Effect::None);
        assert_eq!(app.messages.len(), 1);
    }

    #[test]
    fn test_failure_appends_error_turn_with_message() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hello".into()));
        update(&mut app, Action::ResponseFailed("too long".into()));

        assert_eq!(app.messages.len(), 2);
        assert_eq!(
            app.messages[1].content,
            "Sorry, something went wrong: too long"
        );
        assert!(!app.is_loading);
    }

    #[test]
    fn test_aggregate_mode_collects_sources_once() {
        let mut app = test_app();
        update(&mut app, Action::Submit("one".into()));
        update(
            &mut app,
            Action::ResponseReceived(reply("a", &["https://a.example", "https://b.example"])),
        );
        update(&mut app, Action::Submit("two".into()));
        update(
            &mut app,
            Action::ResponseReceived(reply("b", &["https://b.example"])),
        );

        assert_eq!(app.sources.len(), 2);
        assert!(app.messages.iter().all(|m| m.sources.is_none()));
    }

    #[test]
    fn test_inline_mode_attaches_sources_to_turn() {
        let mut app = test_app();
        app.source_display = SourceDisplay::Inline;
        update(&mut app, Action::Submit("q".into()));
        update(
            &mut app,
            Action::ResponseReceived(reply("a", &["https://a.example"])),
        );

        assert_eq!(
            app.messages[1].sources,
            Some(vec!["https://a.example".to_string()])
        );
        assert!(app.sources.is_empty());
    }

    #[test]
    fn test_inline_mode_without_sources_has_no_badges() {
        let mut app = test_app();
        app.source_display = SourceDisplay::Inline;
        update(&mut app, Action::ResponseReceived(reply("a", &[])));
        assert_eq!(app.messages[0].sources, None);
    }

    #[test]
    fn test_sources_listing_is_whitelisted() {
        let mut app = test_app();
        app.whitelist = vec!["https://a.example".into(), "https://b.example".into()];
        update(&mut app, Action::RefreshSources);
        assert!(app.sources_loading);

        update(
            &mut app,
            Action::SourcesLoaded(SourcesListing {
                sources: vec!["https://b.example".into(), "https://x.example".into()],
                counts: Some(SourceCounts {
                    training: 1,
                    indexed: 1,
                    combined: 2,
                }),
            }),
        );
        assert!(!app.sources_loading);
        assert_eq!(app.sources.as_slice(), &["https://b.example".to_string()]);
        assert!(app.status_message.contains("1 training"));
    }

    #[test]
    fn test_refresh_while_loading_is_ignored() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::RefreshSources), Effect::FetchSources);
        assert_eq!(update(&mut app, Action::RefreshSources), Effect::None);
    }

    #[test]
    fn test_toggle_view_fetches_once_when_configured() {
        let mut app = test_app();
        app.fetch_on_open = true;
        assert_eq!(update(&mut app, Action::ToggleView), Effect::FetchSources);
        assert_eq!(app.view, View::Sources);
        update(&mut app, Action::SourcesFailed("HTTP 500".into()));
        update(&mut app, Action::ToggleView);
        assert_eq!(update(&mut app, Action::ToggleView), Effect::None);
        assert!(app.status_message.contains("HTTP 500"));
    }

    #[test]
    fn test_auth_resolution() {
        let mut app = test_app();
        app.auth = AuthState::Loading;
        app.login_url = Some("https://site/.auth/login/aad".into());
        app.logout_url = Some("https://site/.auth/logout".into());

        update(&mut app, Action::AuthResolved(None));
        assert_eq!(app.auth, AuthState::SignedOut);
        assert_eq!(
            update(&mut app, Action::Login),
            Effect::OpenUrl("https://site/.auth/login/aad".into())
        );

        let user = UserInfo {
            user_details: "carl@example.com".into(),
            ..Default::default()
        };
        update(&mut app, Action::AuthResolved(Some(user)));
        assert!(app.auth.user().is_some());
        assert_eq!(
            update(&mut app, Action::Logout),
            Effect::OpenUrl("https://site/.auth/logout".into())
        );
        assert_eq!(app.auth, AuthState::SignedOut);
    }

    #[test]
    fn test_auth_disabled_stays_disabled() {
        let mut app = test_app();
        update(&mut app, Action::AuthResolved(None));
        assert_eq!(app.auth, AuthState::Disabled);
        assert_eq!(update(&mut app, Action::Login), Effect::None);
    }

    #[test]
    fn test_health_check_sets_backend_status() {
        let mut app = test_app();
        update(&mut app, Action::HealthChecked(false));
        assert_eq!(app.backend_status, BackendStatus::Offline);
        update(&mut app, Action::HealthChecked(true));
        assert_eq!(app.backend_status, BackendStatus::Online);
    }

    #[test]
    fn test_quit_effect() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
