//! # TUI Components
//!
//! ## Stateless Components (Props-Based Rendering)
//!
//! Receive everything they draw as struct fields, rebuilt each frame:
//! - `TitleBar`: title, quote, auth and backend status
//! - `Message`: one transcript turn
//! - `LandingPage`: welcome screen with example questions
//!
//! ## Stateful Components (Event-Driven)
//!
//! Keep local state in `TuiState` and emit their own events:
//! - `InputBox`: question field with character counter
//! - `MessageList`: scrollable transcript (`MessageListState`)
//! - `SourcesView`: selectable list of reference URLs (`SourcesViewState`)
//!
//! Each file holds the component's state, events, rendering and tests.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (page header)
//! ├── landing.rs       (welcome screen)
//! ├── message.rs       (single turn renderer)
//! ├── message_list.rs  (scrollable transcript)
//! ├── sources_view.rs  (reference URL list)
//! └── input_box/       (question input)
//! ```

pub mod input_box;
pub mod landing;
pub mod message;
pub mod message_list;
pub mod sources_view;
pub mod title_bar;

pub use input_box::{InputBox, InputEvent};
pub use landing::{EXAMPLE_QUESTIONS, LandingPage};
pub use message_list::{MessageList, MessageListState};
pub use sources_view::{SourcesEvent, SourcesView, SourcesViewState};
pub use title_bar::TitleBar;
