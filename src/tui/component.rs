use ratatui::Frame;
use ratatui::layout::Rect;

/// Something that draws itself into a region of the frame.
///
/// Props are plain struct fields filled in by the parent each frame.
/// `render` takes `&mut self` so a component can update presentation state
/// (scroll offsets, cached heights) while drawing, the same way ratatui's
/// `StatefulWidget` does.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns raw `TuiEvent`s into a component's own events.
pub trait EventHandler {
    /// What the component reports back to the event loop.
    type Event;

    /// Returns `None` when the event was ignored or fully handled inside.
    fn handle_event(&mut self, event: &super::event::TuiEvent) -> Option<Self::Event>;
}
