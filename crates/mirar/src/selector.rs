//! Selectors: located (or not-yet-located) visual patterns.

use crate::geometry::Rect;
use crate::input::PendingAction;
use crate::pattern::Pattern;
use crate::sequencer::ActionSequencer;
use image::RgbaImage;
use std::sync::Arc;

/// What to search for in the screen buffer.
///
/// A closed union: a string rendered through the configured font face, a raw
/// pixel grid, or a previously resolved pattern (including one taken from an
/// earlier match). Anything else is unrepresentable; the one remaining
/// misconfiguration, a text selector without a font face, surfaces as a
/// typed [`Config`](crate::MirarError::Config) error.
#[derive(Debug, Clone)]
pub enum SelectorSpec {
    /// Text rendered with the harness font face and assertion color
    Text(String),
    /// Raw straight-alpha pixel grid
    Image(RgbaImage),
    /// An already-built pattern
    Pattern(Pattern),
}

impl From<&str> for SelectorSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for SelectorSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<RgbaImage> for SelectorSpec {
    fn from(image: RgbaImage) -> Self {
        Self::Image(image)
    }
}

impl From<Pattern> for SelectorSpec {
    fn from(pattern: Pattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<&Selector> for SelectorSpec {
    fn from(selector: &Selector) -> Self {
        Self::Pattern(selector.pattern().clone())
    }
}

/// A pattern together with where it was found on screen.
///
/// Returned by the harness assertions. A matched selector can request a
/// click on its on-screen location, or serve as the pattern of a new search.
#[derive(Debug, Clone)]
pub struct Selector {
    pattern: Pattern,
    rect: Option<Rect>,
    actions: Arc<ActionSequencer>,
}

impl Selector {
    pub(crate) fn new(pattern: Pattern, rect: Option<Rect>, actions: Arc<ActionSequencer>) -> Self {
        Self {
            pattern,
            rect,
            actions,
        }
    }

    /// The pattern this selector searches for
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Where the pattern was found, if it was
    #[must_use]
    pub const fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// Whether the pattern was found on screen
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.rect.is_some()
    }

    /// Click the center of the matched bounds.
    ///
    /// Blocks until the render loop has executed the click, so the next
    /// assertion observes a frame drawn after the event.
    ///
    /// # Panics
    ///
    /// Panics when the selector is unmatched. That is a precondition
    /// violation in the calling test, not a recoverable runtime error.
    pub fn click(&self) {
        let rect = self
            .rect
            .unwrap_or_else(|| panic!("click() on an unmatched selector"));
        let center = rect.center();
        self.actions
            .request(PendingAction::click(center.x, center.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pattern() -> Pattern {
        Pattern::new(RgbaImage::from_pixel(2, 2, Rgba([5, 5, 5, 255])))
    }

    #[test]
    fn test_spec_from_text() {
        let spec: SelectorSpec = "Click Me".into();
        assert!(matches!(spec, SelectorSpec::Text(ref t) if t == "Click Me"));
    }

    #[test]
    fn test_spec_from_image() {
        let spec: SelectorSpec = RgbaImage::new(3, 3).into();
        assert!(matches!(spec, SelectorSpec::Image(_)));
    }

    #[test]
    fn test_spec_from_prior_match() {
        let sel = Selector::new(
            pattern(),
            Some(Rect::new(0, 0, 2, 2)),
            Arc::new(ActionSequencer::new()),
        );
        let spec: SelectorSpec = (&sel).into();
        assert!(matches!(spec, SelectorSpec::Pattern(_)));
    }

    #[test]
    fn test_unmatched_selector_reports_no_rect() {
        let sel = Selector::new(pattern(), None, Arc::new(ActionSequencer::new()));
        assert!(!sel.is_matched());
        assert!(sel.rect().is_none());
    }

    #[test]
    #[should_panic(expected = "unmatched selector")]
    fn test_click_unmatched_panics() {
        let sel = Selector::new(pattern(), None, Arc::new(ActionSequencer::new()));
        sel.click();
    }
}
