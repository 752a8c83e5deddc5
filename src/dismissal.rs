//! Outside-click dismissal of the suggestions dropdown.

use crate::view::{ClickTarget, PageView, RegionId};

/// Closes the suggestions dropdown when a click lands outside the search area.
///
/// Runs after the clicked entry's own handler, for every click on the page.
#[derive(Debug, Clone)]
pub struct DismissalController {
    guarded: Vec<RegionId>,
}

impl DismissalController {
    pub fn new(guarded: impl IntoIterator<Item = RegionId>) -> Self {
        Self {
            guarded: guarded.into_iter().collect(),
        }
    }

    /// Guards the dropdown, the search input and the history panel.
    pub fn standard() -> Self {
        Self::new([
            RegionId::SuggestionsList,
            RegionId::SearchInput,
            RegionId::SearchHistory,
        ])
    }

    pub fn guards(&self, target: &ClickTarget) -> bool {
        self.guarded.iter().any(|region| target.is_within(*region))
    }

    /// Returns whether the dropdown was hidden by this click.
    pub fn on_click(&self, target: &ClickTarget, view: &mut PageView) -> bool {
        if self.guards(target) {
            return false;
        }
        let was_visible = view.suggestions.is_visible();
        view.suggestions.hide();
        was_visible
    }
}

impl Default for DismissalController {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::Widget;
    use crate::view::ListEntry;

    fn open_view() -> PageView {
        let mut view = PageView::new();
        view.suggestions.push(ListEntry::plain("Hackathon"));
        view.suggestions.show();
        view
    }

    #[test]
    fn outside_click_hides_dropdown() {
        let controller = DismissalController::standard();
        for target in [ClickTarget::Elsewhere, ClickTarget::Widget(Widget::Feed)] {
            let mut view = open_view();
            assert!(controller.on_click(&target, &mut view));
            assert!(!view.suggestions.is_visible());
            assert_eq!(view.suggestions.len(), 1, "entries are kept, only hidden");
        }
    }

    #[test]
    fn clicks_inside_guarded_regions_keep_dropdown() {
        let controller = DismissalController::standard();
        for target in [
            ClickTarget::SearchInput,
            ClickTarget::SuggestionsList,
            ClickTarget::SuggestionEntry(0),
            ClickTarget::HistoryPanel,
            ClickTarget::HistoryEntry(3),
        ] {
            let mut view = open_view();
            assert!(!controller.on_click(&target, &mut view), "{target:?}");
            assert!(view.suggestions.is_visible(), "{target:?}");
        }
    }

    #[test]
    fn hidden_dropdown_reports_no_change() {
        let controller = DismissalController::default();
        let mut view = PageView::new();
        assert!(!controller.on_click(&ClickTarget::Elsewhere, &mut view));
    }

    #[test]
    fn custom_guard_set() {
        let controller = DismissalController::new([RegionId::SuggestionsList]);
        let mut view = open_view();
        assert!(controller.on_click(&ClickTarget::SearchInput, &mut view));
    }
}
