//! Modal presentation contract.

/// Markup fragments for a dismissible overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalPanel {
    pub title: String,
    pub body: String,
    pub footer: String,
}

impl ModalPanel {
    pub fn new(title: impl Into<String>, body: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            footer: footer.into(),
        }
    }
}

/// Displays modal panels. Closing a panel clears no grid state.
pub trait ModalPresenter {
    fn show(&mut self, panel: ModalPanel);
    fn close(&mut self);
}
