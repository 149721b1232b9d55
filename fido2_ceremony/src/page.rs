/// Where a finished flow sends the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Full-page navigation to a path on the relying-party server
    Assign(String),
    /// Reload the current page
    Reload,
}

/// Page-level side effects injected into a flow.
///
/// Flows never look the page up themselves, so they can run against a real
/// browser binding, a headless client or a test double.
pub trait Navigator: Send + Sync {
    fn assign(&self, url: &str);

    fn reload(&self);

    fn navigate(&self, navigation: &Navigation) {
        match navigation {
            Navigation::Assign(url) => self.assign(url),
            Navigation::Reload => self.reload(),
        }
    }
}
