use std::fmt;
use std::time::Duration;
use log::warn;
use thiserror::Error;

/// How an element is addressed on the portal page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn id(id: &str) -> Self {
        Selector::Css(format!("#{}", id))
    }

    pub fn xpath(expr: &str) -> Self {
        Selector::XPath(expr.to_string())
    }

    /// Locator strategy name as used by the WebDriver protocol.
    pub fn strategy(&self) -> &'static str {
        match self {
            Selector::Css(_) => "css selector",
            Selector::XPath(_) => "xpath",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Selector::Css(v) | Selector::XPath(v) => v,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.strategy(), self.value())
    }
}

/// Opaque reference to an element found in a live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element(pub String);

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("timed out after {timeout:?} waiting for {selector}")]
    Timeout { selector: String, timeout: Duration },
    #[error("no such element: {0}")]
    NoSuchElement(String),
    #[error("webdriver error `{error}`: {message}")]
    WebDriver { error: String, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected driver response: {0}")]
    Protocol(String),
    #[error("session is closed")]
    Closed,
}

/// The handful of browser capabilities the extraction protocol needs.
pub trait PortalSession {
    fn navigate(&mut self, url: &str) -> Result<(), PortalError>;

    /// Waits up to `timeout` for an element matching `selector` to be present.
    fn locate(&mut self, selector: &Selector, timeout: Duration) -> Result<Element, PortalError>;

    /// Waits up to `timeout` for an element to be present, visible and enabled.
    fn locate_clickable(&mut self, selector: &Selector, timeout: Duration) -> Result<Element, PortalError>;

    fn click(&mut self, element: &Element) -> Result<(), PortalError>;
    fn clear(&mut self, element: &Element) -> Result<(), PortalError>;
    fn type_text(&mut self, element: &Element, text: &str) -> Result<(), PortalError>;
    fn read_text(&mut self, element: &Element) -> Result<String, PortalError>;
    fn close(&mut self) -> Result<(), PortalError>;

    /// Single look for an element without waiting. Absence is `Ok(None)`;
    /// only session-level failures are errors.
    fn probe(&mut self, selector: &Selector) -> Result<Option<Element>, PortalError> {
        match self.locate(selector, Duration::ZERO) {
            Ok(element) => Ok(Some(element)),
            Err(PortalError::Timeout { .. }) | Err(PortalError::NoSuchElement(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Creates fresh browser sessions.
pub trait SessionLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn PortalSession>, PortalError>;
}

/// Owns a launched session and closes it exactly once, either through
/// `release` or when dropped (including during unwinding).
pub struct ScopedSession {
    inner: Box<dyn PortalSession>,
    released: bool,
}

impl ScopedSession {
    pub fn new(inner: Box<dyn PortalSession>) -> Self {
        ScopedSession { inner, released: false }
    }

    pub fn session(&mut self) -> &mut dyn PortalSession {
        self.inner.as_mut()
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.inner.close() {
            warn!("Failed to close browser session: {}", e);
        }
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        self.release();
    }
}
