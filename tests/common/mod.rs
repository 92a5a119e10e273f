#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use result_extractor_lib::extractor::PortalSelectors;
use result_extractor_lib::portal::{Element, Selector};
use result_extractor_lib::{ExtractorConfig, PortalError, PortalSession, SessionLauncher};

/// What the scripted portal renders after a query is submitted.
#[derive(Debug, Clone)]
pub enum Page {
    Score(String),
    NotFound,
    NoScore,
    NavigationFails,
    Panics,
    /// The roll number input never renders.
    MissingInput,
    /// The exam type dropdown never becomes clickable.
    MissingExamType,
    /// The dropdown opens without the "General" option.
    MissingGeneralOption,
    /// The submit button never becomes clickable.
    MissingSubmit,
    /// The driver answers the not-found check with a command error.
    NoticeCheckFails,
    /// The browser goes away while checking for the not-found notice.
    NoticeCheckLosesSession,
}

#[derive(Default)]
pub struct Counters {
    pub launched: AtomicUsize,
    pub live: AtomicUsize,
    pub navigations: AtomicUsize,
}

impl Counters {
    pub fn launched(&self) -> usize { self.launched.load(Ordering::SeqCst) }
    pub fn live(&self) -> usize { self.live.load(Ordering::SeqCst) }
    pub fn navigations(&self) -> usize { self.navigations.load(Ordering::SeqCst) }
}

/// In-memory portal that plays back one `Page` per query.
pub struct ScriptedPortal {
    pages: Vec<Page>,
    current: Option<Page>,
    selectors: PortalSelectors,
    counters: Arc<Counters>,
    pub typed: Vec<String>,
    pub closed: bool,
}

impl ScriptedPortal {
    pub fn new(pages: Vec<Page>, counters: Arc<Counters>) -> Self {
        ScriptedPortal {
            pages,
            current: None,
            selectors: PortalSelectors::default(),
            counters,
            typed: Vec::new(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<(), PortalError> {
        if self.closed { Err(PortalError::Closed) } else { Ok(()) }
    }

    fn page(&self) -> Option<&Page> {
        self.current.as_ref()
    }

    fn never_renders(&self, selector: &Selector) -> bool {
        let sel = &self.selectors;
        match self.page() {
            Some(Page::MissingInput) => *selector == sel.roll_input,
            Some(Page::MissingExamType) => *selector == sel.exam_type,
            Some(Page::MissingGeneralOption) => *selector == sel.general_option,
            Some(Page::MissingSubmit) => *selector == sel.submit,
            _ => false,
        }
    }
}

impl PortalSession for ScriptedPortal {
    fn navigate(&mut self, _url: &str) -> Result<(), PortalError> {
        self.ensure_open()?;
        let page = if self.pages.is_empty() { Page::NoScore } else { self.pages.remove(0) };
        match page {
            Page::NavigationFails => {
                return Err(PortalError::WebDriver {
                    error: "unknown error".into(),
                    message: "net::ERR_NAME_NOT_RESOLVED".into(),
                })
            }
            Page::Panics => panic!("renderer crashed"),
            _ => {}
        }
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        self.current = Some(page);
        Ok(())
    }

    fn locate(&mut self, selector: &Selector, timeout: Duration) -> Result<Element, PortalError> {
        self.ensure_open()?;
        let timed_out = || PortalError::Timeout { selector: selector.to_string(), timeout };
        if self.never_renders(selector) {
            return Err(timed_out());
        }
        if *selector == self.selectors.not_found_notice {
            return match self.page() {
                Some(Page::NotFound) => Ok(Element("notice".into())),
                Some(Page::NoticeCheckFails) => Err(PortalError::WebDriver {
                    error: "invalid session id".into(),
                    message: "session deleted because of page crash".into(),
                }),
                Some(Page::NoticeCheckLosesSession) => Err(PortalError::Closed),
                _ => Err(timed_out()),
            };
        }
        if *selector == self.selectors.score {
            return match self.page() {
                Some(Page::Score(_)) => Ok(Element("score".into())),
                _ => Err(timed_out()),
            };
        }
        Ok(Element(selector.value().to_string()))
    }

    fn locate_clickable(&mut self, selector: &Selector, timeout: Duration) -> Result<Element, PortalError> {
        self.locate(selector, timeout)
    }

    fn click(&mut self, _element: &Element) -> Result<(), PortalError> {
        self.ensure_open()
    }

    fn clear(&mut self, _element: &Element) -> Result<(), PortalError> {
        self.ensure_open()
    }

    fn type_text(&mut self, _element: &Element, text: &str) -> Result<(), PortalError> {
        self.ensure_open()?;
        self.typed.push(text.to_string());
        Ok(())
    }

    fn read_text(&mut self, element: &Element) -> Result<String, PortalError> {
        self.ensure_open()?;
        match (element.0.as_str(), self.page()) {
            ("score", Some(Page::Score(text))) => Ok(text.clone()),
            _ => Err(PortalError::NoSuchElement(element.0.clone())),
        }
    }

    fn close(&mut self) -> Result<(), PortalError> {
        self.ensure_open()?;
        self.closed = true;
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launches scripted sessions; each launched session plays the next script.
pub struct ScriptedLauncher {
    scripts: std::sync::Mutex<Vec<Vec<Page>>>,
    pub counters: Arc<Counters>,
    fail: bool,
}

impl ScriptedLauncher {
    /// One single-page script per launch.
    pub fn per_launch(pages: Vec<Page>) -> Self {
        Self::with_scripts(pages.into_iter().map(|p| vec![p]).collect())
    }

    pub fn with_scripts(scripts: Vec<Vec<Page>>) -> Self {
        ScriptedLauncher {
            scripts: std::sync::Mutex::new(scripts),
            counters: Arc::new(Counters::default()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        ScriptedLauncher { fail: true, ..Self::with_scripts(Vec::new()) }
    }
}

impl SessionLauncher for ScriptedLauncher {
    fn launch(&self) -> Result<Box<dyn PortalSession>, PortalError> {
        if self.fail {
            return Err(PortalError::Protocol("session not created".into()));
        }
        let mut scripts = self.scripts.lock().unwrap();
        let pages = if scripts.is_empty() { Vec::new() } else { scripts.remove(0) };
        self.counters.launched.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPortal::new(pages, self.counters.clone())))
    }
}

/// Extractor settings with no settle delay and short waits.
pub fn fast_config() -> ExtractorConfig {
    ExtractorConfig {
        wait_timeout: Duration::from_millis(10),
        settle_delay: Duration::ZERO,
        ..ExtractorConfig::default()
    }
}
