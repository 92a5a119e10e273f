use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};
use crate::delay_manager;
use crate::outcome::{parse_score, OutcomeRecord, SCORE_SENTINEL};
use crate::portal::{PortalError, PortalSession, ScopedSession, SessionLauncher, Selector};

pub const DEFAULT_RESULT_URL: &str = "https://aupulse.campx.in/aupulse/ums/results";

/// Where things live on the result portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSelectors {
    pub roll_input: Selector,
    pub exam_type: Selector,
    pub general_option: Selector,
    pub submit: Selector,
    pub not_found_notice: Selector,
    pub score: Selector,
}

impl Default for PortalSelectors {
    fn default() -> Self {
        PortalSelectors {
            roll_input: Selector::id("rollNo"),
            exam_type: Selector::id("examType"),
            general_option: Selector::xpath("//li[contains(text(), 'General')]"),
            submit: Selector::xpath("//button[@type='submit' and contains(text(), 'Get Result')]"),
            not_found_notice: Selector::xpath("//*[contains(text(), 'Cannot find student with roll no')]"),
            score: Selector::xpath(
                "//div[contains(@class, 'MuiBox-root') and contains(@class, 'css-bmlw8o') and contains(text(), 'CGPA')]",
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractorConfig {
    pub result_url: String,
    pub wait_timeout: Duration,
    pub settle_delay: Duration,
    pub selectors: PortalSelectors,
    /// Text preceding the score in the score element, e.g. `CGPA : 8.52`.
    pub score_label: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            result_url: DEFAULT_RESULT_URL.to_string(),
            wait_timeout: Duration::from_secs(15),
            settle_delay: Duration::from_secs(2),
            selectors: PortalSelectors::default(),
            score_label: "CGPA :".to_string(),
        }
    }
}

/// Runs the result lookup for one roll number at a time.
pub struct Extractor {
    config: ExtractorConfig,
    launcher: Arc<dyn SessionLauncher>,
}

impl Extractor {
    pub fn new<L: SessionLauncher + 'static>(config: ExtractorConfig, launcher: L) -> Self {
        Extractor {
            config,
            launcher: Arc::new(launcher),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn launch_session(&self) -> Result<ScopedSession, PortalError> {
        self.launcher.launch().map(ScopedSession::new)
    }

    /// Looks up one roll number. Never fails: every fault becomes an
    /// `ExtractionError` record.
    ///
    /// A caller-supplied session is left open. Without one, a session is
    /// launched for this call and released before returning.
    pub fn extract(&self, roll_number: &str, session: Option<&mut dyn PortalSession>) -> OutcomeRecord {
        let outcome = panic::catch_unwind(AssertUnwindSafe(move || match session {
            Some(session) => self.run_protocol(roll_number, session),
            None => self.extract_ephemeral(roll_number),
        }));

        match outcome {
            Ok(Ok(record)) => {
                info!("{}: {} ({})", roll_number, record.status, record.score);
                record
            }
            Ok(Err(e)) => {
                warn!("{}: extraction failed: {}", roll_number, e);
                OutcomeRecord::extraction_error(roll_number)
            }
            Err(_) => {
                error!("{}: browser session panicked during extraction", roll_number);
                OutcomeRecord::extraction_error(roll_number)
            }
        }
    }

    fn extract_ephemeral(&self, roll_number: &str) -> Result<OutcomeRecord, PortalError> {
        let mut scoped = self.launch_session()?;
        let record = self.run_protocol(roll_number, scoped.session());
        scoped.release();
        record
    }

    fn run_protocol(&self, roll_number: &str, session: &mut dyn PortalSession) -> Result<OutcomeRecord, PortalError> {
        let sel = &self.config.selectors;
        let wait = self.config.wait_timeout;

        session.navigate(&self.config.result_url)?;

        let input = session.locate(&sel.roll_input, wait)?;
        session.clear(&input)?;
        session.type_text(&input, roll_number)?;

        let dropdown = session.locate_clickable(&sel.exam_type, wait)?;
        session.click(&dropdown)?;
        let general = session.locate(&sel.general_option, wait)?;
        session.click(&general)?;

        let submit = session.locate_clickable(&sel.submit, wait)?;
        session.click(&submit)?;
        delay_manager::settle_delay(self.config.settle_delay);

        if session.probe(&sel.not_found_notice)?.is_some() {
            return Ok(OutcomeRecord::not_found(roll_number));
        }

        let score = session.locate(&sel.score, wait)?;
        let text = session.read_text(&score)?;
        debug!("{}: score element reads '{}'", roll_number, text);
        Ok(classify_score_text(roll_number, &text, &self.config.score_label))
    }
}

/// Classifies the text of the score element, e.g. `CGPA : 8.52`.
pub fn classify_score_text(roll_number: &str, text: &str, label: &str) -> OutcomeRecord {
    let text = text.trim();
    if !text.starts_with(label) {
        return OutcomeRecord::extraction_error(roll_number);
    }

    let value = text.rsplit(':').next().unwrap_or_default().trim();
    if value == SCORE_SENTINEL {
        OutcomeRecord::backlog(roll_number)
    } else if parse_score(value).is_some() {
        OutcomeRecord::active(roll_number, value)
    } else {
        OutcomeRecord::extraction_error(roll_number)
    }
}
