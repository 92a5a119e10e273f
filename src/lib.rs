pub mod roll_number;
pub mod outcome;
pub mod portal;
pub mod webdriver;
pub mod extractor;
pub mod aggregator;
pub mod batch;
pub mod config;
pub mod report;
pub mod delay_manager;
pub mod logger;

// Exporting types for convenience
pub use aggregator::aggregate;
pub use batch::{run_batch, BatchReport, SessionPolicy};
pub use config::Config;
pub use extractor::{Extractor, ExtractorConfig};
pub use outcome::{OutcomeRecord, Status, Summary};
pub use portal::{PortalError, PortalSession, SessionLauncher};
pub use roll_number::{expand_range, validate_roll_number, RangeError};
pub use webdriver::WebDriverLauncher;
