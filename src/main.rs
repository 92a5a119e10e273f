use result_extractor_lib::{logger, report, roll_number, batch};
use result_extractor_lib::{Config, Extractor, SessionPolicy, WebDriverLauncher};

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use clap::Parser;
use log::info;

/// Fetch, rank and summarize results for a range of roll numbers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// First roll number of the range, e.g. 24EG105G01
    start_roll: String,
    /// Last roll number of the range (inclusive)
    end_roll: String,
    /// Where to write the report; a `.xlsx` path writes an Excel workbook, anything else CSV
    #[arg(short, long, default_value = "results.csv")]
    out: PathBuf,
    /// Reuse one browser session for the whole range
    #[arg(long)]
    shared_session: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    logger::init();
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if args.shared_session {
        config.session_policy = SessionPolicy::Shared;
    }

    // Range errors are reported before any browser is started.
    let roll_numbers = roll_number::expand_range(&args.start_roll, &args.end_roll)?;
    info!("Extracting results for {} roll numbers", roll_numbers.len());

    let launcher = WebDriverLauncher::new(config.webdriver_url.clone(), config.browser_args.clone())?;
    let extractor = Extractor::new(config.extractor.clone(), launcher);
    let outcome = batch::run_batch(&extractor, &roll_numbers, config.session_policy);

    println!("{:<12} {:>6}  {}", "ROLL NUMBER", "CGPA", "STATUS");
    for record in &outcome.results {
        println!("{:<12} {:>6}  {}", record.roll_number, record.score, record.status);
    }
    println!();
    for (key, count) in outcome.summary.entries() {
        println!("{:<10} {}", key, count);
    }

    let wants_xlsx = args.out.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if wants_xlsx {
        std::fs::write(&args.out, report::to_xlsx_bytes(&outcome.results, &outcome.summary)?)?;
    } else {
        let file = File::create(&args.out)?;
        report::write_report(file, &outcome.results, &outcome.summary)?;
    }
    info!("Report written to {}", args.out.display());
    Ok(())
}
