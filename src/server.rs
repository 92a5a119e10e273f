use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use actix_cors::Cors;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use log::{error, info, warn};

use result_extractor_lib::{logger, report};
use result_extractor_lib::{expand_range, run_batch, validate_roll_number};
use result_extractor_lib::{Config, Extractor, OutcomeRecord, SessionPolicy, Summary, WebDriverLauncher};

const FRONTEND_DIR: &str = "./frontend/dist";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

struct AppState {
    extractor: Arc<Extractor>,
    session_policy: SessionPolicy,
}

#[derive(Deserialize)]
struct RangeRequest {
    start_roll: Option<String>,
    end_roll: Option<String>,
}

#[derive(Deserialize)]
struct ExportRequest {
    #[serde(default)]
    results: Vec<OutcomeRecord>,
    #[serde(default)]
    summary: Summary,
}

#[get("/api/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json("Server is running")
}

#[post("/api/results")]
async fn get_results(body: web::Json<RangeRequest>, data: web::Data<AppState>) -> impl Responder {
    let start = body.start_roll.as_deref().unwrap_or_default();
    let end = body.end_roll.as_deref().unwrap_or_default();
    info!("Received range request: '{}' to '{}'", start, end);

    if !(validate_roll_number(start) && validate_roll_number(end)) {
        warn!("Invalid roll number format");
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Invalid roll number format." }));
    }

    let roll_numbers = match expand_range(start, end) {
        Ok(rolls) => rolls,
        Err(e) => {
            warn!("Rejected range: {}", e);
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }));
        }
    };

    let extractor = data.extractor.clone();
    let policy = data.session_policy;
    match web::block(move || run_batch(&extractor, &roll_numbers, policy)).await {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => {
            error!("Batch worker failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error",
                "details": e.to_string()
            }))
        }
    }
}

#[post("/api/download/csv")]
async fn download_csv(body: web::Json<ExportRequest>) -> impl Responder {
    match report::to_csv_bytes(&body.results, &body.summary) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv")
            .append_header(("Content-Disposition", "attachment; filename=\"results.csv\""))
            .body(bytes),
        Err(e) => {
            error!("Failed to render CSV export: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

#[post("/api/download/excel")]
async fn download_excel(body: web::Json<ExportRequest>) -> impl Responder {
    match report::to_xlsx_bytes(&body.results, &body.summary) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(XLSX_CONTENT_TYPE)
            .append_header(("Content-Disposition", "attachment; filename=\"results.xlsx\""))
            .body(bytes),
        Err(e) => {
            error!("Failed to render Excel export: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() }))
        }
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(get_results)
        .service(download_csv)
        .service(download_excel);

    if Path::new(FRONTEND_DIR).is_dir() {
        cfg.service(actix_files::Files::new("/", FRONTEND_DIR).index_file("index.html"));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    logger::init();

    let config = Config::from_env()?;
    // The blocking WebDriver client is built before the async runtime starts.
    let launcher = WebDriverLauncher::new(config.webdriver_url.clone(), config.browser_args.clone())?;
    let extractor = Arc::new(Extractor::new(config.extractor.clone(), launcher));
    let state = web::Data::new(AppState {
        extractor: extractor.clone(),
        session_policy: config.session_policy,
    });

    info!("Starting Web Server at http://{}", config.bind_addr);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .app_data(state.clone())
                .configure(routes)
        })
        .bind(config.bind_addr.as_str())?
        .run()
        .await
    })?;

    drop(extractor);
    Ok(())
}
