//! Single binary web server: JSON API for running amateur cup competitions.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default so the app is reachable via DNS on a VPS.
//! Override with env: HOST (e.g. 0.0.0.0), PORT (e.g. 8080).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use cup_engine_web::{
    close_registration, confirm_result, delete_result, enter_result, generate, group_standings,
    reject_result, report_result, standings, Competition, CompetitionError, CompetitionId,
    ErrorKind, Format,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-competition entry: competition data + last activity time (for auto-cleanup).
struct CompetitionEntry {
    competition: Competition,
    last_activity: Instant,
}

/// In-memory state: many competitions by ID. Entries are removed after 12h inactivity.
/// The write guard taken per request is the transaction boundary: every
/// operation's reads and writes happen under one exclusive lock.
type AppState = Data<RwLock<HashMap<CompetitionId, CompetitionEntry>>>;

/// Inactivity threshold: competitions not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateCompetitionBody {
    name: String,
    format: Format,
}

#[derive(Deserialize)]
struct AddCompetitorBody {
    name: String,
    #[serde(default)]
    team: Option<String>,
}

#[derive(Deserialize)]
struct ResultBody {
    score1: u32,
    score2: u32,
}

/// Path segment: competition id (e.g. /api/competitions/{id})
#[derive(Deserialize)]
struct CompetitionPath {
    id: CompetitionId,
}

/// Path segments: competition id and competitor id.
#[derive(Deserialize)]
struct CompetitionCompetitorPath {
    id: CompetitionId,
    competitor_id: Uuid,
}

/// Path segments: competition id and fixture id.
#[derive(Deserialize)]
struct CompetitionFixturePath {
    id: CompetitionId,
    fixture_id: Uuid,
}

/// Path segments: competition id and group (child competition) id.
#[derive(Deserialize)]
struct CompetitionGroupPath {
    id: CompetitionId,
    group_id: CompetitionId,
}

/// Consistency errors are caller bugs (500); everything else is a bad request.
fn error_response(e: &CompetitionError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e.kind() {
        ErrorKind::Consistency => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "cup-engine-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new competition (returns it with id; client stores id for subsequent requests).
#[post("/api/competitions")]
async fn api_create_competition(state: AppState, body: Json<CreateCompetitionBody>) -> HttpResponse {
    let competition = match Competition::new(body.name.clone(), body.format) {
        Ok(c) => c,
        Err(e) => return error_response(&e),
    };
    let id = competition.id;
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let response = HttpResponse::Ok().json(&competition);
    g.insert(
        id,
        CompetitionEntry {
            competition,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a competition by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/competitions/{id}")]
async fn api_get_competition(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.competition)
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    }
}

/// Register a competitor (registration must be open).
#[post("/api/competitions/{id}/competitors")]
async fn api_add_competitor(
    state: AppState,
    path: Path<CompetitionPath>,
    body: Json<AddCompetitorBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.add_competitor(body.name.trim(), body.team.clone()) {
        Ok(_) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Remove a competitor by id (registration must be open).
#[delete("/api/competitions/{id}/competitors/{competitor_id}")]
async fn api_remove_competitor(
    state: AppState,
    path: Path<CompetitionCompetitorPath>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.remove_competitor(path.competitor_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Close registration: fixes the persisted ordering (league/groups) or the
/// play-in count (knockout).
#[post("/api/competitions/{id}/registration/close")]
async fn api_close_registration(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match close_registration(c, &mut rand::thread_rng()) {
        Ok(outcome) => {
            HttpResponse::Ok().json(serde_json::json!({ "outcome": outcome, "competition": c }))
        }
        Err(e) => error_response(&e),
    }
}

/// Generate the next stage: bracket round, league schedule or group stage,
/// depending on the competition's format and state.
#[post("/api/competitions/{id}/generate")]
async fn api_generate(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match generate(c, &mut rand::thread_rng()) {
        Ok(generated) => {
            HttpResponse::Ok().json(serde_json::json!({ "outcome": generated, "competition": c }))
        }
        Err(e) => error_response(&e),
    }
}

/// Enter a result as the organizer: applied to the standings immediately.
#[put("/api/competitions/{id}/fixtures/{fixture_id}/result")]
async fn api_enter_result(
    state: AppState,
    path: Path<CompetitionFixturePath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match enter_result(c, path.fixture_id, body.score1, body.score2) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Report a result as a participant: stored but not applied until confirmed.
#[post("/api/competitions/{id}/fixtures/{fixture_id}/report")]
async fn api_report_result(
    state: AppState,
    path: Path<CompetitionFixturePath>,
    body: Json<ResultBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match report_result(c, path.fixture_id, body.score1, body.score2) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Confirm a reported result: applies it to the standings.
#[post("/api/competitions/{id}/fixtures/{fixture_id}/confirm")]
async fn api_confirm_result(state: AppState, path: Path<CompetitionFixturePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match confirm_result(c, path.fixture_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Reject a reported, unconfirmed result.
#[post("/api/competitions/{id}/fixtures/{fixture_id}/reject")]
async fn api_reject_result(state: AppState, path: Path<CompetitionFixturePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match reject_result(c, path.fixture_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Retract a confirmed result: exact inverse of entering it.
#[delete("/api/competitions/{id}/fixtures/{fixture_id}/result")]
async fn api_delete_result(state: AppState, path: Path<CompetitionFixturePath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match delete_result(c, path.fixture_id) {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

/// Current standings: points desc, goal difference desc, goals scored desc.
#[get("/api/competitions/{id}/standings")]
async fn api_standings(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(standings(&entry.competition))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    }
}

/// Standings of one group of a group-stage competition.
#[get("/api/competitions/{id}/groups/{group_id}/standings")]
async fn api_group_standings(state: AppState, path: Path<CompetitionGroupPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(group_standings(&entry.competition, path.group_id))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    }
}

/// Archive a finished competition.
#[post("/api/competitions/{id}/archive")]
async fn api_archive(state: AppState, path: Path<CompetitionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No competition" })),
    };
    entry.last_activity = Instant::now();
    let c = &mut entry.competition;
    match c.archive() {
        Ok(()) => HttpResponse::Ok().json(c),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<CompetitionId, CompetitionEntry>::new()));

    // Background task: every 30 minutes, remove competitions inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive competition(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(favicon)
            .service(api_create_competition)
            .service(api_get_competition)
            .service(api_add_competitor)
            .service(api_remove_competitor)
            .service(api_close_registration)
            .service(api_generate)
            .service(api_enter_result)
            .service(api_report_result)
            .service(api_confirm_result)
            .service(api_reject_result)
            .service(api_delete_result)
            .service(api_standings)
            .service(api_group_standings)
            .service(api_archive)
    })
    .bind(bind)?
    .run()
    .await
}
