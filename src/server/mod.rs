//! HTTP server: serves the generated site, answers load-more requests and
//! generates missing post pages on demand

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::FallbackMode;
use crate::content::ContinuationRef;
use crate::error::ContentError;
use crate::feed::Feed;
use crate::generator::{is_not_found, is_valid_uid, Generator};

/// Seconds before the placeholder page reloads itself
const RETRY_SECS: u64 = 2;

/// Result of generating one post on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Built,
    NotFound,
    Failed,
}

type Generation = Shared<BoxFuture<'static, Outcome>>;

/// Failed outcomes kept for placeholder pages to pick up
const REPORTED_CAPACITY: usize = 256;

/// Where an on-demand generation stands
enum Lookup {
    Running(Generation),
    Done(Outcome),
}

#[derive(Default)]
struct Generations {
    /// Generations started on demand, one per uid
    running: HashMap<String, Generation>,
    /// Finished failures not yet shown to anyone, oldest first
    reported: HashMap<String, Outcome>,
    order: VecDeque<String>,
}

impl Generations {
    fn report(&mut self, uid: &str, outcome: Outcome) {
        if self.reported.insert(uid.to_string(), outcome).is_none() {
            self.order.push_back(uid.to_string());
        }
        while self.reported.len() > REPORTED_CAPACITY {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.reported.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn take_reported(&mut self, uid: &str) -> Option<Outcome> {
        let outcome = self.reported.remove(uid)?;
        self.order.retain(|u| u != uid);
        Some(outcome)
    }
}

/// Server state
pub struct ServerState {
    generator: Generator,
    fallback: FallbackMode,
    generations: Mutex<Generations>,
}

impl ServerState {
    pub fn new(generator: Generator, fallback: FallbackMode) -> Arc<Self> {
        Arc::new(Self {
            generator,
            fallback,
            generations: Mutex::new(Generations::default()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Generations> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The generation for `uid`: a finished outcome, the running one, or a
    /// new one. A page written while the caller was checking the disk is
    /// seen here, since a generation only leaves `running` after writing.
    fn generation(self: &Arc<Self>, uid: &str) -> Lookup {
        let mut generations = self.lock();
        if let Some(existing) = generations.running.get(uid) {
            return Lookup::Running(existing.clone());
        }
        if let Some(outcome) = generations.take_reported(uid) {
            return Lookup::Done(outcome);
        }
        if self.generator.post_file(uid).is_file() {
            return Lookup::Done(Outcome::Built);
        }

        let state = Arc::clone(self);
        let owned = uid.to_string();
        let generation = async move {
            let outcome = state.build(&owned).await;
            state.settle(&owned, outcome);
            outcome
        }
        .boxed()
        .shared();
        generations.running.insert(uid.to_string(), generation.clone());
        tokio::spawn(generation.clone());
        Lookup::Running(generation)
    }

    /// Called by a generation once its outcome is known
    fn settle(&self, uid: &str, outcome: Outcome) {
        let mut generations = self.lock();
        generations.running.remove(uid);
        // a placeholder page has no waiter to hand the failure to
        if self.fallback == FallbackMode::Placeholder && outcome != Outcome::Built {
            generations.report(uid, outcome);
        }
    }

    async fn build(&self, uid: &str) -> Outcome {
        match self.generator.build_post(uid).await {
            Ok(path) => {
                tracing::info!("Generated {:?} on demand", path);
                Outcome::Built
            }
            Err(e) if is_not_found(&e) => {
                tracing::debug!("Post {} does not exist", uid);
                Outcome::NotFound
            }
            Err(e) => {
                tracing::error!("Generating post {} failed: {:#}", uid, e);
                Outcome::Failed
            }
        }
    }

    async fn respond(&self, uid: &str, outcome: Outcome) -> Response {
        match outcome {
            Outcome::Built => match tokio::fs::read_to_string(self.generator.post_file(uid)).await {
                Ok(html) => Html(html).into_response(),
                Err(e) => {
                    tracing::error!("Generated page for {} is unreadable: {}", uid, e);
                    self.error_page(StatusCode::INTERNAL_SERVER_ERROR)
                }
            },
            Outcome::NotFound => self.not_found_page(),
            Outcome::Failed => self.error_page(StatusCode::BAD_GATEWAY),
        }
    }

    fn not_found_page(&self) -> Response {
        page(StatusCode::NOT_FOUND, self.generator.renderer().render_not_found())
    }

    fn error_page(&self, status: StatusCode) -> Response {
        page(status, self.generator.renderer().render_error())
    }
}

fn page(status: StatusCode, rendered: Result<String>) -> Response {
    match rendered {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Rendering failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let public_dir = state.generator.public_dir().to_path_buf();
    let static_files = ServeDir::new(&public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(public_dir.join("404.html")));

    Router::new()
        .route("/feed", get(feed_handler))
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(state: Arc<ServerState>, ip: &str, port: u16) -> Result<()> {
    let fallback = state.fallback;
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Missing posts: {:?} fallback", fallback);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn post_handler(State(state): State<Arc<ServerState>>, Path(uid): Path<String>) -> Response {
    if !is_valid_uid(&uid) {
        return state.not_found_page();
    }

    if let Ok(html) = tokio::fs::read_to_string(state.generator.post_file(&uid)).await {
        return Html(html).into_response();
    }

    match state.fallback {
        FallbackMode::Disabled => state.not_found_page(),
        FallbackMode::Blocking => {
            let outcome = match state.generation(&uid) {
                Lookup::Running(generation) => generation.await,
                Lookup::Done(outcome) => outcome,
            };
            state.respond(&uid, outcome).await
        }
        FallbackMode::Placeholder => match state.generation(&uid) {
            Lookup::Done(outcome) => state.respond(&uid, outcome).await,
            Lookup::Running(_) => page(
                StatusCode::OK,
                state.generator.renderer().render_loading(RETRY_SECS),
            ),
        },
    }
}

#[derive(Debug, Deserialize)]
struct FeedParams {
    next: String,
}

#[derive(Debug, Serialize)]
struct FeedResponse {
    html: String,
    next: Option<String>,
}

/// One load-more step: the fragment to append and the next continuation
async fn feed_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<FeedParams>,
) -> Response {
    let mut feed = Feed::resume(ContinuationRef::new(params.next));

    if let Err(e) = feed.load_more(state.generator.source()).await {
        let status = match e {
            ContentError::ForeignContinuation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        return (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response();
    }

    match state.generator.renderer().render_items(feed.posts()) {
        Ok(html) => Json(FeedResponse {
            html,
            next: feed.next_page().map(|n| n.public().as_str().to_string()),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Rendering feed fragment failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "render failed" })),
            )
                .into_response()
        }
    }
}
