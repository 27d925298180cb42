use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Form, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::chat::{self, form_value, Action};
use crate::config::ServerConfig;
use crate::constants::{CATEGORIES, PREFERENCES, REGIONS};
use crate::conversation::{FormSelection, SessionLog, Turn};
use crate::llm_interaction::CompletionClient;

/// Transcripts of every open browser session, keyed by the id carried in
/// the form's hidden `session` field. Lost on restart.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, SessionLog>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a new session id. Nothing is stored until its first turn.
    pub fn open(&self) -> Uuid {
        let id = Uuid::new_v4();
        debug!(session = %id, "Opened session");
        id
    }

    /// Copy of the session's log. Unknown ids read as an empty log.
    pub async fn snapshot(&self, id: Uuid) -> SessionLog {
        self.inner
            .lock()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    /// Only call that creates an entry.
    pub async fn append(&self, id: Uuid, turn: Turn) -> SessionLog {
        let mut sessions = self.inner.lock().await;
        let log = sessions.entry(id).or_default();
        log.push(turn);
        log.clone()
    }

    /// Forgets the session; its log reads as empty afterwards.
    pub async fn clear(&self, id: Uuid) -> SessionLog {
        let mut log = self.inner.lock().await.remove(&id).unwrap_or_default();
        log.clear();
        log
    }
}

// Shared application state
#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    sessions: SessionStore,
    client: Arc<CompletionClient>,
}

fn create_minijinja_env(templates_dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&templates_dir));
        notifier.watch_path(&templates_dir, true);
        Ok(env)
    })
}

fn render_page(
    state: &AppState,
    session: Uuid,
    selection: &FormSelection,
    log: &SessionLog,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                let context = minijinja::context! {
                    title => "Travel Advisor Chatbot",
                    session_id => session.to_string(),
                    categories => CATEGORIES,
                    regions => REGIONS,
                    preferences => PREFERENCES,
                    selection => selection,
                    turns => log,
                };
                tmpl.render(context)
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.sessions.open();
    let selection = FormSelection::from_form(&[]);
    render_page(&state, session, &selection, &SessionLog::new())
}

async fn action_handler(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let session = form_value(&fields, "session")
        .and_then(|id| Uuid::parse_str(id).ok())
        .unwrap_or_else(|| {
            info!("Form carried no known session, starting a new one");
            Uuid::new_v4()
        });

    let action = match Action::from_form(&fields) {
        Ok(action) => action,
        Err(e) => {
            warn!(session = %session, "Rejected form: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let log = match &action {
        Action::Submit(selection) => {
            info!(session = %session, "Handling submit");
            // The lock is not held across the provider call.
            let history = state.sessions.snapshot(session).await;
            let turn = chat::respond(&state.client, &history, selection).await;
            state.sessions.append(session, turn).await
        }
        Action::Clear => {
            info!(session = %session, "Clearing transcript");
            state.sessions.clear(session).await
        }
    };

    let selection = match action {
        Action::Submit(selection) => selection,
        Action::Clear => FormSelection::from_form(&fields),
    };
    render_page(&state, session, &selection, &log).into_response()
}

/// Builds the router without binding a socket.
pub fn build_app(config: &ServerConfig, client: CompletionClient) -> Router {
    let state = AppState {
        templates: Arc::new(create_minijinja_env(config.templates_dir.clone())),
        sessions: SessionStore::new(),
        client: Arc::new(client),
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/action", post(action_handler))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(config: ServerConfig, client: CompletionClient) -> Result<()> {
    let app = build_app(&config, client);

    info!("Web server listening on http://{}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .context(format!("Failed to bind to address {}", config.addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
