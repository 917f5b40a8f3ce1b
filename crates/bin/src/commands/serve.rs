//! Serve command - runs the Folio web server.
//!
//! Authenticated users edit files in their workspace through `/editor`;
//! everyone can browse each user's `htdocs` under `/web/{user}/`.

use std::net::SocketAddr;

use axum::{
    Form, Router,
    extract::{ConnectInfo, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use folio::{
    Instance, files,
    path::ScopedDir,
    publish::PublicPage,
    workspace::{self, DirEntries},
};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use crate::cli::ServeArgs;
use crate::templates::{self, EditorView, Message};

const SESSION_COOKIE: &str = "sessionid";

const MSG_CREDENTIALS_REQUIRED: &str = "Usuario y contraseña requeridos.";
const MSG_BAD_CREDENTIALS: &str = "Usuario o contraseña incorrectos.";
const MSG_USER_EXISTS: &str = "Ese usuario ya existe.";
const MSG_USER_COLON: &str = "El usuario no puede contener dos puntos.";
const MSG_USER_CREATED: &str = "Usuario creado. Ahora inicia sesión.";
const MSG_ESCAPE: &str = "Error: Intento de acceso fuera del directorio permitido.";
const MSG_INTERNAL: &str = "Error interno del servidor.";

/// Shared application state
#[derive(Clone)]
struct AppState {
    instance: Instance,
}

/// Login and registration form data
#[derive(Deserialize)]
struct CredentialsForm {
    #[serde(rename = "usuario", default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Editor form data. Every field is optional; which ones matter depends on
/// the action.
#[derive(Deserialize, Default)]
#[serde(default)]
struct EditorForm {
    #[serde(rename = "accion")]
    action: String,
    #[serde(rename = "archivo")]
    file: String,
    #[serde(rename = "contenido")]
    content: String,
    /// Name of a folder to create
    #[serde(rename = "carpeta")]
    new_folder: String,
    /// Current folder, relative to the workspace root
    #[serde(rename = "carpeta_rel")]
    folder: String,
    /// Subfolder to enter
    #[serde(rename = "carpeta_click")]
    clicked_folder: String,
}

/// Query parameters for GET /editor
#[derive(Deserialize, Default)]
#[serde(default)]
struct EditorQuery {
    #[serde(rename = "carpeta")]
    folder: String,
    #[serde(rename = "archivo")]
    file: String,
}

/// Owned status line for the editor
#[derive(Debug, Clone, PartialEq, Eq)]
enum Feedback {
    Notice(String),
    Error(String),
}

impl Feedback {
    fn from_error(err: &folio::Error) -> Self {
        if err.is_path_escape() {
            Feedback::Error(MSG_ESCAPE.to_string())
        } else {
            Feedback::Error(format!("Error: {err}"))
        }
    }

    fn as_message(&self) -> Message<'_> {
        match self {
            Feedback::Notice(text) => Message::Notice(text),
            Feedback::Error(text) => Message::Error(text),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    users: usize,
    sessions: usize,
}

/// Build the application router over an opened instance
pub fn router(instance: Instance) -> Router {
    let app_state = AppState { instance };

    Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/logout", get(handle_logout))
        .route(
            "/nuevo_usuario",
            get(handle_register_page).post(handle_register_submit),
        )
        .route("/editor", get(handle_editor_page).post(handle_editor_submit))
        .route("/servidores", get(handle_servidores))
        .route("/servidores/{user}/{*path}", get(handle_public_path))
        .route("/web/{user}", get(handle_public_root))
        .route("/web/{user}/", get(handle_public_root))
        .route("/web/{user}/{*path}", get(handle_public_path))
        .layer(CookieManagerLayer::new())
        .with_state(app_state)
}

/// Run the Folio server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let instance = Instance::open(&args.data.data_dir).await?;
    let user_count = instance.credentials().list_usernames().await?.len();
    let data_dir = instance.data_dir().display().to_string();

    let app = router(instance);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, data_dir = %data_dir, users = user_count, "Server listening");

    // Print startup message
    println!("Folio server started");
    println!();
    println!("Web interface: http://localhost:{}", local_addr.port());
    println!("Data dir:      {data_dir}");
    println!("Users:         {user_count}");
    println!();
    println!("Available endpoints:");
    println!("  GET  /                       - Redirect to the public index");
    println!("  GET  /login, POST /login     - Login");
    println!("  GET  /logout                 - Logout");
    println!("  GET  /nuevo_usuario, POST    - User registration");
    println!("  GET  /editor, POST /editor   - Workspace editor (requires login)");
    println!("  GET  /servidores             - Public index of every user's site");
    println!("  GET  /web/{{user}}/{{path}}      - Public pages from htdocs");
    println!("  GET  /health                 - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    println!("Server shut down");
    Ok(())
}

/// Resolves on SIGTERM or SIGINT
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to set up signal handlers: {e}");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

/// Username behind the request's session cookie, if any
async fn session_user(state: &AppState, cookies: &Cookies) -> Option<String> {
    let cookie = cookies.get(SESSION_COOKIE)?;
    state.instance.session_user(cookie.value()).await
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for GET / - Redirect to the public index
async fn handle_root_request() -> Redirect {
    Redirect::to("/servidores")
}

/// Handler for GET /login - Show login page
async fn handle_login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if session_user(&state, &cookies).await.is_some() {
        return Redirect::to("/editor").into_response();
    }

    Html(templates::login_page(None)).into_response()
}

/// Handler for POST /login - Process login
async fn handle_login_submit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    cookies: Cookies,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Html(templates::login_page(Some(Message::Error(
            MSG_CREDENTIALS_REQUIRED,
        ))))
        .into_response();
    }

    match state.instance.login(&form.username, &form.password).await {
        Ok(token) => {
            let mut cookie = Cookie::new(SESSION_COOKIE, token);
            cookie.set_http_only(true);
            cookie.set_path("/");
            cookies.add(cookie);
            Redirect::to("/editor").into_response()
        }
        Err(e) if e.is_authentication_error() => {
            tracing::warn!(remote = %addr, "Rejected login");
            Html(templates::login_page(Some(Message::Error(MSG_BAD_CREDENTIALS)))).into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::login_page(Some(Message::Error(MSG_INTERNAL)))),
            )
                .into_response()
        }
    }
}

/// Handler for GET /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.instance.logout(cookie.value()).await;
    }
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    cookies.remove(removal);
    Redirect::to("/login")
}

/// Handler for GET /nuevo_usuario - Show registration page
async fn handle_register_page() -> Html<String> {
    Html(templates::register_page(None))
}

/// Handler for POST /nuevo_usuario - Process registration
async fn handle_register_submit(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Html(templates::register_page(Some(MSG_CREDENTIALS_REQUIRED))).into_response();
    }

    match state.instance.register(&form.username, &form.password).await {
        Ok(_) => Html(templates::login_page(Some(Message::Notice(MSG_USER_CREATED)))).into_response(),
        Err(e) if e.is_conflict() => {
            Html(templates::register_page(Some(MSG_USER_EXISTS))).into_response()
        }
        Err(e) if e.is_validation_error() => {
            let message = if form.username.contains(':') {
                MSG_USER_COLON.to_string()
            } else {
                format!("Error: {e}")
            };
            Html(templates::register_page(Some(&message))).into_response()
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::register_page(Some(MSG_INTERNAL))),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Editor Handlers
// ============================================================================

/// Handler for GET /editor?carpeta=&archivo= - Show the editor
async fn handle_editor_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<EditorQuery>,
) -> Response {
    let Some(username) = session_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };
    let root = match state.instance.workspace(&username).await {
        Ok(root) => root,
        Err(e) => return internal_error(e),
    };

    let (dir, feedback) = match root.enter_canonical(&query.folder).await {
        Ok(dir) => (dir, None),
        Err(e) => (root, Some(Feedback::from_error(&folio::Error::from(e)))),
    };

    render_editor(&username, &dir, &query.file, "", feedback.as_ref()).await
}

/// Handler for POST /editor - Apply one editor action
async fn handle_editor_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<EditorForm>,
) -> Response {
    let Some(username) = session_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };
    let root = match state.instance.workspace(&username).await {
        Ok(root) => root,
        Err(e) => return internal_error(e),
    };

    let outcome = match root.enter_canonical(&form.folder).await {
        Ok(dir) => apply_editor_action(dir, form).await,
        Err(e) => EditorOutcome {
            dir: root,
            file: form.file,
            content: String::new(),
            feedback: Some(Feedback::from_error(&folio::Error::from(e))),
        },
    };

    render_editor(
        &username,
        &outcome.dir,
        &outcome.file,
        &outcome.content,
        outcome.feedback.as_ref(),
    )
    .await
}

/// State of the editor after an action
struct EditorOutcome {
    dir: ScopedDir,
    file: String,
    content: String,
    feedback: Option<Feedback>,
}

/// Run the action named in `form` inside `dir`
///
/// Failures never abort the request; they become an error line on the page.
async fn apply_editor_action(mut dir: ScopedDir, form: EditorForm) -> EditorOutcome {
    let EditorForm {
        action,
        mut file,
        content: submitted,
        new_folder,
        clicked_folder,
        ..
    } = form;
    let mut content = String::new();

    let result: folio::Result<Option<Feedback>> = match action.as_str() {
        "leer" | "guardar" | "borrar" if file.trim().is_empty() => Ok(Some(Feedback::Error(
            "Debes indicar el nombre del archivo.".to_string(),
        ))),
        "leer" => files::read(&dir, &file).await.map(|text| {
            content = text;
            Some(Feedback::Notice(format!("Archivo '{file}' leído.")))
        }),
        "guardar" => {
            let saved = files::write(&dir, &file, &submitted).await;
            content = submitted;
            saved.map(|()| Some(Feedback::Notice(format!("Archivo '{file}' guardado."))))
        }
        "borrar" => files::delete(&dir, &file).await.map(|()| {
            file.clear();
            Some(Feedback::Notice("Archivo borrado.".to_string()))
        }),
        "crear_carpeta" if new_folder.trim().is_empty() => Ok(Some(Feedback::Error(
            "Debes indicar el nombre de la carpeta a crear.".to_string(),
        ))),
        "crear_carpeta" => files::mkdir(&dir, &new_folder)
            .await
            .map(|()| Some(Feedback::Notice(format!("Carpeta '{new_folder}' creada.")))),
        "entrar_carpeta" if clicked_folder.is_empty() => Ok(None),
        "entrar_carpeta" => match dir.enter_canonical(&clicked_folder).await {
            Ok(next) => {
                dir = next;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        },
        "subir_carpeta" => {
            dir = dir.parent();
            Ok(None)
        }
        "" => Ok(None),
        other => Ok(Some(Feedback::Error(format!("Acción desconocida: {other}")))),
    };

    let feedback = match result {
        Ok(feedback) => feedback,
        Err(e) => {
            tracing::debug!(action = %action, "Editor action failed: {e}");
            Some(Feedback::from_error(&e))
        }
    };

    EditorOutcome {
        dir,
        file,
        content,
        feedback,
    }
}

async fn render_editor(
    username: &str,
    dir: &ScopedDir,
    file: &str,
    content: &str,
    feedback: Option<&Feedback>,
) -> Response {
    let (entries, listing_error) = match workspace::list_entries(&dir.path()).await {
        Ok(entries) => (entries, None),
        Err(e) => {
            tracing::error!(username, "Failed to list folder: {e}");
            (DirEntries::default(), Some(Feedback::from_error(&e)))
        }
    };
    let feedback = listing_error.as_ref().or(feedback);
    let folder = dir.relative();

    let view = EditorView {
        username,
        folder: &folder,
        file,
        content,
        message: feedback.map(Feedback::as_message),
        entries,
    };
    Html(templates::editor_page(&view)).into_response()
}

// ============================================================================
// Public Site Handlers
// ============================================================================

/// Handler for GET /servidores - Public index of every user's site
async fn handle_servidores(State(state): State<AppState>) -> Response {
    match state.instance.site().sites().await {
        Ok(sites) => Html(templates::servidores_page(&sites)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// Handler for GET /web/{user} and /web/{user}/
async fn handle_public_root(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    serve_public(&state, &username, "").await
}

/// Handler for GET /web/{user}/{*path} and its /servidores alias
async fn handle_public_path(
    State(state): State<AppState>,
    Path((username, path)): Path<(String, String)>,
) -> Response {
    serve_public(&state, &username, &path).await
}

async fn serve_public(state: &AppState, username: &str, path: &str) -> Response {
    match state.instance.site().lookup(username, path).await {
        Ok(PublicPage::Html { content, .. }) => Html(content).into_response(),
        Ok(PublicPage::Template { rendered, .. }) => Html(rendered).into_response(),
        Ok(PublicPage::Listing { path, entries }) => {
            Html(templates::listing_page(username, &path, &entries)).into_response()
        }
        Ok(PublicPage::Forbidden { .. }) => (
            StatusCode::FORBIDDEN,
            Html(templates::error_page(
                "Prohibido",
                "Solo se publican archivos .html, .htm y .mako.",
            )),
        )
            .into_response(),
        Ok(PublicPage::NotFound) => (
            StatusCode::NOT_FOUND,
            Html(templates::error_page(
                "No encontrado",
                "El usuario o el archivo no existen.",
            )),
        )
            .into_response(),
        Err(e) if e.is_validation_error() => (
            StatusCode::FORBIDDEN,
            Html(templates::error_page(
                "Prohibido",
                "Intento de acceso fuera del directorio permitido.",
            )),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Response {
    let sessions = state.instance.sessions().count().await;

    match state.instance.credentials().list_usernames().await {
        Ok(users) => axum::Json(HealthResponse {
            status: "healthy",
            users: users.len(),
            sessions,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(HealthResponse {
                    status: "unhealthy",
                    users: 0,
                    sessions,
                }),
            )
                .into_response()
        }
    }
}

fn internal_error(err: folio::Error) -> Response {
    tracing::error!(module = err.module(), "Request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(templates::error_page("Error", MSG_INTERNAL)),
    )
        .into_response()
}
