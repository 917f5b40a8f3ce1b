//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine. Every value that
//! comes from a user (names, paths, file contents, messages) goes through
//! `html_escape` before it lands in a page.

use folio::{publish::PublishedSite, workspace::DirEntries};

use folio::publish::html_escape;

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"],
    textarea {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    textarea {
        font-family: monospace;
        resize: vertical;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #0052a3;
    }
    button.link {
        background: none;
        color: #0066cc;
        padding: 0;
        text-decoration: underline;
        font-weight: normal;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    .inline {
        display: inline;
    }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .notice {
        color: #3c763d;
        background: #dff0d8;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .code {
        font-family: monospace;
        background: #f5f5f5;
        padding: 2px 6px;
        border-radius: 3px;
        font-size: 13px;
    }
"#;

/// A status line shown above a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    Notice(&'a str),
    Error(&'a str),
}

impl Message<'_> {
    fn render(&self) -> String {
        match self {
            Message::Notice(text) => format!(r#"<div class="notice">{}</div>"#, html_escape(text)),
            Message::Error(text) => format!(r#"<div class="error">{}</div>"#, html_escape(text)),
        }
    }
}

fn render_message(message: Option<Message<'_>>) -> String {
    message.map_or(String::new(), |m| m.render())
}

/// Wrap a page body in the common document skeleton
fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#,
        html_escape(title)
    )
}

/// Percent-encode one URL path segment
fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Public URL of a path inside a user's `htdocs`
pub fn public_href(username: &str, path: &str) -> String {
    let mut href = format!("/web/{}/", encode_segment(username));
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(encode_segment)
        .collect();
    href.push_str(&segments.join("/"));
    href
}

/// Editor URL for a folder, optionally preselecting a file
pub fn editor_href(folder: &str, file: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("carpeta", folder);
    if let Some(file) = file {
        query.append_pair("archivo", file);
    }
    format!("/editor?{}", query.finish())
}

/// Render the login page
pub fn login_page(message: Option<Message<'_>>) -> String {
    let message_html = render_message(message);

    page(
        "Folio - Iniciar sesión",
        &format!(
            r#"        <h1>Folio</h1>
        <h2>Iniciar sesión</h2>
        {message_html}
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="usuario">Usuario:</label>
                <input type="text" id="usuario" name="usuario" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Contraseña:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Entrar</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            ¿No tienes cuenta? <a href="/nuevo_usuario">Crear usuario</a>
            · <a href="/servidores">Ver webs públicas</a>
        </p>"#
        ),
    )
}

/// Render the registration page
pub fn register_page(error: Option<&str>) -> String {
    let message_html = render_message(error.map(Message::Error));

    page(
        "Folio - Nuevo usuario",
        &format!(
            r#"        <h1>Folio</h1>
        <h2>Crear usuario</h2>
        {message_html}
        <form method="POST" action="/nuevo_usuario">
            <div class="form-group">
                <label for="usuario">Usuario:</label>
                <input type="text" id="usuario" name="usuario" required autofocus>
                <small style="color: #666;">Sin dos puntos ni barras</small>
            </div>
            <div class="form-group">
                <label for="password">Contraseña:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Crear usuario</button>
        </form>
        <p style="margin-top: 20px; text-align: center;">
            ¿Ya tienes cuenta? <a href="/login">Inicia sesión</a>
        </p>"#
        ),
    )
}

/// Everything the editor page shows
#[derive(Debug, Default)]
pub struct EditorView<'a> {
    pub username: &'a str,
    /// Current folder relative to the workspace root, `/`-joined
    pub folder: &'a str,
    pub file: &'a str,
    pub content: &'a str,
    pub message: Option<Message<'a>>,
    pub entries: DirEntries,
}

/// Render the file editor for one folder of a workspace
pub fn editor_page(view: &EditorView<'_>) -> String {
    let folder = html_escape(view.folder);
    let file = html_escape(view.file);
    let content = html_escape(view.content);
    let message_html = render_message(view.message);

    let up_html = if view.folder.is_empty() {
        String::new()
    } else {
        format!(
            r#"<form method="POST" action="/editor" class="inline">
                <input type="hidden" name="carpeta_rel" value="{folder}">
                <button type="submit" name="accion" value="subir_carpeta">Subir carpeta</button>
            </form>"#
        )
    };

    let folders_html = if view.entries.folders.is_empty() {
        "No hay carpetas aún.".to_string()
    } else {
        view.entries
            .folders
            .iter()
            .map(|name| {
                format!(
                    r#"<form method="POST" action="/editor" class="inline">
                <input type="hidden" name="carpeta_rel" value="{folder}">
                <input type="hidden" name="carpeta_click" value="{name}">
                <button type="submit" name="accion" value="entrar_carpeta" class="link">{name}/</button>
            </form>"#,
                    name = html_escape(name)
                )
            })
            .collect::<Vec<_>>()
            .join("<br>\n")
    };

    let files_html = if view.entries.files.is_empty() {
        "No hay archivos aún.".to_string()
    } else {
        view.entries
            .files
            .iter()
            .map(|name| {
                format!(
                    r#"<a href="{}">{}</a>"#,
                    html_escape(&editor_href(view.folder, Some(name))),
                    html_escape(name)
                )
            })
            .collect::<Vec<_>>()
            .join("<br>\n")
    };

    page(
        "Folio - Editor",
        &format!(
            r#"        <a href="/logout"><button class="logout-btn">Cerrar sesión</button></a>
        <h1>Editor de archivos</h1>
        <p>Usuario: <span class="code">{username}</span>.
        Lo que guardes en <span class="code">htdocs/</span> se publica en
        <a href="{public}">{public}</a></p>
        {message_html}
        <p>Ruta actual: <span class="code">/{folder}</span> {up_html}</p>

        <form method="POST" action="/editor">
            <input type="hidden" name="carpeta_rel" value="{folder}">
            <div class="form-group">
                <label for="carpeta">Crear carpeta:</label>
                <input type="text" id="carpeta" name="carpeta" placeholder="nombre_carpeta">
            </div>
            <button type="submit" name="accion" value="crear_carpeta">Crear carpeta</button>
        </form>

        <form method="POST" action="/editor">
            <input type="hidden" name="carpeta_rel" value="{folder}">
            <div class="form-group">
                <label for="archivo">Archivo:</label>
                <input type="text" id="archivo" name="archivo" value="{file}" placeholder="ejemplo.html" autofocus>
            </div>
            <div class="form-group">
                <label for="contenido">Contenido:</label>
                <textarea id="contenido" name="contenido" rows="16">{content}</textarea>
            </div>
            <button type="submit" name="accion" value="leer">Leer</button>
            <button type="submit" name="accion" value="guardar">Guardar</button>
            <button type="submit" name="accion" value="borrar" onclick="return confirm('¿Borrar archivo?')">Borrar</button>
        </form>

        <h2>Carpetas en esta carpeta</h2>
        <p>{folders_html}</p>
        <h2>Archivos en esta carpeta</h2>
        <p>{files_html}</p>"#,
            username = html_escape(view.username),
            public = html_escape(&public_href(view.username, "")),
        ),
    )
}

/// Render the public index of every user's site
pub fn servidores_page(sites: &[PublishedSite]) -> String {
    let sites_html = if sites.is_empty() {
        "<p>No hay webs de usuarios aún.</p>".to_string()
    } else {
        sites
            .iter()
            .map(|site| {
                let mut items = Vec::new();
                if site.index.is_some() {
                    items.push(format!(
                        r#"<li><a href="{}">{}/ (index)</a></li>"#,
                        html_escape(&public_href(&site.username, "")),
                        html_escape(&site.username)
                    ));
                }
                items.extend(site.files.iter().map(|file| {
                    format!(
                        r#"<li><a href="{}">{}</a></li>"#,
                        html_escape(&public_href(&site.username, file)),
                        html_escape(file)
                    )
                }));
                format!(
                    "<h2>{}</h2>\n<ul>\n{}\n</ul>",
                    html_escape(&site.username),
                    items.join("\n")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    page(
        "Folio - Webs de usuarios",
        &format!(
            r#"        <h1>Webs de usuarios</h1>
        <p>Todos los archivos .html, .htm y .mako publicados en el <span class="code">htdocs</span> de cada usuario.
        Enlaza a <span class="code">/web/usuario/archivo</span>, o a <span class="code">/web/usuario/</span> para su index.</p>
        {sites_html}
        <p style="margin-top: 20px;"><a href="/login">Iniciar sesión</a></p>"#
        ),
    )
}

/// Render a directory listing inside a user's public site
pub fn listing_page(username: &str, path: &str, entries: &DirEntries) -> String {
    let mut items = Vec::new();
    if !path.is_empty() {
        let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
        items.push(format!(
            r#"<li><a href="{}">..</a></li>"#,
            html_escape(&public_href(username, parent))
        ));
    }
    for folder in &entries.folders {
        let target = join(path, folder);
        items.push(format!(
            r#"<li><a href="{}/">{}/</a></li>"#,
            html_escape(&public_href(username, &target)),
            html_escape(folder)
        ));
    }
    for file in &entries.files {
        let target = join(path, file);
        items.push(format!(
            r#"<li><a href="{}">{}</a></li>"#,
            html_escape(&public_href(username, &target)),
            html_escape(file)
        ));
    }

    let title = format!("/{username}/{path}");
    page(
        &title,
        &format!(
            "        <h1>Índice de {}</h1>\n        <ul>\n{}\n        </ul>",
            html_escape(&title),
            items.join("\n")
        ),
    )
}

/// Render a plain error page for the public routes
pub fn error_page(title: &str, detail: &str) -> String {
    page(
        title,
        &format!(
            "        <h1>{}</h1>\n        <p>{}</p>\n        <p><a href=\"/servidores\">Volver</a></p>",
            html_escape(title),
            html_escape(detail)
        ),
    )
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
