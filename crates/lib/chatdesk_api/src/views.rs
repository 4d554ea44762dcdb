//! Server-rendered HTML views.
//!
//! Templates are compiled into the binary and loaded into a single
//! [`minijinja::Environment`] at startup. `.html` templates auto-escape.

use axum::response::Html;
use minijinja::Environment;

use crate::error::AppResult;

/// Loaded template set shared through `AppState`.
pub type Views = Environment<'static>;

/// Browser script served at `/static/chat.js`.
pub const CHAT_JS: &str = include_str!("../static/chat.js");

/// Build the template environment.
pub fn load_views() -> Result<Views, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("base.html", include_str!("../templates/base.html"))?;
    env.add_template("index.html", include_str!("../templates/index.html"))?;
    env.add_template("login.html", include_str!("../templates/login.html"))?;
    env.add_template("register.html", include_str!("../templates/register.html"))?;
    env.add_template("not_found.html", include_str!("../templates/not_found.html"))?;
    Ok(env)
}

/// Render `name` with `ctx`.
pub fn render(views: &Views, name: &str, ctx: minijinja::Value) -> AppResult<Html<String>> {
    let template = views.get_template(name)?;
    Ok(Html(template.render(ctx)?))
}
