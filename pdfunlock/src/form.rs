//! Upload form rendering.

use minijinja::{Environment, context};

const FORM_TEMPLATE: &str = include_str!("../templates/form.html");

/// Render the upload form, optionally with an error message above it.
///
/// A fresh environment is built on every call, so rendering depends on nothing but the argument.
/// The `.html` template name turns on auto-escaping, which matters because the message may quote
/// client-supplied data.
pub fn render_form(error: Option<&str>) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("form.html", FORM_TEMPLATE)?;
    env.get_template("form.html")?.render(context! { erro => error })
}
