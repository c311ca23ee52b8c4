//! HTML views.
//!
//! Templates live in `templates/` and are compiled in with askama, which escapes every
//! interpolated value.
use askama::Template;
use homepage_core::{Action, Greeter, ViewResult};

use crate::{Error, Result};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexView<'a> {
    title: &'a str,
    greeting: &'a str,
}

#[derive(Template)]
#[template(path = "privacy.html")]
struct PrivacyView<'a> {
    title: &'a str,
}

#[derive(Template)]
#[template(path = "contact_us.html")]
struct ContactUsView<'a> {
    title: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorView<'a> {
    title: &'a str,
    request_id: &'a str,
    show_request_id: bool,
}

/// Render `view`, produced by `action`, to HTML.
///
/// A view without an explicit name renders the action's default view.
pub fn render(action: Action, view: &ViewResult, greeter: &dyn Greeter) -> Result<String> {
    let name = view.view_name_or(action.name());
    let html = match Action::from_name(name) {
        Some(Action::Index) => IndexView {
            title: "Home Page",
            greeting: greeter.message(),
        }
        .render()?,
        Some(Action::Privacy) => PrivacyView {
            title: "Privacy Policy",
        }
        .render()?,
        Some(Action::ContactUs) => ContactUsView { title: "Contact Us" }.render()?,
        Some(Action::Error) => {
            let (request_id, show_request_id) = match view.error_model() {
                Some(model) => (model.request_id.as_deref(), model.show_request_id()),
                None => (None, false),
            };
            ErrorView {
                title: "Error",
                request_id: request_id.unwrap_or_default(),
                show_request_id,
            }
            .render()?
        }
        None => return Err(Error::ViewNotFound(name.to_owned())),
    };
    Ok(html)
}
