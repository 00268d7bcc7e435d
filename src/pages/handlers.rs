//! Wiki routes over a [`PageStore`].

use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, FromRequest, Path, Request, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;

use crate::http::response::HandlerError;
use crate::http::server::AppState;
use crate::pages::store::{Page, PageStore, StoreError};
use crate::pages::templates::PageTemplate;

/// A validated page title: one or more ASCII letters or digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, HandlerError> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(raw.to_string()))
        } else {
            tracing::debug!(title = %raw, "Rejected page title");
            Err(HandlerError::InvalidTitle)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Form posted by the edit page.
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub body: String,
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn load_page(store: Arc<dyn PageStore>, title: &Title) -> Result<Page, HandlerError> {
    let title = title.as_str().to_owned();
    Ok(tokio::task::spawn_blocking(move || store.load(&title)).await??)
}

async fn save_page(store: Arc<dyn PageStore>, page: Page) -> Result<(), HandlerError> {
    Ok(tokio::task::spawn_blocking(move || store.save(&page)).await??)
}

/// `GET /view/{title}`: show a page, or send the client to create it.
pub async fn view(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, HandlerError> {
    let title = Title::parse(&raw)?;
    match load_page(state.store.clone(), &title).await {
        Ok(page) => Ok(Html(state.templates.render(PageTemplate::View, &page)?).into_response()),
        Err(HandlerError::Store(StoreError::NotFound(_))) => Ok(found(format!("/edit/{title}"))),
        Err(e) => Err(e),
    }
}

/// `GET /edit/{title}`: edit form, empty for a page that does not exist yet.
pub async fn edit(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Html<String>, HandlerError> {
    let title = Title::parse(&raw)?;
    let page = match load_page(state.store.clone(), &title).await {
        Ok(page) => page,
        Err(HandlerError::Store(StoreError::NotFound(_))) => Page::empty(title.as_str()),
        Err(e) => return Err(e),
    };
    Ok(Html(state.templates.render(PageTemplate::Edit, &page)?))
}

/// `POST /save/{title}`: store the posted body, then show the page.
///
/// The title is checked before the body is read. A request that is not a
/// form saves an empty body.
pub async fn save(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    request: Request,
) -> Result<Response, HandlerError> {
    let title = Title::parse(&raw)?;
    let body = match Form::<SaveForm>::from_request(request, &state).await {
        Ok(Form(form)) => form.body,
        Err(FormRejection::InvalidFormContentType(rejection)) => {
            tracing::debug!(title = %title, error = %rejection, "Save without form body");
            String::new()
        }
        Err(rejection) => return Err(rejection.into()),
    };
    save_page(state.store.clone(), Page::new(title.as_str(), body)).await?;
    tracing::info!(title = %title, "Page saved");
    Ok(found(format!("/view/{title}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_alphanumeric_only() {
        assert_eq!(Title::parse("FrontPage2").unwrap().as_str(), "FrontPage2");
        for bad in ["", "../etc", "a b", "dash-ed", "ümlaut"] {
            assert!(matches!(Title::parse(bad), Err(HandlerError::InvalidTitle)), "{bad}");
        }
    }
}
