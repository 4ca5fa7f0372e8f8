use crate::error::{AppError, Result};
use crate::model::{RedirectQuery, RedirectResponse, ShortenQuery, ShortenResponse};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use burrow_core::ShortCode;
use tracing::debug;

pub async fn shorten_handler(
    State(state): State<AppState>,
    Query(query): Query<ShortenQuery>,
) -> Result<Json<ShortenResponse>> {
    let long_url = query
        .long_url
        .filter(|url| !url.is_empty())
        .ok_or(AppError::MissingParameter("longUrl"))?;

    let code = state.shortener().shorten(&long_url).await?;

    Ok(Json(ShortenResponse {
        short_url: state.short_url(&code),
    }))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Query(query): Query<RedirectQuery>,
) -> Result<Json<RedirectResponse>> {
    let short_url = query
        .short_url
        .filter(|url| !url.is_empty())
        .ok_or(AppError::MissingParameter("shortUrl"))?;

    let code = ShortCode::parse(last_segment(&short_url))?;
    let long_url = resolve(&state, &code).await?;

    Ok(Json(RedirectResponse { long_url }))
}

/// `GET /{short_code}`: answers with `307 Temporary Redirect`.
pub async fn follow_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Redirect> {
    let code = ShortCode::parse(&short_code)?;
    let long_url = resolve(&state, &code).await?;

    debug!(%code, %long_url, "redirecting");
    Ok(Redirect::temporary(&long_url))
}

async fn resolve(state: &AppState, code: &ShortCode) -> Result<String> {
    state
        .shortener()
        .resolve(code)
        .await?
        .ok_or_else(|| AppError::UnknownShortCode(code.to_string()))
}

fn last_segment(short_url: &str) -> &str {
    let path = short_url.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::last_segment;

    #[test]
    fn last_segment_of_bare_code_and_url() {
        assert_eq!(last_segment("Am5N8HFT7q"), "Am5N8HFT7q");
        assert_eq!(last_segment("https://burrow.example/Am5N8HFT7q"), "Am5N8HFT7q");
        assert_eq!(last_segment("https://burrow.example/Am5N8HFT7q/"), "Am5N8HFT7q");
        assert_eq!(last_segment("https://burrow.example/Am5N8HFT7q?x=1"), "Am5N8HFT7q");
    }
}
