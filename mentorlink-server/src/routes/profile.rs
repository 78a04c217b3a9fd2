use axum::http::StatusCode;
use bytes::Bytes;
use chrono::Utc;
use mentorlink_core::models::profile::validate_upload;
use mentorlink_core::models::{Profile, ProfileUpdate};
use mentorlink_core::views::format::{display_name, initials, location_label};
use mentorlink_core::views::profile_view_stats;
use mentorlink_core::MentorlinkError;
use serde::Deserialize;
use serde_json::{json, Value};

use super::time_range;
use crate::http::{error_response, ok_response, HttpState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewsParams {
    pub user_id: Option<String>,
    pub period: Option<String>,
}

pub async fn profile_inner(state: &HttpState, user_id: &str) -> (StatusCode, Value) {
    let loaded = state
        .load(futures::future::try_join(
            state.source.user(user_id),
            state.source.profile(user_id),
        ))
        .await;
    let (user, profile) = match loaded {
        Ok((Some(user), profile)) => (user, profile.unwrap_or_else(|| Profile::empty(user_id))),
        Ok((None, _)) => {
            return error_response(MentorlinkError::not_found(format!("User {}", user_id)))
        }
        Err(e) => return error_response(e),
    };

    let name = display_name(user.name.as_deref());
    ok_response(json!({
        "user": user,
        "display": {
            "initials": initials(&name),
            "name": name,
            "location": location_label(profile.city.as_deref(), profile.country.as_deref()),
            "experienceLabel": profile
                .years_of_experience
                .map_or("Not specified", |e| e.label()),
        },
        "profile": profile,
    }))
}

pub async fn update_profile_inner(
    state: &HttpState,
    user_id: &str,
    update: ProfileUpdate,
) -> (StatusCode, Value) {
    if let Err(e) = update.validate() {
        return error_response(e);
    }
    match state.load(state.source.update_profile(user_id, &update)).await {
        Ok(profile) => ok_response(json!({ "profile": profile })),
        Err(e) => error_response(e),
    }
}

/// Keep ids filesystem-safe when they become part of a file name.
fn file_stem(user_id: &str) -> String {
    user_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

pub async fn upload_picture_inner(
    state: &HttpState,
    user_id: &str,
    content_type: &str,
    body: Bytes,
) -> (StatusCode, Value) {
    let uploads = &state.config.uploads;
    let ext = match validate_upload(
        content_type,
        body.len(),
        &uploads.allowed_types,
        uploads.max_bytes,
    ) {
        Ok(ext) => ext,
        Err(e) => return error_response(e),
    };

    let file_name = format!("{}-{}.{}", file_stem(user_id), uuid::Uuid::new_v4(), ext);
    let dir = std::path::Path::new(&uploads.dir);
    let written = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(&file_name), &body).await?;
        Ok::<_, MentorlinkError>(())
    };
    if let Err(e) = written.await {
        tracing::error!(user_id = %user_id, error = %e, "failed to store profile picture");
        return error_response(e);
    }

    let url = format!("/uploads/{}", file_name);
    match state.load(state.source.set_profile_picture(user_id, &url)).await {
        Ok(profile) => {
            tracing::info!(user_id = %user_id, bytes = body.len(), "profile picture updated");
            ok_response(json!({ "profilePicture": url, "profile": profile }))
        }
        Err(e) => {
            // No record points at the file.
            match tokio::fs::remove_file(dir.join(&file_name)).await {
                Ok(()) => tracing::debug!(file = %file_name, "removed unreferenced upload"),
                Err(cleanup) => tracing::warn!(
                    file = %file_name,
                    error = %cleanup,
                    "failed to remove unreferenced upload"
                ),
            }
            error_response(e)
        }
    }
}

pub async fn profile_views_inner(
    state: &HttpState,
    user_id: &str,
    params: ViewsParams,
) -> (StatusCode, Value) {
    let period = match time_range(
        params.period.as_deref(),
        &state.config.dashboard.default_time_range,
    ) {
        Ok(p) => p,
        Err(e) => return error_response(e),
    };
    let target = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(user_id);

    let now = Utc::now();
    let views = match state
        .load(state.source.profile_views(target, period.previous_start(now)))
        .await
    {
        Ok(v) => v,
        Err(e) => return error_response(e),
    };
    let stats = profile_view_stats(&views, period, now, state.config.dashboard.activity_weeks);
    ok_response(json!({ "stats": stats }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_strips_path_characters() {
        assert_eq!(file_stem("../etc/passwd"), "etcpasswd");
        assert_eq!(file_stem("user_1-a"), "user_1-a");
    }
}
