use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};

use crate::requests::blog::{PostQuery, PostsQuery};
use crate::services::blogger::BloggerError;
use crate::state::AppState;
use crate::utils::helpers::{ApiResponse, bad_request, internal_error, non_blank};

pub async fn blogger_posts(
    state: web::Data<AppState>,
    query: web::Query<PostsQuery>,
) -> Result<HttpResponse> {
    match state
        .blogger
        .list_posts(non_blank(&query.page_token), query.max_results)
        .await
    {
        Ok(posts) => Ok(HttpResponse::Ok().json(ApiResponse::success(posts))),
        Err(e) => {
            error!("Error listing blog posts: {}", e);
            Ok(internal_error(e.to_string()))
        }
    }
}

pub async fn blogger_post(
    state: web::Data<AppState>,
    query: web::Query<PostQuery>,
) -> Result<HttpResponse> {
    let post_id = match query.validate() {
        Ok(id) => id,
        Err(message) => return Ok(bad_request(message)),
    };
    info!("Getting blog post {}", post_id);

    match state.blogger.get_post(post_id).await {
        Ok(post) => Ok(HttpResponse::Ok().json(ApiResponse::success(post))),
        Err(BloggerError::NotFound) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Post {} not found", post_id)),
        )),
        Err(e) => {
            error!("Error getting blog post {}: {}", post_id, e);
            Ok(internal_error(e.to_string()))
        }
    }
}
