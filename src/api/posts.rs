use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::database::{VolunteerStore, UPCOMING_LIMIT};
use crate::middleware::auth::{require_identity, Claims};
use crate::models::{
    CreatePostRequest, DeleteAck, InsertAck, UpdateAck, UpdatePostRequest, VolunteerPost,
    VolunteerPostResponse,
};
use crate::utils::error::{parse_object_id, AppError};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the post title
    pub search: Option<String>,
}

fn to_responses(posts: Vec<VolunteerPost>) -> Vec<VolunteerPostResponse> {
    posts.into_iter().map(VolunteerPostResponse::from).collect()
}

#[utoipa::path(
    get,
    path = "/volunteer-need-posts",
    tag = "Posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Posts matching the title search", body = Vec<VolunteerPostResponse>),
        (status = 500, description = "Store error")
    )
)]
pub async fn list_posts(
    store: web::Data<dyn VolunteerStore>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /volunteer-need-posts - search: {:?}", query.search);

    let posts = store.find_posts(query.search.as_deref()).await?;
    log::info!("✅ Retrieved {} posts", posts.len());

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

#[utoipa::path(
    get,
    path = "/volunteer-need-posts/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post ObjectId")),
    responses(
        (status = 200, description = "The post, or null when it does not exist", body = VolunteerPostResponse),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn get_post(
    store: web::Data<dyn VolunteerStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let post_id = parse_object_id(&path, "post")?;
    log::info!("🔎 GET /volunteer-need-posts/{}", post_id);

    let post = store.find_post(post_id).await?;
    Ok(HttpResponse::Ok().json(post.map(VolunteerPostResponse::from)))
}

#[utoipa::path(
    get,
    path = "/get-specific-user-post/{email}",
    tag = "Posts",
    params(("email" = String, Path, description = "Organizer email; must match the session")),
    responses(
        (status = 200, description = "Posts created by the organizer", body = Vec<VolunteerPostResponse>),
        (status = 401, description = "Missing, invalid or mismatched session")
    ),
    security(("token_cookie" = []))
)]
pub async fn list_organizer_posts(
    user: web::ReqData<Claims>,
    store: web::Data<dyn VolunteerStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    require_identity(&user, &email)?;

    log::info!("📋 GET /get-specific-user-post/{}", email);
    let posts = store.find_posts_by_organizer(&email).await?;
    log::info!("✅ Retrieved {} posts for organizer", posts.len());

    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

#[utoipa::path(
    get,
    path = "/upcoming-deadline-posts",
    tag = "Posts",
    responses(
        (status = 200, description = "Up to six posts, soonest deadline first", body = Vec<VolunteerPostResponse>)
    )
)]
pub async fn upcoming_deadline_posts(
    store: web::Data<dyn VolunteerStore>,
) -> Result<HttpResponse, AppError> {
    log::info!("⏰ GET /upcoming-deadline-posts");

    let posts = store.find_upcoming_posts(UPCOMING_LIMIT).await?;
    Ok(HttpResponse::Ok().json(to_responses(posts)))
}

#[utoipa::path(
    post,
    path = "/add-volunteer-needed-post",
    tag = "Posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Post stored", body = InsertAck),
        (status = 400, description = "Invalid post payload")
    )
)]
pub async fn create_post(
    store: web::Data<dyn VolunteerStore>,
    body: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    log::info!("📝 POST /add-volunteer-needed-post - '{}' by {}", body.title, body.organizer_email);
    let post = body.into_post()?;

    let inserted_id = store.insert_post(post).await?;
    log::info!("✅ Post created: {}", inserted_id);

    Ok(HttpResponse::Ok().json(InsertAck {
        acknowledged: true,
        inserted_id: inserted_id.to_hex(),
    }))
}

#[utoipa::path(
    patch,
    path = "/update-my-posts/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post ObjectId")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated or created", body = UpdateAck),
        (status = 400, description = "Malformed id or empty payload")
    )
)]
pub async fn update_post(
    store: web::Data<dyn VolunteerStore>,
    path: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse, AppError> {
    let post_id = parse_object_id(&path, "post")?;
    let changes = body.into_inner().into_changes()?;
    log::info!("🔧 PATCH /update-my-posts/{} - {} field(s)", post_id, changes.len());

    let outcome = store.upsert_post(post_id, changes).await?;
    if outcome.upserted_id.is_some() {
        log::info!("➕ Post {} did not exist, created by upsert", post_id);
    }

    Ok(HttpResponse::Ok().json(UpdateAck::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/delete-specific-post/{id}",
    tag = "Posts",
    params(("id" = String, Path, description = "Post ObjectId")),
    responses(
        (status = 200, description = "Deletion result; deletedCount is 0 when nothing matched", body = DeleteAck)
    )
)]
pub async fn delete_post(
    store: web::Data<dyn VolunteerStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let post_id = parse_object_id(&path, "post")?;
    log::info!("🗑️ DELETE /delete-specific-post/{}", post_id);

    let deleted_count = store.delete_post(post_id).await?;
    Ok(HttpResponse::Ok().json(DeleteAck {
        acknowledged: true,
        deleted_count,
    }))
}
