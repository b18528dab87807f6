use actix_web::{web, HttpResponse};

use crate::database::VolunteerStore;
use crate::middleware::auth::{require_identity, Claims};
use crate::models::{CreateVolunteerRequest, DeleteAck, VolunteerRequestAck, VolunteerRequestResponse};
use crate::utils::error::{parse_object_id, AppError};

#[utoipa::path(
    get,
    path = "/volunteer-request-posts/{email}",
    tag = "Requests",
    params(("email" = String, Path, description = "Volunteer email; must match the session")),
    responses(
        (status = 200, description = "Requests submitted by the volunteer", body = Vec<VolunteerRequestResponse>),
        (status = 401, description = "Missing, invalid or mismatched session")
    ),
    security(("token_cookie" = []))
)]
pub async fn list_volunteer_requests(
    user: web::ReqData<Claims>,
    store: web::Data<dyn VolunteerStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let email = path.into_inner();
    require_identity(&user, &email)?;

    log::info!("📋 GET /volunteer-request-posts/{}", email);
    let requests = store.find_requests_by_volunteer(&email).await?;
    log::info!("✅ Retrieved {} requests", requests.len());

    let body: Vec<VolunteerRequestResponse> = requests
        .into_iter()
        .map(VolunteerRequestResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /volunteer-request - stores the request, then claims one slot on the post.
///
/// The two writes are independent: a request can be stored while the claim
/// finds the post missing or full. `slotClaimed` tells the caller which
/// happened. A store failure during the claim surfaces as 500.
#[utoipa::path(
    post,
    path = "/volunteer-request",
    tag = "Requests",
    request_body = CreateVolunteerRequest,
    responses(
        (status = 200, description = "Request stored", body = VolunteerRequestAck),
        (status = 400, description = "Invalid postId or email")
    )
)]
pub async fn create_volunteer_request(
    store: web::Data<dyn VolunteerStore>,
    body: web::Json<CreateVolunteerRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    log::info!("🙋 POST /volunteer-request - {} for post {}", body.volunteer_email, body.post_id);

    let request = body.into_request()?;
    let post_id = request
        .post_id
        .ok_or_else(|| AppError::InvalidRequest("postId is required".into()))?;

    let inserted_id = store.insert_request(request).await?;
    let slot_claimed = store.claim_volunteer_slot(post_id).await?;

    if slot_claimed {
        log::info!("✅ Request {} stored, slot claimed on post {}", inserted_id, post_id);
    } else {
        log::warn!("⚠️ Request {} stored but post {} is missing or full", inserted_id, post_id);
    }

    Ok(HttpResponse::Ok().json(VolunteerRequestAck {
        acknowledged: true,
        inserted_id: inserted_id.to_hex(),
        slot_claimed,
    }))
}

#[utoipa::path(
    delete,
    path = "/delete-specific-request/{id}",
    tag = "Requests",
    params(("id" = String, Path, description = "Request ObjectId")),
    responses(
        (status = 200, description = "Deletion result; deletedCount is 0 when nothing matched", body = DeleteAck)
    )
)]
pub async fn delete_volunteer_request(
    store: web::Data<dyn VolunteerStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let request_id = parse_object_id(&path, "request")?;
    log::info!("🗑️ DELETE /delete-specific-request/{}", request_id);

    let deleted_count = store.delete_request(request_id).await?;
    Ok(HttpResponse::Ok().json(DeleteAck {
        acknowledged: true,
        deleted_count,
    }))
}
