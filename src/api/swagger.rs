use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CauseBridge API",
        version = "1.0.0",
        description = "Volunteer opportunities and volunteer requests.\n\n**Authentication:** the by-email listings require the `token` cookie issued by `POST /jwt`, and only return data for the email inside that token."
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Posts
        crate::api::posts::list_posts,
        crate::api::posts::get_post,
        crate::api::posts::list_organizer_posts,
        crate::api::posts::upcoming_deadline_posts,
        crate::api::posts::create_post,
        crate::api::posts::update_post,
        crate::api::posts::delete_post,

        // Requests
        crate::api::requests::list_volunteer_requests,
        crate::api::requests::create_volunteer_request,
        crate::api::requests::delete_volunteer_request,

        // Session
        crate::api::session::issue_token,
        crate::api::session::logout,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::session::IssueTokenRequest,
            crate::models::CreatePostRequest,
            crate::models::UpdatePostRequest,
            crate::models::VolunteerPostResponse,
            crate::models::CreateVolunteerRequest,
            crate::models::VolunteerRequestResponse,
            crate::models::InsertAck,
            crate::models::UpdateAck,
            crate::models::DeleteAck,
            crate::models::VolunteerRequestAck,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and store connectivity."),
        (name = "Posts", description = "Volunteer-needed posts created by organizers."),
        (name = "Requests", description = "Requests from users to volunteer for a post."),
        (name = "Session", description = "Issue and clear the signed identity cookie."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "token",
                    "Signed session token set by POST /jwt",
                ))),
            );
        }
    }
}
