pub mod health;
pub mod posts;
pub mod requests;
pub mod session;
pub mod swagger;


use actix_web::web;

use crate::middleware::auth::AuthMiddleware;
use crate::utils::error::AppError;

/// Registers every route. Expects `web::Data<dyn VolunteerStore>` and
/// `web::Data<SessionService>` to be present in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(err.to_string()).into()
    }))
    .route("/", web::get().to(health::root))
    .route("/health", web::get().to(health::health_check))
    // Posts
    .route("/volunteer-need-posts", web::get().to(posts::list_posts))
    .route("/volunteer-need-posts/{id}", web::get().to(posts::get_post))
    .route("/upcoming-deadline-posts", web::get().to(posts::upcoming_deadline_posts))
    .route("/add-volunteer-needed-post", web::post().to(posts::create_post))
    .route("/update-my-posts/{id}", web::patch().to(posts::update_post))
    .route("/delete-specific-post/{id}", web::delete().to(posts::delete_post))
    // Requests
    .route("/volunteer-request", web::post().to(requests::create_volunteer_request))
    .route("/delete-specific-request/{id}", web::delete().to(requests::delete_volunteer_request))
    // Session
    .route("/jwt", web::post().to(session::issue_token))
    .route("/logout", web::get().to(session::logout))
    // Guarded by the token cookie
    .service(
        web::resource("/get-specific-user-post/{email}")
            .wrap(AuthMiddleware)
            .route(web::get().to(posts::list_organizer_posts)),
    )
    .service(
        web::resource("/volunteer-request-posts/{email}")
            .wrap(AuthMiddleware)
            .route(web::get().to(requests::list_volunteer_requests)),
    );
}
