use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

pub use crate::services::session_service::Claims;
use crate::services::session_service::{SessionService, TokenVerdict, TOKEN_COOKIE};
use crate::utils::error::AppError;

/// Guards a route behind the `token` cookie. Verified claims are stored in
/// the request extensions and read by handlers as `web::ReqData<Claims>`.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

fn verdict_for(req: &ServiceRequest) -> TokenVerdict {
    let Some(sessions) = req.app_data::<web::Data<SessionService>>() else {
        log::error!("❌ SessionService missing from app data");
        return TokenVerdict::Rejected("session service not configured".into());
    };

    match req.cookie(TOKEN_COOKIE) {
        Some(cookie) => sessions.verify_token(cookie.value()),
        None => TokenVerdict::Rejected("Missing token cookie".into()),
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match verdict_for(&req) {
            TokenVerdict::Verified(claims) => {
                req.extensions_mut().insert(claims);

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            TokenVerdict::Rejected(reason) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), reason);

                // Short-circuit: the inner service never runs without an identity
                let response = AppError::Unauthorized.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

/// Guarded by-email routes only serve the caller's own data.
pub fn require_identity(claims: &Claims, email: &str) -> Result<(), AppError> {
    if claims.email != email {
        log::warn!(
            "🔒 Identity mismatch: token for {} requested data of {}",
            claims.email,
            email
        );
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
