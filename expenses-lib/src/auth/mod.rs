use actix_web::dev::ServiceRequest;
use actix_web::{web, Error, HttpMessage, Scope};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use tracing_actix_web::RootSpan;

use crate::user::UserId;
use jwt::JwtAuth;

pub mod handlers;
pub mod jwt;
pub mod password;

/// Registration and login, the only routes served without a bearer token.
pub fn auth_service() -> Scope {
    web::scope("")
        .service(handlers::register)
        .service(handlers::login)
}

/// Validates credentials using [JwtAuth]. If valid, injects the caller's
/// user id into the request and into the [RootSpan]
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let jwt_auth = req.app_data::<JwtAuth>().unwrap();
    if let Ok(user_id) = jwt_auth.validate_token(credentials.token()) {
        if let Some(root_span) = req.extensions().get::<RootSpan>() {
            root_span.record("user_id", user_id);
        }
        req.extensions_mut().insert::<UserId>(user_id);
        Ok(req)
    } else {
        let challenge = Bearer::build().error(bearer::Error::InvalidToken).finish();
        Err((AuthenticationError::new(challenge).into(), req))
    }
}
