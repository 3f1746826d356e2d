use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use crate::error::HandlerError;
use crate::user::{UserId, UserResponse};
use expenses_repo::user_repo::UserRepo;

#[get("")]
pub async fn profile(
    user_repo: web::Data<Arc<dyn UserRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let user = user_repo.get_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}
