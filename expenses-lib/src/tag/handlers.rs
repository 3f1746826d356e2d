use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use super::CreateTag;
use crate::error::HandlerError;
use expenses_repo::tag_repo::TagRepo;

#[post("")]
pub async fn create_tag(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
    new_tag: web::Json<CreateTag>,
) -> Result<impl Responder, HandlerError> {
    let new_tag = new_tag.into_inner();
    new_tag.validate()?;

    let tag = tag_repo.create_tag(new_tag.name).await?;
    Ok(HttpResponse::Created().json(tag))
}

#[get("")]
pub async fn get_all_tags(
    tag_repo: web::Data<Arc<dyn TagRepo>>,
) -> Result<impl Responder, HandlerError> {
    let tags = tag_repo.get_tags().await?;
    Ok(HttpResponse::Ok().json(tags))
}
