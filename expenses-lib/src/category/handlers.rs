use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use super::{validate_update, CreateCategory};
use crate::error::HandlerError;
use crate::user::UserId;
use expenses_repo::category_repo::{CategoryRepo, CategoryUpdate};

#[post("")]
pub async fn create_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    new_category: web::Json<CreateCategory>,
) -> Result<impl Responder, HandlerError> {
    let new_category = new_category.into_inner();
    new_category.validate()?;

    let category = category_repo
        .create_category(user_id.into_inner(), new_category.into_new_category())
        .await?;
    Ok(HttpResponse::Created().json(category))
}

#[get("")]
pub async fn get_all_categories(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let categories = category_repo.get_categories(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/{category_id}")]
pub async fn get_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let category = category_repo
        .get_category(user_id.into_inner(), category_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[put("/{category_id}")]
pub async fn update_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
    update: web::Json<CategoryUpdate>,
) -> Result<impl Responder, HandlerError> {
    let update = update.into_inner();
    validate_update(&update)?;

    let category = category_repo
        .update_category(user_id.into_inner(), category_id.into_inner(), update)
        .await?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/{category_id}")]
pub async fn delete_category(
    category_repo: web::Data<Arc<dyn CategoryRepo>>,
    user_id: web::ReqData<UserId>,
    category_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    category_repo
        .delete_category(user_id.into_inner(), category_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
