use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};

use super::{
    validate_update, CreateExpense, ExpenseListResponse, ListQuery, PageMeta, TotalResponse,
};
use crate::error::HandlerError;
use crate::user::UserId;
use expenses_repo::expense_repo::{ExpenseRepo, ExpenseUpdate, PageOptions};

#[post("")]
pub async fn create_expense(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
    new_expense: web::Json<CreateExpense>,
) -> Result<impl Responder, HandlerError> {
    let new_expense = new_expense.into_inner();
    new_expense.validate()?;

    let expense = expense_repo
        .create_expense(user_id.into_inner(), new_expense.into_new_expense())
        .await?;
    Ok(HttpResponse::Created().json(expense))
}

#[get("")]
pub async fn get_all_expenses(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, HandlerError> {
    let query = query.into_inner();
    query.validate()?;

    let page = query.page();
    let per_page = query.per_page();
    let page_options = PageOptions {
        offset: (page - 1) * per_page,
        limit: per_page,
    };

    let result = expense_repo
        .get_expenses(user_id.into_inner(), query.into_filter(), page_options)
        .await?;

    let page_count = (result.total + per_page - 1) / per_page;
    Ok(HttpResponse::Ok().json(ExpenseListResponse {
        data: result.expenses,
        meta: PageMeta {
            total: result.total,
            page,
            per_page,
            page_count,
        },
    }))
}

#[get("/summary")]
pub async fn get_summary(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let summary = expense_repo.get_summary(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[get("/total")]
pub async fn get_total(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
) -> Result<impl Responder, HandlerError> {
    let total = expense_repo.get_total(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TotalResponse { total }))
}

#[get("/{expense_id}")]
pub async fn get_expense(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
    expense_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    let expense = expense_repo
        .get_expense(user_id.into_inner(), expense_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[put("/{expense_id}")]
pub async fn update_expense(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
    expense_id: web::Path<i32>,
    update: web::Json<ExpenseUpdate>,
) -> Result<impl Responder, HandlerError> {
    let update = update.into_inner();
    validate_update(&update)?;

    let expense = expense_repo
        .update_expense(user_id.into_inner(), expense_id.into_inner(), update)
        .await?;
    Ok(HttpResponse::Ok().json(expense))
}

#[delete("/{expense_id}")]
pub async fn delete_expense(
    expense_repo: web::Data<Arc<dyn ExpenseRepo>>,
    user_id: web::ReqData<UserId>,
    expense_id: web::Path<i32>,
) -> Result<impl Responder, HandlerError> {
    expense_repo
        .delete_expense(user_id.into_inner(), expense_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
