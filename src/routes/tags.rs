use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::tags::{AddTagForm, EditTagForm};
use crate::repository::DieselRepository;
use crate::routes::api::{error_response, viewer_for};
use crate::services::tags as tag_service;

#[get("/tags")]
pub async fn list_tags(repo: web::Data<DieselRepository>) -> impl Responder {
    match tag_service::list_tags(repo.get_ref()) {
        Ok(tags) => HttpResponse::Ok().json(tags),
        Err(err) => error_response("list tags", err),
    }
}

#[get("/tags/{tag_id}")]
pub async fn get_tag(path: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match tag_service::get_tag(repo.get_ref(), path.into_inner()) {
        Ok(tag) => HttpResponse::Ok().json(tag),
        Err(err) => error_response("load tag", err),
    }
}

#[post("/tags")]
pub async fn create_tag(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddTagForm>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match tag_service::create_tag(repo.get_ref(), viewer.as_ref(), form.into_inner()) {
        Ok(tag) => HttpResponse::Created().json(tag),
        Err(err) => error_response("create tag", err),
    }
}

#[patch("/tags/{tag_id}")]
pub async fn update_tag(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditTagForm>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match tag_service::modify_tag(
        repo.get_ref(),
        viewer.as_ref(),
        path.into_inner(),
        form.into_inner(),
    ) {
        Ok(tag) => HttpResponse::Ok().json(tag),
        Err(err) => error_response("update tag", err),
    }
}

#[delete("/tags/{tag_id}")]
pub async fn delete_tag(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match tag_service::remove_tag(repo.get_ref(), viewer.as_ref(), path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response("delete tag", err),
    }
}
