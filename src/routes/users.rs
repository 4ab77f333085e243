use actix_web::{HttpResponse, Responder, delete, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Deserialize;

use crate::repository::DieselRepository;
use crate::routes::api::{error_response, viewer_for};
use crate::services::PageQuery;
use crate::services::subscriptions::{self as subscription_service, SubscriptionQuery};
use crate::services::users as user_service;

/// Query parameters accepted when subscribing.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<usize>,
}

#[get("/users")]
pub async fn list_users(
    params: web::Query<PageQuery>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match user_service::list_users(repo.get_ref(), viewer.as_ref(), params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response("list users", err),
    }
}

#[get("/users/me")]
pub async fn current_user(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match user_service::current_user(viewer.as_ref()) {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(err) => error_response("load current user", err),
    }
}

#[get("/users/subscriptions")]
pub async fn list_subscriptions(
    params: web::Query<SubscriptionQuery>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match subscription_service::list_subscriptions(
        repo.get_ref(),
        viewer.as_ref(),
        params.into_inner(),
    ) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response("list subscriptions", err),
    }
}

#[get("/users/{user_id}")]
pub async fn get_user(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match user_service::get_user(repo.get_ref(), viewer.as_ref(), path.into_inner()) {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(err) => error_response("load user", err),
    }
}

#[post("/users/{user_id}/subscribe")]
pub async fn subscribe(
    path: web::Path<i32>,
    params: web::Query<SubscribeQuery>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match subscription_service::subscribe(
        repo.get_ref(),
        viewer.as_ref(),
        path.into_inner(),
        params.recipes_limit,
    ) {
        Ok(subscription) => HttpResponse::Created().json(subscription),
        Err(err) => error_response("subscribe", err),
    }
}

#[delete("/users/{user_id}/subscribe")]
pub async fn unsubscribe(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match subscription_service::unsubscribe(repo.get_ref(), viewer.as_ref(), path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response("unsubscribe", err),
    }
}
