use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Deserialize;

use crate::forms::ingredients::UploadIngredientsForm;
use crate::repository::DieselRepository;
use crate::routes::api::{error_response, viewer_for};
use crate::services::ingredients as ingredient_service;

/// Query parameters of the ingredient search.
#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearch {
    pub name: Option<String>,
}

#[get("/ingredients")]
pub async fn list_ingredients(
    params: web::Query<IngredientSearch>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match ingredient_service::search_ingredients(repo.get_ref(), params.name.as_deref()) {
        Ok(ingredients) => HttpResponse::Ok().json(ingredients),
        Err(err) => error_response("search ingredients", err),
    }
}

#[get("/ingredients/{ingredient_id}")]
pub async fn get_ingredient(
    path: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match ingredient_service::get_ingredient(repo.get_ref(), path.into_inner()) {
        Ok(ingredient) => HttpResponse::Ok().json(ingredient),
        Err(err) => error_response("load ingredient", err),
    }
}

#[post("/ingredients/upload")]
pub async fn upload_ingredients(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadIngredientsForm>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match ingredient_service::upload_ingredients(repo.get_ref(), viewer.as_ref(), form) {
        Ok(summary) => HttpResponse::Created().json(summary),
        Err(err) => error_response("upload ingredients", err),
    }
}
