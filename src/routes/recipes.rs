use actix_web::http::header::ContentDisposition;
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, patch, post, web};
use chrono::Local;
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::domain::membership::MembershipKind;
use crate::forms::recipes::RecipePayload;
use crate::repository::DieselRepository;
use crate::routes::api::{error_response, field_from_message, viewer_for};
use crate::services::ServiceError;
use crate::services::recipes::{self as recipe_service, RecipeQuery};
use crate::services::{memberships, shopping_list};

#[get("/recipes")]
pub async fn list_recipes(
    req: HttpRequest,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
) -> impl Responder {
    // `tags` may repeat, which `web::Query` does not support.
    let query = match serde_html_form::from_str::<RecipeQuery>(req.query_string()) {
        Ok(query) => query,
        Err(err) => {
            let message = err.to_string();
            let field = field_from_message(&message);
            return error_response(
                "decode recipe filters",
                ServiceError::invalid_field(field, message),
            );
        }
    };

    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match recipe_service::list_recipes(
        repo.get_ref(),
        viewer.as_ref(),
        query,
        config.strict_membership_filters,
    ) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response("list recipes", err),
    }
}

#[post("/recipes")]
pub async fn create_recipe(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    body: web::Json<Value>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let payload = match decode_recipe(body.into_inner()) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    match recipe_service::create_recipe(repo.get_ref(), viewer.as_ref(), payload) {
        Ok(recipe) => HttpResponse::Created().json(recipe),
        Err(err) => error_response("create recipe", err),
    }
}

#[get("/recipes/download_shopping_cart")]
pub async fn download_shopping_cart(
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let today = Local::now().date_naive();
    match shopping_list::build_shopping_list(repo.get_ref(), viewer.as_ref(), today) {
        Ok(list) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .insert_header(ContentDisposition::attachment(list.file_name()))
            .body(list.render()),
        Err(err) => error_response("build shopping list", err),
    }
}

#[get("/recipes/{recipe_id}")]
pub async fn get_recipe(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match recipe_service::get_recipe(repo.get_ref(), viewer.as_ref(), path.into_inner()) {
        Ok(recipe) => HttpResponse::Ok().json(recipe),
        Err(err) => error_response("load recipe", err),
    }
}

#[patch("/recipes/{recipe_id}")]
pub async fn update_recipe(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
    body: web::Json<Value>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    let payload = match decode_recipe(body.into_inner()) {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    match recipe_service::update_recipe(
        repo.get_ref(),
        viewer.as_ref(),
        path.into_inner(),
        payload,
    ) {
        Ok(recipe) => HttpResponse::Ok().json(recipe),
        Err(err) => error_response("update recipe", err),
    }
}

#[delete("/recipes/{recipe_id}")]
pub async fn delete_recipe(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let viewer = match viewer_for(repo.get_ref(), user.as_ref()) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match recipe_service::delete_recipe(repo.get_ref(), viewer.as_ref(), path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response("delete recipe", err),
    }
}

/// Decodes a recipe body, answering type errors with a field error.
pub(crate) fn decode_recipe(body: Value) -> Result<RecipePayload, HttpResponse> {
    RecipePayload::from_json(body).map_err(|err| {
        error_response(
            "decode recipe",
            ServiceError::invalid_field(err.field(), err.to_string()),
        )
    })
}

fn add_membership(
    repo: &DieselRepository,
    user: Option<&AuthenticatedUser>,
    recipe_id: i32,
    kind: MembershipKind,
) -> HttpResponse {
    let viewer = match viewer_for(repo, user) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match memberships::add_membership(repo, viewer.as_ref(), recipe_id, kind) {
        Ok(recipe) => HttpResponse::Created().json(recipe),
        Err(err) => error_response(&format!("add recipe to {kind}"), err),
    }
}

fn remove_membership(
    repo: &DieselRepository,
    user: Option<&AuthenticatedUser>,
    recipe_id: i32,
    kind: MembershipKind,
) -> HttpResponse {
    let viewer = match viewer_for(repo, user) {
        Ok(viewer) => viewer,
        Err(response) => return response,
    };

    match memberships::remove_membership(repo, viewer.as_ref(), recipe_id, kind) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&format!("remove recipe from {kind}"), err),
    }
}

#[post("/recipes/{recipe_id}/favorite")]
pub async fn add_favorite(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    add_membership(
        repo.get_ref(),
        user.as_ref(),
        path.into_inner(),
        MembershipKind::Favorite,
    )
}

#[delete("/recipes/{recipe_id}/favorite")]
pub async fn remove_favorite(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    remove_membership(
        repo.get_ref(),
        user.as_ref(),
        path.into_inner(),
        MembershipKind::Favorite,
    )
}

#[post("/recipes/{recipe_id}/shopping_cart")]
pub async fn add_to_shopping_cart(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    add_membership(
        repo.get_ref(),
        user.as_ref(),
        path.into_inner(),
        MembershipKind::ShoppingCart,
    )
}

#[delete("/recipes/{recipe_id}/shopping_cart")]
pub async fn remove_from_shopping_cart(
    path: web::Path<i32>,
    user: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    remove_membership(
        repo.get_ref(),
        user.as_ref(),
        path.into_inner(),
        MembershipKind::ShoppingCart,
    )
}
