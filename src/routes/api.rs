use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::{Map, Value, json};

use crate::domain::user::Viewer;
use crate::repository::DieselRepository;
use crate::routes::{ingredients, recipes, tags, users};
use crate::services::ServiceError;
use crate::services::users::resolve_viewer;

/// Registers every JSON endpoint under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .service(tags::list_tags)
            .service(tags::get_tag)
            .service(tags::create_tag)
            .service(tags::update_tag)
            .service(tags::delete_tag)
            .service(ingredients::list_ingredients)
            .service(ingredients::upload_ingredients)
            .service(ingredients::get_ingredient)
            // Literal paths go before `/recipes/{recipe_id}` and `/users/{user_id}`.
            .service(recipes::download_shopping_cart)
            .service(recipes::list_recipes)
            .service(recipes::create_recipe)
            .service(recipes::get_recipe)
            .service(recipes::update_recipe)
            .service(recipes::delete_recipe)
            .service(recipes::add_favorite)
            .service(recipes::remove_favorite)
            .service(recipes::add_to_shopping_cart)
            .service(recipes::remove_from_shopping_cart)
            .service(users::list_users)
            .service(users::current_user)
            .service(users::list_subscriptions)
            .service(users::get_user)
            .service(users::subscribe)
            .service(users::unsubscribe),
    );
}

/// JSON extractor settings answering malformed bodies with a field error.
pub(crate) fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Query extractor settings answering malformed query strings with a field error.
pub(crate) fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::Deserialize(source) => source.to_string(),
        other => other.to_string(),
    };
    let field = field_from_message(&message);
    let response = error_response(
        "decode JSON body",
        ServiceError::invalid_field(field, message),
    );
    InternalError::from_response(err, response).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        QueryPayloadError::Deserialize(source) => source.to_string(),
        other => other.to_string(),
    };
    let field = field_from_message(&message);
    let response = error_response(
        "decode query string",
        ServiceError::invalid_field(field, message),
    );
    InternalError::from_response(err, response).into()
}

/// Field named by a serde "missing field" message, `non_field_errors` otherwise.
pub(crate) fn field_from_message(message: &str) -> String {
    message
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(field, _)| field.to_string())
        .unwrap_or_else(|| "non_field_errors".to_string())
}

/// Resolves the local viewer for an optional identity.
pub(crate) fn viewer_for(
    repo: &DieselRepository,
    user: Option<&AuthenticatedUser>,
) -> Result<Option<Viewer>, HttpResponse> {
    resolve_viewer(repo, user).map_err(|err| error_response("resolve viewer", err))
}

/// Maps a service error to its JSON response.
pub(crate) fn error_response(context: &str, err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::InvalidField { field, message } => {
            let mut body = Map::new();
            body.insert(field, json!([message]));
            HttpResponse::BadRequest().json(Value::Object(body))
        }
        ServiceError::AlreadyExists(message) => {
            HttpResponse::BadRequest().json(json!({ "errors": message }))
        }
        ServiceError::SelfSubscription => {
            HttpResponse::BadRequest().json(json!({ "errors": err.to_string() }))
        }
        ServiceError::NotFound(message) => {
            HttpResponse::NotFound().json(json!({ "detail": message }))
        }
        ServiceError::Unauthorized => HttpResponse::Unauthorized()
            .json(json!({ "detail": "Authentication credentials were not provided." })),
        ServiceError::Forbidden => {
            HttpResponse::Forbidden().json(json!({ "detail": err.to_string() }))
        }
        ServiceError::Internal(_) => {
            log::error!("Failed to {context}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
