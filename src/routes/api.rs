use actix_cors::Cors;
use actix_web::{error::InternalError, http::StatusCode, web};

use crate::{
    database::ExpenseSource,
    handlers,
    models::expense::{CATEGORY_REQUIRED, CUSTOM_REQUIRED, MONTHLY_REQUIRED},
    utils::helpers::ApiError,
};

/// Any origin, method and header; answers with a literal `*` origin.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
}

/// Query strings the extractor cannot read still get the endpoint's 400 body.
fn query_config(message: &'static str) -> web::QueryConfig {
    web::QueryConfig::default().error_handler(move |err, _req| {
        InternalError::from_response(
            err,
            ApiError::new(message).to_response(StatusCode::BAD_REQUEST),
        )
        .into()
    })
}

pub fn scoped_config<S: ExpenseSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/monthly-expenses")
                    .app_data(query_config(MONTHLY_REQUIRED))
                    .route(web::get().to(handlers::expenses::get_monthly_expenses::<S>)),
            )
            .service(
                web::resource("/category-expenses")
                    .app_data(query_config(CATEGORY_REQUIRED))
                    .route(web::get().to(handlers::expenses::get_category_expenses::<S>)),
            )
            .service(
                web::resource("/custom-expenses")
                    .app_data(query_config(CUSTOM_REQUIRED))
                    .route(web::get().to(handlers::expenses::get_custom_expenses::<S>)),
            ),
    );
}
