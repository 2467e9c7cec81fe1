use crate::{
    config::ApiSettings,
    database::ExpenseSource,
    models::expense::{ExpenseError, ExpenseQuery},
    requests::expense::{CategoryExpensesRequest, CustomExpensesRequest, MonthlyExpensesRequest},
    utils::helpers::{ApiError, GENERIC_BACKEND_ERROR},
};
use actix_web::{HttpResponse, Result, http::StatusCode, web};
use tracing::{error, info, warn};

pub async fn get_monthly_expenses<S: ExpenseSource + 'static>(
    source: web::Data<S>,
    api: web::Data<ApiSettings>,
    request: web::Query<MonthlyExpensesRequest>,
) -> Result<HttpResponse> {
    respond(source.get_ref(), api.get_ref(), ExpenseQuery::try_from(request.into_inner())).await
}

pub async fn get_category_expenses<S: ExpenseSource + 'static>(
    source: web::Data<S>,
    api: web::Data<ApiSettings>,
    request: web::Query<CategoryExpensesRequest>,
) -> Result<HttpResponse> {
    respond(source.get_ref(), api.get_ref(), ExpenseQuery::try_from(request.into_inner())).await
}

pub async fn get_custom_expenses<S: ExpenseSource + 'static>(
    source: web::Data<S>,
    api: web::Data<ApiSettings>,
    request: web::Query<CustomExpensesRequest>,
) -> Result<HttpResponse> {
    respond(source.get_ref(), api.get_ref(), ExpenseQuery::try_from(request.into_inner())).await
}

async fn respond<S: ExpenseSource>(
    source: &S,
    api: &ApiSettings,
    query: Result<ExpenseQuery, ExpenseError>,
) -> Result<HttpResponse> {
    let query = match query {
        Ok(query) => query,
        Err(e) => {
            warn!("Rejected expense request: {}", e);
            return Ok(ApiError::new(e.to_string()).to_response(StatusCode::BAD_REQUEST));
        }
    };

    info!("Calling {} with {:?}", query.procedure(), query);

    match source.fetch_expenses(&query).await {
        Ok(rows) => {
            info!("{} returned {} rows", query.procedure(), rows.len());
            Ok(HttpResponse::Ok().json(rows))
        }
        Err(e) => {
            error!("Backend error calling {}: {}", query.procedure(), e);
            let message = if api.expose_backend_errors {
                e.to_string()
            } else {
                GENERIC_BACKEND_ERROR.to_string()
            };
            Ok(ApiError::new(message).to_response(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}
