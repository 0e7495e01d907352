use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::domain::RawApplication;
use super::presenter::{render_page, Banner, PageNotice, PredictionView};
use super::service::{LoanApprovalPipeline, PipelineError};

/// Router exposing the HTML form and the JSON prediction endpoint.
pub fn approval_router(pipeline: Arc<LoanApprovalPipeline>) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .route("/predict", post(predict_form_handler))
        .route("/api/v1/predictions", post(predict_json_handler))
        .with_state(pipeline)
}

pub(crate) async fn form_handler() -> Html<String> {
    Html(render_page(None, PageNotice::None))
}

pub(crate) async fn predict_form_handler(
    State(pipeline): State<Arc<LoanApprovalPipeline>>,
    form: Result<Form<RawApplication>, FormRejection>,
) -> Response {
    let Form(application) = match form {
        Ok(form) => form,
        Err(rejection) => {
            let message = rejection.body_text();
            warn!(error = %message, "rejected form submission");
            let page = render_page(None, PageNotice::Error(&message));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    match pipeline.evaluate(&application) {
        Ok(result) => {
            let banner = Banner::from(&result);
            let page = render_page(Some(&application), PageNotice::Banner(&banner));
            (StatusCode::OK, Html(page)).into_response()
        }
        Err(error) => {
            let message = error.to_string();
            let page = render_page(Some(&application), PageNotice::Error(&message));
            (status_for(&error), Html(page)).into_response()
        }
    }
}

pub(crate) async fn predict_json_handler(
    State(pipeline): State<Arc<LoanApprovalPipeline>>,
    payload: Result<Json<RawApplication>, JsonRejection>,
) -> Response {
    let Json(application) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let body = json!({ "error": rejection.body_text() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    match pipeline.evaluate(&application) {
        Ok(result) => {
            let view = PredictionView::new(&application, &result);
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(error) => {
            let body = json!({ "error": error.to_string() });
            (status_for(&error), Json(body)).into_response()
        }
    }
}

fn status_for(error: &PipelineError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
