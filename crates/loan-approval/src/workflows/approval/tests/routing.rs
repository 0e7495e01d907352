use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::Json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::approval::approval_router;
use crate::workflows::approval::router::{form_handler, predict_json_handler};

#[tokio::test]
async fn form_page_renders_empty_form() {
    let page = form_handler().await.0;

    assert!(page.contains("<form method=\"post\" action=\"/predict\">"));
    assert!(!page.contains("Approval Probability"));
}

#[tokio::test]
async fn json_handler_returns_prediction_view() {
    let response =
        predict_json_handler(State(Arc::new(pipeline())), Ok(Json(application()))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["loan_id"], "LP001015");
    assert_eq!(payload["decision"], "approved");
    assert_eq!(payload["approved"], true);
    assert_eq!(payload["approval_probability"], 84.73);
    assert_eq!(payload["banner"]["headline"], "Loan Approved ✅");
    assert!(payload.get("evaluated_at").is_some());
}

#[tokio::test]
async fn form_route_renders_banner() {
    let router = approval_router(Arc::new(pipeline()));

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body(&application())))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let page = read_text_body(response).await;
    assert!(page.contains("banner success"));
    assert!(page.contains("Approval Probability: 84.73%"));
    assert!(page.contains("value=\"LP001015\""));
}

#[tokio::test]
async fn form_route_rejects_negative_income() {
    let router = approval_router(Arc::new(pipeline()));
    let mut application = application();
    application.coapplicant_income = -200.0;

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form_body(&application)))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = read_text_body(response).await;
    assert!(page.contains("role=\"alert\""));
    assert!(page.contains("CoapplicantIncome must be zero or greater"));
}

#[tokio::test]
async fn form_route_rejects_unparseable_submission() {
    let router = approval_router(Arc::new(pipeline()));

    let response = router
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("Gender=Robot"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = read_text_body(response).await;
    assert!(page.contains("name=\"ApplicantIncome\""));
}

#[tokio::test]
async fn api_route_reports_server_error_for_mismatched_model() {
    let model = r#"{"kind":"logistic_regression","coefficients":[0.5],"intercept":0.0}"#;
    let pipeline =
        crate::workflows::approval::LoanApprovalPipeline::new(Arc::new(bundle_with(
            model, SCALER, ENCODERS,
        )));
    let router = approval_router(Arc::new(pipeline));

    let response = router
        .oneshot(
            Request::post("/api/v1/predictions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&application()).expect("serializes"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("expects 1 features"));
}

#[tokio::test]
async fn api_route_rejects_malformed_json() {
    let router = approval_router(Arc::new(pipeline()));

    let response = router
        .oneshot(
            Request::post("/api/v1/predictions")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"Gender":"Male"}"#))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload.get("error").is_some());
}
