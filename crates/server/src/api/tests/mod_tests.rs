use super::*;
use crate::test_support::{context_with, try_on_body, FakeProvider};

#[tokio::test]
async fn missing_token_fails_closed_before_forwarding() {
    let ctx = context_with(None);
    let err = submit_try_on(&ctx, try_on_body().as_bytes())
        .await
        .expect_err("should fail closed");
    assert_eq!(err.code, ErrorCode::Configuration);
    assert_eq!(err.error, MISSING_TOKEN_MESSAGE);
}

#[tokio::test]
async fn submission_maps_images_onto_model_input() {
    let provider = FakeProvider::ok();
    let ctx = context_with(Some(provider.clone()));

    let job = submit_try_on(&ctx, try_on_body().as_bytes())
        .await
        .expect("submitted");
    assert_eq!(job["id"], "fake-job");

    let submitted = provider.submitted.lock().expect("lock");
    assert_eq!(submitted.len(), 1);
    let input = &submitted[0].input;
    assert_eq!(input.human_img, "data:image/png;base64,bW9kZWw=");
    assert_eq!(input.garm_img, "https://example.com/presets/shirt.png");
    assert_eq!(input.garment_des, "upper_body");
    assert!(!input.crop);
    assert_eq!(input.seed, 42);
    assert_eq!(submitted[0].version, crate::config::DEFAULT_MODEL_VERSION);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let ctx = context_with(Some(FakeProvider::ok()));
    let err = submit_try_on(&ctx, b"{\"model_image\": 1}")
        .await
        .expect_err("should reject");
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn blank_images_are_rejected() {
    let provider = FakeProvider::ok();
    let ctx = context_with(Some(provider.clone()));
    let body = serde_json::json!({ "model_image": "data:...", "cloth_image": "  " }).to_string();
    let err = submit_try_on(&ctx, body.as_bytes())
        .await
        .expect_err("should reject");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(err.error.contains("cloth_image"));
    assert!(provider.submitted.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn upstream_rejection_embeds_provider_text() {
    let ctx = context_with(Some(FakeProvider::rejecting(
        402,
        "{\"title\":\"Insufficient credit\"}",
    )));
    let err = submit_try_on(&ctx, try_on_body().as_bytes())
        .await
        .expect_err("should surface upstream error");
    assert_eq!(err.code, ErrorCode::Upstream);
    assert_eq!(
        err.error,
        "Replicate API error: {\"title\":\"Insufficient credit\"}"
    );
}

#[tokio::test]
async fn fetch_prediction_forwards_id() {
    let provider = FakeProvider::ok();
    let ctx = context_with(Some(provider.clone()));
    let job = fetch_prediction(&ctx, "abc123").await.expect("job");
    assert_eq!(job["status"], "succeeded");
    assert_eq!(
        provider.fetched.lock().expect("lock").as_slice(),
        [PredictionId("abc123".into())]
    );
}

#[tokio::test]
async fn fetch_prediction_refuses_ids_that_leave_the_job_path() {
    let provider = FakeProvider::ok();
    let ctx = context_with(Some(provider.clone()));
    for id in ["", "  ", "?", "..", "?cursor=abc", "..?x=1", "a/b", "%3F", "job.1"] {
        let err = fetch_prediction(&ctx, id)
            .await
            .expect_err("should reject");
        assert_eq!(err.code, ErrorCode::Validation, "id {id:?}");
    }
    assert!(provider.fetched.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn fetch_prediction_requires_token_too() {
    let err = fetch_prediction(&context_with(None), "abc123")
        .await
        .expect_err("should fail closed");
    assert_eq!(err.code, ErrorCode::Configuration);
}

#[test]
fn model_params_follow_settings() {
    let settings = Settings {
        garment_description: "lower_body".into(),
        seed: 9,
        crop: true,
        ..Settings::default()
    };
    let params = ModelParams::from_settings(&settings);
    let request = params.build_request(TryOnRequest {
        model_image: "m".into(),
        cloth_image: "c".into(),
    });
    assert_eq!(request.input.garment_des, "lower_body");
    assert_eq!(request.input.seed, 9);
    assert!(request.input.crop);
}
