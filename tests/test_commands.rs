mod common;
use common::*;

use azvision::ServiceKind;
use azvision::commands::{analyze_image, detect_faces};
use azvision::service::{AnalysisClient, FaceClient};
use image::GenericImageView;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_analyze_writes_lines_words_and_people() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let polygon = json!([{"x": 10, "y": 10}, {"x": 70, "y": 12}, {"x": 69, "y": 30}, {"x": 9, "y": 28}]);
    Mock::given(method("POST"))
        .and(path("/computervision/imageanalysis:analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "readResult": {"blocks": [{"lines": [{
                "text": "OPEN",
                "boundingPolygon": polygon,
                "words": [{"text": "OPEN", "boundingPolygon": polygon, "confidence": 0.98}]
            }]}]},
            "peopleResult": {"values": [
                {"boundingBox": {"x": 80, "y": 20, "w": 30, "h": 50}, "confidence": 0.87}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let image_file = create_test_image(160, 120);
    let results = tempfile::TempDir::new()?;
    let input = InputImage::load(image_file.path())?;
    let client = AnalysisClient::new(service_config(&server.uri()))?;
    let annotator = Annotator::new(results.path())?;

    let result = analyze_image(&client, &input, &annotator).await?;

    assert!(result.read_result.is_some());
    for name in ["lines.jpg", "words.jpg", "people.jpg"] {
        let written = image::open(results.path().join(name))?;
        assert_eq!(written.dimensions(), (160, 120), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_analyze_without_read_or_people_writes_nothing() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "captionResult": {"text": "an empty room", "confidence": 0.7},
            "peopleResult": {"values": []}
        })))
        .mount(&server)
        .await;

    let image_file = create_test_image(32, 32);
    let results = tempfile::TempDir::new()?;
    let input = InputImage::load(image_file.path())?;
    let client = AnalysisClient::new(service_config(&server.uri()))?;

    analyze_image(&client, &input, &Annotator::new(results.path().join("out"))?).await?;

    assert!(!results.path().join("out").exists());
    Ok(())
}

#[tokio::test]
async fn test_faces_annotated_when_detected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/face/v1.0/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"faceRectangle": {"top": 5, "left": 5, "width": 20, "height": 20}},
            {"faceRectangle": {"top": 30, "left": 40, "width": 20, "height": 20}},
            {"faceRectangle": {"top": 60, "left": 70, "width": 20, "height": 20}}
        ])))
        .mount(&server)
        .await;

    let image_file = write_test_image(&solid_image(100, 100, image::Rgb([128, 128, 128])));
    let results = tempfile::TempDir::new()?;
    let input = InputImage::load(image_file.path())?;
    let client = FaceClient::new(service_config(&server.uri()))?;

    let faces = detect_faces(&client, &input, &Annotator::new(results.path())?).await?;

    assert_eq!(faces.len(), 3);
    let labels: Vec<_> = azvision::service::face::face_annotations(&faces)
        .into_iter()
        .filter_map(|a| a.label)
        .collect();
    assert_eq!(labels, ["Face number 1", "Face number 2", "Face number 3"]);

    // 100x100 fitted at 6x, centred 100px from the left
    let written = image::open(results.path().join("detected_faces.jpg"))?.to_rgb8();
    for (anchor_x, anchor_y) in [(130, 30), (340, 180), (520, 360)] {
        let found =
            green_pixels(&written, anchor_x + 4, anchor_x + 60, anchor_y - 10, anchor_y - 7);
        assert!(found > 20, "no label above ({anchor_x}, {anchor_y})");
    }
    Ok(())
}

#[tokio::test]
async fn test_no_faces_no_output() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let image_file = create_test_image(50, 50);
    let results = tempfile::TempDir::new()?;
    let input = InputImage::load(image_file.path())?;
    let client = FaceClient::new(service_config(&server.uri()))?;

    let faces = detect_faces(&client, &input, &Annotator::new(results.path())?).await?;

    assert!(faces.is_empty());
    assert!(!results.path().join("detected_faces.jpg").exists());
    Ok(())
}

#[tokio::test]
async fn test_failed_analysis_leaves_no_partial_output() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let image_file = create_test_image(40, 40);
    let results = tempfile::TempDir::new()?;
    let input = InputImage::load(image_file.path())?;
    let client = AnalysisClient::new(service_config(&server.uri()))?;

    let err = analyze_image(&client, &input, &Annotator::new(results.path().join("r"))?)
        .await
        .unwrap_err();

    assert!(matches!(err, VisionError::Remote { status: 500, .. }));
    assert!(!results.path().join("r").exists());
    Ok(())
}

#[tokio::test]
async fn test_missing_endpoint_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = ServiceConfig::from_lookup(ServiceKind::Vision, |name| {
        (name == "VISION_KEY").then(|| TEST_KEY.to_string())
    })
    .unwrap_err();

    assert!(matches!(err, VisionError::Config { ref missing } if missing == &["VISION_ENDPOINT"]));
    assert_eq!(err.exit_code(), 1);
}
