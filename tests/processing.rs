use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentinelhub::{
    AcquisitionMode, ApiType, BBox, CRS_EPSG4326, ClientConfig, DataFusionLayerInfo, Error,
    GetMapParams, Interpolator, Layer, LayerOptions, MimeType, Optical, Polarization,
    OpticalLayer, ProcessingDataFusionLayer, Resolution, S1GrdAwsEuLayer, Sentinel1Grd, ShClient,
};

fn params() -> GetMapParams {
    GetMapParams::new(
        BBox::new(CRS_EPSG4326, 19.0, 20.0, 20.0, 21.0).unwrap(),
        Utc.with_ymd_and_hms(2020, 1, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2020, 1, 10, 23, 59, 59).unwrap(),
        256,
        256,
        MimeType::Png,
    )
}

fn client_for(server: &MockServer) -> ShClient {
    ShClient::new(
        ClientConfig::new()
            .with_auth_token("token")
            .with_service_hostname(server.uri()),
    )
    .unwrap()
}

async fn mount_process(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/process"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47]))
        .mount(server)
        .await;
}

async fn posted_payloads(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/v1/process")
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

#[tokio::test]
async fn s2_processing_request_carries_cloud_filter() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    let layer = OpticalLayer::new(
        LayerOptions::new().with_evalscript("return [B04, B03, B02];"),
        Optical::s2l2a().with_max_cloud_cover_percent(20.0),
    );
    let image = layer
        .get_map(
            &client_for(&mock_server),
            &params().with_upsampling(Interpolator::Bicubic),
            ApiType::Processing,
        )
        .await
        .unwrap();
    assert_eq!(image, vec![0x89, 0x50, 0x4e, 0x47]);

    let payloads = posted_payloads(&mock_server).await;
    assert_eq!(payloads.len(), 1);
    let body = &payloads[0];
    assert_eq!(body["evalscript"], "return [B04, B03, B02];");
    assert!(body.get("dataProduct").is_none());
    assert_eq!(body["input"]["bounds"]["bbox"], json!([19.0, 20.0, 20.0, 21.0]));
    assert_eq!(
        body["input"]["bounds"]["properties"]["crs"],
        "http://www.opengis.net/def/crs/EPSG/0/4326"
    );

    let datasource = &body["input"]["data"][0];
    assert_eq!(datasource["type"], "S2L2A");
    assert_eq!(datasource["dataFilter"]["maxCloudCoverage"], json!(20.0));
    assert_eq!(datasource["dataFilter"]["mosaickingOrder"], "mostRecent");
    assert_eq!(
        datasource["dataFilter"]["timeRange"],
        json!({ "from": "2020-01-10T00:00:00.000Z", "to": "2020-01-10T23:59:59.000Z" })
    );
    assert_eq!(datasource["processing"]["upsampling"], "BICUBIC");
    assert!(datasource["processing"].get("downsampling").is_none());

    assert_eq!(body["output"]["width"], 256);
    assert_eq!(body["output"]["responses"][0]["identifier"], "default");
    assert_eq!(body["output"]["responses"][0]["format"]["type"], "image/png");
}

#[tokio::test]
async fn s1_layer_settings_are_fetched_once() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/configuration/v1/wms/instances/inst/layers"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "OTHER", "styles": [] },
            {
                "id": "S1-VV",
                "title": "VV backscatter",
                "styles": [{ "name": "default", "evalScript": "return [VV];" }],
                "datasourceDefaults": {
                    "type": "S1GRD",
                    "acquisitionMode": "IW",
                    "polarization": "DV",
                    "resolution": "HIGH",
                    "backCoeff": "SIGMA0_ELLIPSOID",
                    "orthorectify": true,
                    "orbitDirection": "ASCENDING"
                }
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let layer = S1GrdAwsEuLayer::new(LayerOptions::configured("inst", "S1-VV"), Sentinel1Grd::new());
    layer.get_map(&client, &params(), ApiType::Processing).await.unwrap();
    layer.get_map(&client, &params(), ApiType::Processing).await.unwrap();

    let payloads = posted_payloads(&mock_server).await;
    assert_eq!(payloads.len(), 2);
    let body = &payloads[1];
    assert_eq!(body["evalscript"], "return [VV];");

    let datasource = &body["input"]["data"][0];
    assert_eq!(datasource["type"], "S1GRD");
    assert_eq!(datasource["dataFilter"]["acquisitionMode"], "IW");
    assert_eq!(datasource["dataFilter"]["polarization"], "DV");
    assert_eq!(datasource["dataFilter"]["resolution"], "HIGH");
    assert_eq!(datasource["dataFilter"]["orbitDirection"], "ASCENDING");
    assert_eq!(datasource["processing"]["backCoeff"], "SIGMA0_ELLIPSOID");
    assert_eq!(datasource["processing"]["orthorectify"], true);
}

#[tokio::test]
async fn configured_s1_layer_skips_configuration_service() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    let layer = S1GrdAwsEuLayer::new(
        LayerOptions::new().with_evalscript("return [VH];"),
        Sentinel1Grd::new()
            .with_acquisition_mode(AcquisitionMode::Ew)
            .with_polarization(Polarization::Dh)
            .with_resolution(Resolution::Medium),
    );
    layer
        .get_map(&client_for(&mock_server), &params(), ApiType::Processing)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();
    let datasource = &body["input"]["data"][0];
    assert_eq!(datasource["dataFilter"]["acquisitionMode"], "EW");
    assert_eq!(datasource["dataFilter"]["polarization"], "DH");
    assert_eq!(datasource["dataFilter"]["resolution"], "MEDIUM");
    assert!(datasource["dataFilter"].get("orbitDirection").is_none());
    assert_eq!(datasource["processing"]["backCoeff"], "GAMMA0_ELLIPSOID");
    assert_eq!(datasource["processing"]["orthorectify"], false);
}

#[tokio::test]
async fn fusion_sends_one_datasource_per_layer() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    let s2: Arc<dyn Layer> = Arc::new(OpticalLayer::new(
        LayerOptions::new().with_evalscript("unused"),
        Optical::s2l2a().with_max_cloud_cover_percent(30.0),
    ));
    let s1: Arc<dyn Layer> = Arc::new(S1GrdAwsEuLayer::new(
        LayerOptions::new(),
        Sentinel1Grd::new()
            .with_acquisition_mode(AcquisitionMode::Iw)
            .with_polarization(Polarization::Dv)
            .with_resolution(Resolution::High),
    ));
    let fusion = ProcessingDataFusionLayer::new(
        "return [s2.B04, s1.VV];",
        vec![
            DataFusionLayerInfo::new(s2).with_id("s2"),
            DataFusionLayerInfo::new(s1)
                .with_id("s1")
                .with_time_range(
                    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
                    Utc.with_ymd_and_hms(2020, 1, 5, 0, 0, 0).unwrap(),
                )
                .with_upsampling(Interpolator::Nearest),
        ],
    );

    assert!(fusion.supports_api_type(ApiType::Processing));
    assert!(matches!(
        fusion
            .get_map(&client_for(&mock_server), &params(), ApiType::Wms)
            .await,
        Err(Error::UnsupportedApiType { api: ApiType::Wms })
    ));

    fusion
        .get_map(
            &client_for(&mock_server),
            &params().with_upsampling(Interpolator::Bilinear),
            ApiType::Processing,
        )
        .await
        .unwrap();

    let payloads = posted_payloads(&mock_server).await;
    let body = &payloads[0];
    assert_eq!(body["evalscript"], "return [s2.B04, s1.VV];");

    let data = body["input"]["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    assert_eq!(data[0]["id"], "s2");
    assert_eq!(data[0]["type"], "S2L2A");
    assert_eq!(data[0]["dataFilter"]["maxCloudCoverage"], json!(30.0));
    assert_eq!(data[0]["dataFilter"]["timeRange"]["from"], "2020-01-10T00:00:00.000Z");
    assert_eq!(data[0]["processing"]["upsampling"], "BILINEAR");

    assert_eq!(data[1]["id"], "s1");
    assert_eq!(data[1]["type"], "S1GRD");
    assert_eq!(
        data[1]["dataFilter"]["timeRange"],
        json!({ "from": "2020-01-01T00:00:00.000Z", "to": "2020-01-05T00:00:00.000Z" })
    );
    assert_eq!(data[1]["dataFilter"]["acquisitionMode"], "IW");
    assert_eq!(data[1]["processing"]["upsampling"], "NEAREST");
}

#[tokio::test]
async fn evalscript_is_downloaded_from_its_url() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/scripts/true_color.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("return [B04, B03, B02];"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let layer = OpticalLayer::new(
        LayerOptions::new()
            .with_evalscript_url(format!("{}/scripts/true_color.js", mock_server.uri())),
        Optical::s2l2a(),
    );
    layer
        .get_map(&client_for(&mock_server), &params(), ApiType::Processing)
        .await
        .unwrap();

    let payloads = posted_payloads(&mock_server).await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["evalscript"], "return [B04, B03, B02];");
    assert!(payloads[0].get("dataProduct").is_none());
}

#[tokio::test]
async fn explicit_data_product_replaces_evalscript() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    let layer = OpticalLayer::new(
        LayerOptions::new().with_data_product("https://example.com/dp/42"),
        Optical::s2l1c(),
    );
    layer
        .get_map(&client_for(&mock_server), &params(), ApiType::Processing)
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["dataProduct"], "https://example.com/dp/42");
    assert!(body.get("evalscript").is_none());
    assert_eq!(body["input"]["data"][0]["type"], "S2L1C");
}

#[tokio::test]
async fn data_product_comes_from_layer_defaults() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/configuration/v1/wms/instances/inst/layers"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "TRUE-COLOR",
            "title": "True color",
            "styles": [{ "evalScript": "", "dataProduct": { "@id": "https://example.com/dp/1" } }]
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let layer = OpticalLayer::new(LayerOptions::configured("inst", "TRUE-COLOR"), Optical::s2l2a());
    layer.get_map(&client, &params(), ApiType::Processing).await.unwrap();

    let payloads = posted_payloads(&mock_server).await;
    assert_eq!(payloads[0]["dataProduct"], "https://example.com/dp/1");
    assert!(payloads[0].get("evalscript").is_none());

    let settings = layer.layer_params(&client).await.unwrap();
    assert_eq!(settings.title.as_deref(), Some("True color"));
    assert_eq!(settings.data_product.as_deref(), Some("https://example.com/dp/1"));
}

#[tokio::test]
async fn processing_without_token_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_process(&mock_server).await;

    let client =
        ShClient::new(ClientConfig::new().with_service_hostname(mock_server.uri())).unwrap();
    let layer = OpticalLayer::new(
        LayerOptions::new().with_evalscript("return [B04];"),
        Optical::s2l2a(),
    );
    let err = layer
        .get_map(&client, &params(), ApiType::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn service_error_message_is_extracted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/process"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "status": 400, "reason": "Bad Request", "message": "Invalid script!" }
        })))
        .mount(&mock_server)
        .await;

    let layer = OpticalLayer::new(
        LayerOptions::new().with_evalscript("garbage"),
        Optical::s2l2a(),
    );
    let err = layer
        .get_map(&client_for(&mock_server), &params(), ApiType::Processing)
        .await
        .unwrap_err();
    match err {
        Error::Status {
            status,
            url,
            message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid script!");
            assert!(url.ends_with("/api/v1/process"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
