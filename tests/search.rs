use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentinelhub::{
    AcquisitionMode, BBox, Byoc, ByocLayer, CRS_EPSG4326, ClientConfig, Error, Layer,
    LayerOptions, Optical, OpticalLayer, OrbitDirection, Polarization, Resolution,
    S1GrdAwsEuLayer, S1GrdEoCloudLayer, Sentinel1Grd, Sentinel1GrdEoCloud, ShClient,
};

fn bbox() -> BBox {
    BBox::new(CRS_EPSG4326, 19.0, 20.0, 20.0, 21.0).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn client_for(server: &MockServer) -> ShClient {
    ShClient::new(
        ClientConfig::new()
            .with_auth_token("token")
            .with_service_hostname(server.uri()),
    )
    .unwrap()
}

fn polygon() -> Value {
    json!({ "type": "Polygon", "coordinates": [[[19, 20], [20, 20], [20, 21], [19, 21], [19, 20]]] })
}

fn s2_tile(sensing_time: &str, cloud_cover: f64) -> Value {
    json!({
        "sensingTime": sensing_time,
        "dataGeometry": polygon(),
        "cloudCoverPercentage": cloud_cover
    })
}

#[tokio::test]
async fn s1_find_tiles_sends_dataset_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index/v3/collections/S1GRD/searchIndex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [{
                "sensingTime": "2020-01-03T05:10:00Z",
                "dataGeometry": polygon(),
                "orbitDirection": "DESCENDING",
                "polarization": "DV",
                "acquisitionMode": "IW",
                "resolution": "HIGH"
            }],
            "hasMore": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let layer = S1GrdAwsEuLayer::new(
        LayerOptions::new(),
        Sentinel1Grd::new()
            .with_acquisition_mode(AcquisitionMode::Iw)
            .with_polarization(Polarization::Dv)
            .with_resolution(Resolution::High),
    );
    let page = layer
        .find_tiles(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
            Some(10),
            None,
        )
        .await
        .unwrap();

    assert!(page.has_more);
    assert_eq!(page.tiles.len(), 1);
    let tile = &page.tiles[0];
    assert_eq!(tile.sensing_time, utc(2020, 1, 3, 5, 10, 0));
    assert_eq!(tile.geometry, polygon());
    assert_eq!(tile.meta.orbit_direction, Some(OrbitDirection::Descending));
    assert_eq!(tile.meta.acquisition_mode, Some(AcquisitionMode::Iw));
    assert!(tile.meta.cloud_cover_percent.is_none());

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["maxcount"], 10);
    assert_eq!(body["offset"], 0);
    assert_eq!(body["timeFrom"], "2020-01-01T00:00:00.000Z");
    assert_eq!(body["timeTo"], "2020-01-10T00:00:00.000Z");
    assert_eq!(body["clipping"]["type"], "Polygon");
    assert!(body.get("maxCloudCoverage").is_none());
    assert_eq!(
        body["datasetParameters"],
        json!({
            "type": "S1GRD",
            "acquisitionMode": "IW",
            "polarization": "DV",
            "resolution": "HIGH"
        })
    );
}

#[tokio::test]
async fn eocloud_tiles_use_draw_region_geometry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index/s1/v1/search"))
        .and(body_partial_json(json!({
            "datasetParameters": { "type": "S1", "acquisitionMode": "EW", "polarization": "DH" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [{
                "sensingTime": "2020-01-03T05:10:00",
                "tileDrawRegionGeometry": polygon(),
                "orbitDirection": "ASCENDING"
            }],
            "hasMore": false
        })))
        .mount(&mock_server)
        .await;

    let layer = S1GrdEoCloudLayer::new(
        LayerOptions::new(),
        Sentinel1GrdEoCloud::new()
            .with_acquisition_mode(AcquisitionMode::Ew)
            .with_polarization(Polarization::Dh),
    );
    let page = layer
        .find_tiles(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
            None,
            None,
        )
        .await
        .unwrap();
    assert!(!page.has_more);
    assert_eq!(page.tiles[0].geometry, polygon());
    assert_eq!(page.tiles[0].sensing_time, utc(2020, 1, 3, 5, 10, 0));

    let incomplete = S1GrdEoCloudLayer::new(LayerOptions::new(), Sentinel1GrdEoCloud::new());
    assert!(matches!(
        incomplete
            .find_tiles(
                &client_for(&mock_server),
                &bbox(),
                utc(2020, 1, 1, 0, 0, 0),
                utc(2020, 1, 10, 0, 0, 0),
                None,
                None,
            )
            .await,
        Err(Error::MissingConfiguration(_))
    ));
}

#[tokio::test]
async fn find_dates_sends_query_area_and_cloud_fraction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index/v3/collections/S2L1C/findAvailableData"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["2020-01-08T10:04:12Z", "2020-01-03"])),
        )
        .mount(&mock_server)
        .await;

    let layer = OpticalLayer::new(
        LayerOptions::new(),
        Optical::s2l1c().with_max_cloud_cover_percent(50.0),
    );
    let dates = layer
        .find_dates_utc(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
        )
        .await
        .unwrap();
    assert_eq!(
        dates,
        vec![utc(2020, 1, 8, 10, 4, 12), utc(2020, 1, 3, 0, 0, 0)]
    );

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["from"], "2020-01-01T00:00:00.000Z");
    assert_eq!(body["to"], "2020-01-10T00:00:00.000Z");
    assert_eq!(body["maxCloudCoverage"], json!(0.5));
    assert_eq!(body["queryArea"]["type"], "Polygon");
    assert_eq!(
        body["queryArea"]["crs"]["properties"]["name"],
        "urn:ogc:def:crs:EPSG::4326"
    );
}

#[tokio::test]
async fn byoc_search_names_the_collection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/byoc/v3/collections/CUSTOM/findAvailableData"))
        .and(body_partial_json(json!({
            "datasetParameters": { "type": "BYOC", "collectionId": "my-collection" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let layer = ByocLayer::new(
        LayerOptions::new(),
        Byoc::new().with_collection_id("my-collection"),
    );
    let dates = layer
        .find_dates_utc(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
        )
        .await
        .unwrap();
    assert!(dates.is_empty());
}

#[tokio::test]
async fn flyovers_page_through_search_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index/v3/collections/S2L1C/searchIndex"))
        .and(body_partial_json(json!({ "offset": 0, "maxcount": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [
                s2_tile("2020-01-03T10:00:05Z", 12.0),
                s2_tile("2020-01-03T10:00:00Z", 10.0)
            ],
            "hasMore": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/index/v3/collections/S2L1C/searchIndex"))
        .and(body_partial_json(json!({ "offset": 2, "maxcount": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [s2_tile("2020-01-06T10:10:00Z", 40.0)],
            "hasMore": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let layer = OpticalLayer::new(LayerOptions::new(), Optical::s2l1c());
    let flyovers = layer
        .find_flyovers(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
            5,
            2,
        )
        .await
        .unwrap();

    assert_eq!(flyovers.len(), 2);
    assert_eq!(flyovers[0].from_time, utc(2020, 1, 3, 10, 0, 0));
    assert_eq!(flyovers[0].to_time, utc(2020, 1, 3, 10, 0, 5));
    assert_eq!(flyovers[0].tile_count, 2);
    assert_eq!(flyovers[0].meta.cloud_cover_percent, Some(10.0));
    assert_eq!(flyovers[1].from_time, utc(2020, 1, 6, 10, 10, 0));
    assert_eq!(flyovers[1].tile_count, 1);
}

#[tokio::test]
async fn flyovers_give_up_after_request_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index/v3/collections/S2L1C/searchIndex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [s2_tile("2020-01-03T10:00:00Z", 0.0)],
            "hasMore": true
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let layer = OpticalLayer::new(LayerOptions::new(), Optical::s2l1c());
    let err = layer
        .find_flyovers(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
            2,
            1,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TooManyTiles {
            requests: 2,
            tiles_per_request: 1
        }
    ));
}

#[tokio::test]
async fn flyovers_need_an_orbit_time() {
    let mock_server = MockServer::start().await;
    let layer = ByocLayer::new(LayerOptions::new(), Byoc::new().with_collection_id("c"));
    let err = layer
        .find_flyovers(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
            5,
            50,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn flyovers_reject_overflowing_offsets() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/index/v3/collections/S2L1C/searchIndex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tiles": [s2_tile("2020-01-03T10:00:00Z", 0.0)],
            "hasMore": true
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let layer = OpticalLayer::new(LayerOptions::new(), Optical::s2l1c());
    let err = layer
        .find_flyovers(
            &client_for(&mock_server),
            &bbox(),
            utc(2020, 1, 1, 0, 0, 0),
            utc(2020, 1, 10, 0, 0, 0),
            3,
            2_147_483_648,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidArgument {
            arg: "tiles_per_request",
            ..
        }
    ));
}
