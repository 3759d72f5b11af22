//! WMS wire format: GetMap URL construction, GetCapabilities XML parsing and
//! expansion of the `time` dimension into concrete dates.
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use url::form_urlencoded;

use crate::core::params::GetMapParams;
use crate::core::time::{parse_utc, to_wms_time};
use crate::error::{Error, Result};

pub const WMS_VERSION: &str = "1.1.1";

/// Optional GetMap inputs that depend on the layer rather than on the request.
#[derive(Debug, Clone, Default)]
pub struct WmsExtras<'a> {
    pub evalscript: Option<&'a str>,
    pub evalscript_url: Option<&'a str>,
    pub evalsource: Option<&'a str>,
    /// Dataset-specific parameters, appended after the standard ones
    pub additional: Vec<(&'static str, String)>,
}

fn join_query(base_url: &str, query: String) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{separator}{query}")
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

/// Build a WMS 1.1.1 GetMap URL.
///
/// Optional parameters are only present when set; the evalscript is sent base64-encoded.
pub fn wms_get_map_url(
    base_url: &str,
    layers: &str,
    params: &GetMapParams,
    extras: &WmsExtras<'_>,
) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("version", WMS_VERSION)
        .append_pair("service", "WMS")
        .append_pair("request", "GetMap")
        .append_pair("format", params.format.as_str())
        .append_pair("srs", &params.bbox.crs.auth_id())
        .append_pair("layers", layers)
        .append_pair("bbox", &params.bbox.to_wms_string())
        .append_pair(
            "time",
            &format!(
                "{}/{}",
                to_wms_time(&params.from_time),
                to_wms_time(&params.to_time)
            ),
        )
        .append_pair("width", &params.width.to_string())
        .append_pair("height", &params.height.to_string());

    for (key, value) in &extras.additional {
        query.append_pair(key, value);
    }

    if let Some(preview) = params.preview {
        query.append_pair("preview", &preview.wms_code().to_string());
    }
    if let Some(upsampling) = params.upsampling {
        query.append_pair("upsampling", upsampling.as_str());
    }
    if let Some(downsampling) = params.downsampling {
        query.append_pair("downsampling", downsampling.as_str());
    }
    if let Some(show_logo) = params.show_logo {
        query.append_pair("showlogo", bool_str(show_logo));
    }
    if let Some(transparent) = params.transparent {
        query.append_pair("transparent", bool_str(transparent));
    }
    if let Some(gain) = params.gain {
        query.append_pair("gain", &gain.to_string());
    }
    if let Some(gamma) = params.gamma {
        query.append_pair("gamma", &gamma.to_string());
    }
    if let Some(evalscript) = extras.evalscript {
        query.append_pair("evalscript", &BASE64.encode(evalscript.as_bytes()));
    }
    if let Some(evalsource) = extras.evalsource {
        query.append_pair("evalsource", evalsource);
    }
    if let Some(evalscript_url) = extras.evalscript_url {
        query.append_pair("evalscripturl", evalscript_url);
    }

    join_query(base_url, query.finish())
}

/// GetCapabilities URL; the document is public so no credentials are involved.
pub fn get_capabilities_url(base_url: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("service", "wms")
        .append_pair("request", "GetCapabilities")
        .append_pair("format", "text/xml")
        .finish();
    join_query(base_url, query)
}

/// A named layer advertised by a WMS GetCapabilities document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WmsLayerInfo {
    pub name: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    /// Raw value of the `time` Dimension (1.3.0) or Extent (1.1.1)
    pub time_dimension: Option<String>,
}

fn is_time_dimension(e: &BytesStart<'_>) -> Result<bool> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == b"name" {
            return Ok(attr.unescape_value()?.eq_ignore_ascii_case("time"));
        }
    }
    Ok(false)
}

/// Parse every named `Layer` from a GetCapabilities document, inner layers first.
pub fn parse_capabilities_layers(xml: &str) -> Result<Vec<WmsLayerInfo>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut open_layers: Vec<WmsLayerInfo> = Vec::new();
    let mut layers = Vec::new();
    let mut in_time_dimension = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match tag.as_str() {
                    "Layer" => open_layers.push(WmsLayerInfo::default()),
                    "Dimension" | "Extent" => in_time_dimension = is_time_dimension(e)?,
                    _ => {}
                }
                path.push(tag);
            }
            Event::End(_) => {
                if let Some(tag) = path.pop() {
                    match tag.as_str() {
                        "Layer" => {
                            if let Some(layer) = open_layers.pop() {
                                if layer.name.is_some() {
                                    layers.push(layer);
                                }
                            }
                        }
                        "Dimension" | "Extent" => in_time_dimension = false,
                        _ => {}
                    }
                }
            }
            Event::Text(e) => {
                let txt = e.unescape()?.to_string();
                assign_layer_text(&path, &mut open_layers, in_time_dimension, txt);
            }
            Event::CData(e) => {
                let txt = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                assign_layer_text(&path, &mut open_layers, in_time_dimension, txt);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(layers)
}

/// Store element text on the innermost open layer when it is a direct child of it.
fn assign_layer_text(
    path: &[String],
    open_layers: &mut [WmsLayerInfo],
    in_time_dimension: bool,
    txt: String,
) {
    let n = path.len();
    if n < 2 || path[n - 2] != "Layer" {
        return;
    }
    let Some(layer) = open_layers.last_mut() else {
        return;
    };
    match path[n - 1].as_str() {
        "Name" => layer.name = Some(txt),
        "Title" => layer.title = Some(txt),
        "Abstract" => layer.abstract_text = Some(txt),
        "Dimension" | "Extent" if in_time_dimension => layer.time_dimension = Some(txt),
        _ => {}
    }
}

/// Parse an ISO-8601 duration with day/week and time components (`P1D`, `PT6H`, `P1DT12H`).
///
/// Calendar units (years, months) have no fixed length and are rejected.
pub fn parse_iso_duration(s: &str) -> Result<Duration> {
    let invalid = || Error::Parse(format!("unsupported ISO-8601 period `{s}`"));
    let rest = s.trim().strip_prefix('P').ok_or_else(invalid)?;

    let mut total = Duration::zero();
    let mut in_time = false;
    let mut number = String::new();
    for c in rest.chars() {
        match c {
            'T' => in_time = true,
            '0'..='9' | '.' => number.push(c),
            unit => {
                let value: f64 = number.parse().map_err(|_| invalid())?;
                number.clear();
                let seconds = match (in_time, unit) {
                    (false, 'W') => value * 7.0 * 86_400.0,
                    (false, 'D') => value * 86_400.0,
                    (true, 'H') => value * 3_600.0,
                    (true, 'M') => value * 60.0,
                    (true, 'S') => value,
                    _ => return Err(invalid()),
                };
                total = total + Duration::milliseconds((seconds * 1000.0).round() as i64);
            }
        }
    }
    if !number.is_empty() || total <= Duration::zero() {
        return Err(invalid());
    }
    Ok(total)
}

fn push_if_in_range(
    out: &mut Vec<DateTime<Utc>>,
    t: DateTime<Utc>,
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) {
    if t >= *from && t <= *to {
        out.push(t);
    }
}

/// Expand a `time` dimension value into the distinct instants within `[from, to]`,
/// most recent first.
pub fn expand_time_dimension(
    value: &str,
    from: &DateTime<Utc>,
    to: &DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>> {
    let mut dates = Vec::new();
    for token in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let parts: Vec<&str> = token.split('/').collect();
        match parts.as_slice() {
            [single] => push_if_in_range(&mut dates, parse_utc(single)?, from, to),
            [start, end] => {
                push_if_in_range(&mut dates, parse_utc(start)?, from, to);
                push_if_in_range(&mut dates, parse_utc(end)?, from, to);
            }
            [start, end, period] => {
                let start = parse_utc(start)?;
                let end = parse_utc(end)?;
                let step = parse_iso_duration(period)?;
                let mut t = start;
                if t < *from {
                    let step_ms = step.num_milliseconds();
                    let behind_ms = (*from - t).num_milliseconds();
                    let skip = (behind_ms + step_ms - 1) / step_ms;
                    t = t + Duration::milliseconds(skip * step_ms);
                }
                let last = if end < *to { end } else { *to };
                while t <= last {
                    dates.push(t);
                    t = t + step;
                }
            }
            _ => return Err(Error::Parse(format!("invalid time dimension value `{token}`"))),
        }
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    Ok(dates)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::TimeZone;

    use super::*;
    use crate::core::bbox::{BBox, CRS_EPSG4326};
    use crate::types::{MimeType, PreviewMode};

    fn query_of(url: &str) -> HashMap<String, String> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn params() -> GetMapParams {
        GetMapParams::new(
            BBox::new(CRS_EPSG4326, 19.0, 20.0, 20.0, 21.0).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 1, 10, 23, 59, 59).unwrap(),
            512,
            512,
            MimeType::Jpeg,
        )
    }

    #[test]
    fn get_map_url_has_standard_parameters_only() {
        let url = wms_get_map_url(
            "https://proba-v-mep.esa.int/applications/geo-viewer/app/geoserver/ows",
            "PROBAV_S1_TOA_333M",
            &params(),
            &WmsExtras::default(),
        );
        assert!(url.starts_with("https://proba-v-mep.esa.int/applications/geo-viewer/app/geoserver/ows?"));
        let q = query_of(&url);
        assert_eq!(q["service"], "WMS");
        assert_eq!(q["version"], "1.1.1");
        assert_eq!(q["request"], "GetMap");
        assert_eq!(q["format"], "image/jpeg");
        assert_eq!(q["layers"], "PROBAV_S1_TOA_333M");
        assert_eq!(q["srs"], "EPSG:4326");
        assert_eq!(q["bbox"], "19,20,20,21");
        assert_eq!(q["time"], "2020-01-10T00:00:00Z/2020-01-10T23:59:59Z");
        assert_eq!(q["width"], "512");
        assert_eq!(q["height"], "512");
        assert!(!q.contains_key("showlogo"));
        assert!(!q.contains_key("transparent"));
        assert!(!q.contains_key("evalscript"));
    }

    #[test]
    fn get_map_url_with_optional_parameters() {
        let params = params()
            .with_show_logo(false)
            .with_transparent(true)
            .with_preview(PreviewMode::Preview);
        let extras = WmsExtras {
            evalscript: Some("return [B04];"),
            evalsource: Some("S2"),
            additional: vec![("maxcc", "20".to_string())],
            ..Default::default()
        };
        let q = query_of(&wms_get_map_url("https://example.com/wms?key=1", "L", &params, &extras));
        assert_eq!(q["key"], "1");
        assert_eq!(q["showlogo"], "false");
        assert_eq!(q["transparent"], "true");
        assert_eq!(q["preview"], "1");
        assert_eq!(q["maxcc"], "20");
        assert_eq!(q["evalsource"], "S2");
        assert_eq!(q["evalscript"], BASE64.encode("return [B04];"));
    }

    #[test]
    fn script_url_gain_and_gamma() {
        let mut params = params();
        params.gain = Some(1.5);
        params.gamma = Some(0.8);
        let extras = WmsExtras {
            evalscript_url: Some("https://example.com/scripts/ndvi.js"),
            evalsource: Some("S1_EW"),
            ..Default::default()
        };
        let q = query_of(&wms_get_map_url("https://example.com/wms", "L", &params, &extras));
        assert_eq!(q["gain"], "1.5");
        assert_eq!(q["gamma"], "0.8");
        assert_eq!(q["evalscripturl"], "https://example.com/scripts/ndvi.js");
        assert_eq!(q["evalsource"], "S1_EW");
        assert!(!q.contains_key("evalscript"));
    }

    #[test]
    fn capabilities_url_parameters() {
        let q = query_of(&get_capabilities_url("https://example.com/ows"));
        assert_eq!(q["service"], "wms");
        assert_eq!(q["request"], "GetCapabilities");
        assert_eq!(q["format"], "text/xml");
    }

    const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<WMS_Capabilities version="1.3.0" xmlns="http://www.opengis.net/wms">
  <Service><Name>WMS</Name><Title>Demo service</Title></Service>
  <Capability>
    <Layer>
      <Title>Root</Title>
      <Layer queryable="1">
        <Name>TRUE_COLOR</Name>
        <Title>True color</Title>
        <Abstract>Bands 4, 3 &amp; 2</Abstract>
        <Dimension name="time" units="ISO8601">2020-01-01/2020-01-05/P2D,2020-01-09</Dimension>
        <Style><Name>default</Name><Title>Default</Title></Style>
      </Layer>
      <Layer>
        <Name>NO_TIME</Name>
        <Title>Static</Title>
      </Layer>
    </Layer>
  </Capability>
</WMS_Capabilities>"#;

    #[test]
    fn parses_named_layers_and_time_dimension() {
        let layers = parse_capabilities_layers(CAPABILITIES).unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].name.as_deref(), Some("TRUE_COLOR"));
        assert_eq!(layers[0].title.as_deref(), Some("True color"));
        assert_eq!(layers[0].abstract_text.as_deref(), Some("Bands 4, 3 & 2"));
        assert_eq!(
            layers[0].time_dimension.as_deref(),
            Some("2020-01-01/2020-01-05/P2D,2020-01-09")
        );
        assert_eq!(layers[1].name.as_deref(), Some("NO_TIME"));
        assert!(layers[1].time_dimension.is_none());
    }

    #[test]
    fn wms_111_extent_holds_time_values() {
        let xml = r#"<WMT_MS_Capabilities version="1.1.1"><Capability><Layer>
            <Layer><Name>L1</Name>
              <Dimension name="time" units="ISO8601"/>
              <Extent name="time" default="current">2019-12-24,2019-12-31</Extent>
            </Layer></Layer></Capability></WMT_MS_Capabilities>"#;
        let layers = parse_capabilities_layers(xml).unwrap();
        assert_eq!(layers[0].time_dimension.as_deref(), Some("2019-12-24,2019-12-31"));
    }

    #[test]
    fn cdata_text_is_read_like_plain_text() {
        let xml = r#"<WMS_Capabilities version="1.3.0"><Capability><Layer>
            <Layer>
              <Name><![CDATA[FALSE_COLOR]]></Name>
              <Title>False color</Title>
              <Abstract><![CDATA[Bands <8,4,3> & more]]></Abstract>
            </Layer></Layer></Capability></WMS_Capabilities>"#;
        let layers = parse_capabilities_layers(xml).unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name.as_deref(), Some("FALSE_COLOR"));
        assert_eq!(layers[0].title.as_deref(), Some("False color"));
        assert_eq!(layers[0].abstract_text.as_deref(), Some("Bands <8,4,3> & more"));
    }

    #[test]
    fn expands_intervals_within_range_most_recent_first() {
        let from = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap();
        let dates =
            expand_time_dimension("2020-01-01/2020-01-05/P2D,2020-01-09,2020-01-03", &from, &to)
                .unwrap();
        let days: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(days, vec!["2020-01-09", "2020-01-05", "2020-01-03"]);
    }

    #[test]
    fn iso_durations() {
        assert_eq!(parse_iso_duration("P1D").unwrap(), Duration::days(1));
        assert_eq!(parse_iso_duration("PT6H").unwrap(), Duration::hours(6));
        assert_eq!(
            parse_iso_duration("P1DT30M").unwrap(),
            Duration::days(1) + Duration::minutes(30)
        );
        assert_eq!(parse_iso_duration("P2W").unwrap(), Duration::days(14));
        assert!(parse_iso_duration("P1M").is_err());
        assert!(parse_iso_duration("P0D").is_err());
        assert!(parse_iso_duration("1D").is_err());
    }
}
