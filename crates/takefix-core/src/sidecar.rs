use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Suffix appended to the full media filename (extension included) to
/// locate its sidecar, e.g. `IMG_0001.jpg.supplemental-metadata.json`.
pub const SIDECAR_SUFFIX: &str = ".supplemental-metadata.json";

/// Geolocation from a sidecar, signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized metadata extracted from one sidecar file.
#[derive(Debug, Clone, PartialEq)]
pub struct Sidecar {
    /// Capture time, seconds since epoch UTC
    pub taken_at: Option<i64>,
    /// Present only when the sidecar carries both coordinates
    pub geo: Option<GeoPoint>,
}

#[derive(Deserialize)]
struct RawSidecar {
    #[serde(rename = "photoTakenTime")]
    photo_taken_time: Option<RawTakenTime>,
    #[serde(rename = "geoData")]
    geo_data: Option<RawGeoData>,
}

#[derive(Deserialize)]
struct RawTakenTime {
    timestamp: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawGeoData {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Path of the sidecar belonging to `media_path`.
pub fn sidecar_path(media_path: &Path) -> PathBuf {
    let mut name = media_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    media_path.with_file_name(name)
}

/// Read the sidecar next to `media_path`.
///
/// A missing sidecar is `Ok(None)`, not an error. Malformed JSON and a
/// timestamp that cannot be parsed as integer seconds are errors; missing
/// fields just leave the corresponding part of the record empty.
pub fn read(media_path: &Path) -> anyhow::Result<Option<Sidecar>> {
    let path = sidecar_path(media_path);
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(&path)
        .with_context(|| format!("Failed to open sidecar {}", path.display()))?;
    let raw: RawSidecar = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Malformed sidecar {}", path.display()))?;

    let taken_at = match raw.photo_taken_time.and_then(|t| t.timestamp) {
        Some(value) => Some(
            parse_timestamp(&value)
                .with_context(|| format!("Bad timestamp in sidecar {}", path.display()))?,
        ),
        None => None,
    };

    let geo = raw.geo_data.and_then(|g| match (g.latitude, g.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
        _ => None,
    });

    Ok(Some(Sidecar { taken_at, geo }))
}

/// Takeout writes the timestamp as a decimal string; some exports use a
/// plain number.
fn parse_timestamp(value: &serde_json::Value) -> anyhow::Result<i64> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    if let Some(s) = value.as_str() {
        return s
            .trim()
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("invalid timestamp {:?}: {}", s, e));
    }
    anyhow::bail!("timestamp is neither a number nor a string")
}
