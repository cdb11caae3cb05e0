use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;

use crate::classify::MediaKind;
use crate::sidecar::GeoPoint;

/// External metadata rewriting binary, resolved via PATH.
const EXIFTOOL_BIN: &str = "exiftool";

/// Format epoch seconds in exiftool's `YYYY:MM:DD HH:MM:SS` layout.
/// The epoch value is rendered as UTC wall-clock fields, no timezone
/// conversion.
pub fn format_timestamp(epoch: i64) -> anyhow::Result<String> {
    let utc = chrono::DateTime::from_timestamp(epoch, 0)
        .with_context(|| format!("Timestamp {} is out of range", epoch))?;
    Ok(utc.format("%Y:%m:%d %H:%M:%S").to_string())
}

/// Build the exiftool argument list for one media file.
///
/// Images get `DateTimeOriginal` plus GPS tags when coordinates are
/// available; videos get `CreateDate`/`MediaCreateDate` and never GPS.
/// Ends with `-overwrite_original` and the target path.
pub fn build_args(
    kind: MediaKind,
    taken_at: i64,
    geo: Option<GeoPoint>,
    media_path: &Path,
) -> anyhow::Result<Vec<OsString>> {
    let ts = format_timestamp(taken_at)?;
    let mut args: Vec<OsString> = Vec::new();

    match kind {
        MediaKind::Image => {
            args.push(format!("-DateTimeOriginal={}", ts).into());
            if let Some(geo) = geo {
                let lat_ref = if geo.latitude >= 0.0 { "N" } else { "S" };
                let lon_ref = if geo.longitude >= 0.0 { "E" } else { "W" };
                args.push(format!("-GPSLatitude={}", geo.latitude.abs()).into());
                args.push(format!("-GPSLatitudeRef={}", lat_ref).into());
                args.push(format!("-GPSLongitude={}", geo.longitude.abs()).into());
                args.push(format!("-GPSLongitudeRef={}", lon_ref).into());
            }
        }
        MediaKind::Video => {
            args.push(format!("-CreateDate={}", ts).into());
            args.push(format!("-MediaCreateDate={}", ts).into());
        }
        MediaKind::Unsupported => {
            anyhow::bail!("Unsupported media kind for {}", media_path.display())
        }
    }

    args.push("-overwrite_original".into());
    args.push(media_path.as_os_str().to_os_string());

    Ok(args)
}

/// Invoke exiftool and wait for it to finish. Output is discarded; the
/// exit status is only inspected in strict mode (the historical behavior
/// ignores it entirely).
pub fn run(args: &[OsString], strict: bool) -> anyhow::Result<()> {
    let status = Command::new(EXIFTOOL_BIN)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("Failed to launch exiftool")?;

    if strict && !status.success() {
        anyhow::bail!("exiftool exited with {}", status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(1700000000).unwrap(), "2023:11:14 22:13:20");
        assert_eq!(format_timestamp(0).unwrap(), "1970:01:01 00:00:00");
    }

    #[test]
    fn test_format_timestamp_out_of_range() {
        assert!(format_timestamp(i64::MAX).is_err());
    }

    #[test]
    fn test_image_args_without_geo() {
        let args = build_args(MediaKind::Image, 1700000000, None, Path::new("a/img.jpg")).unwrap();
        assert_eq!(
            strings(&args),
            vec![
                "-DateTimeOriginal=2023:11:14 22:13:20",
                "-overwrite_original",
                "a/img.jpg",
            ]
        );
    }

    #[test]
    fn test_image_args_hemispheres() {
        let cases = [
            (40.7, -74.0, "N", "W"),
            (40.7, 74.0, "N", "E"),
            (-33.9, 151.2, "S", "E"),
            (-33.9, -151.2, "S", "W"),
        ];
        for (lat, lon, lat_ref, lon_ref) in cases {
            let geo = GeoPoint {
                latitude: lat,
                longitude: lon,
            };
            let args =
                build_args(MediaKind::Image, 0, Some(geo), Path::new("img.jpg")).unwrap();
            let args = strings(&args);
            assert_eq!(args[1], format!("-GPSLatitude={}", lat.abs()));
            assert_eq!(args[2], format!("-GPSLatitudeRef={}", lat_ref));
            assert_eq!(args[3], format!("-GPSLongitude={}", lon.abs()));
            assert_eq!(args[4], format!("-GPSLongitudeRef={}", lon_ref));
        }
    }

    #[test]
    fn test_video_args_never_include_gps() {
        let geo = GeoPoint {
            latitude: 40.7,
            longitude: -74.0,
        };
        let args =
            build_args(MediaKind::Video, 1700000000, Some(geo), Path::new("clip.mp4")).unwrap();
        assert_eq!(
            strings(&args),
            vec![
                "-CreateDate=2023:11:14 22:13:20",
                "-MediaCreateDate=2023:11:14 22:13:20",
                "-overwrite_original",
                "clip.mp4",
            ]
        );
    }

    #[test]
    fn test_target_path_is_last() {
        let args = build_args(MediaKind::Image, 0, None, Path::new("x/y.png")).unwrap();
        assert_eq!(args.last().unwrap(), &OsString::from("x/y.png"));
        assert_eq!(args[args.len() - 2], OsString::from("-overwrite_original"));
    }

    #[test]
    fn test_unsupported_kind_is_rejected() {
        assert!(build_args(MediaKind::Unsupported, 0, None, Path::new("f.bin")).is_err());
    }
}
