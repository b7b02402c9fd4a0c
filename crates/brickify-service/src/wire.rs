//! Wire format of the mosaic server.
//!
//! Request: `POST {endpoint}?image_url=..&panels=..&image_ext=..&panel_size=..&aspect_ratio=W/H`
//! with `Content-Type: application/json` and an empty body.
//!
//! Response:
//!
//! ```json
//! {
//!   "mosaic_image_base64": "iVBORw0...",
//!   "instructions_image_base64": "iVBORw0...",
//!   "pieces_table": {
//!     "3": { "LEGO Brick Color": "Bright Red", "1 x 1": 120 }
//!   }
//! }
//! ```
//!
//! Parsing is all-or-nothing: any missing field, bad base64 or
//! undecodable image fails the whole response.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use brickify_pipeline::{
    ComputeError, MosaicResult, PieceTable, PieceTableEntry, RenderedImage,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::compute::MosaicRequest;

/// Field holding the mosaic raster.
pub const MOSAIC_FIELD: &str = "mosaic_image_base64";
/// Field holding the instructions raster.
pub const INSTRUCTIONS_FIELD: &str = "instructions_image_base64";
/// Field holding the piece table.
pub const PIECES_FIELD: &str = "pieces_table";
/// Colour label inside a piece table entry.
pub const COLOR_KEY: &str = "LEGO Brick Color";
/// 1 x 1 count inside a piece table entry.
pub const COUNT_KEY: &str = "1 x 1";

/// Build the request URL.
///
/// Values are form-encoded except `aspect_ratio`, which is two integers
/// around a literal `/` and goes out as `aspect_ratio=2/3`.
#[must_use]
pub fn request_url(endpoint: &Url, image_url: &Url, request: &MosaicRequest) -> Url {
    let layout = request.layout;
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("image_url", image_url.as_str())
        .append_pair("panels", &layout.total_panels().to_string())
        .append_pair("image_ext", request.format.extension())
        .append_pair("panel_size", &layout.panel_size().to_string());
    let query = format!(
        "{}&aspect_ratio={}",
        url.query().unwrap_or_default(),
        layout.aspect_ratio_param()
    );
    url.set_query(Some(&query));
    url
}

#[derive(Deserialize)]
struct RawResponse {
    mosaic_image_base64: Option<String>,
    instructions_image_base64: Option<String>,
    pieces_table: Option<Map<String, Value>>,
}

/// Parse a response body into a [`MosaicResult`].
///
/// # Errors
///
/// Returns [`ComputeError::InvalidPayload`] if the body is not a JSON
/// object of the expected shape, [`ComputeError::MissingField`] for an
/// absent top-level field and [`ComputeError::InvalidImage`] when an
/// image field does not decode.
pub fn parse_response(body: &[u8]) -> Result<MosaicResult, ComputeError> {
    let raw: RawResponse =
        serde_json::from_slice(body).map_err(|e| ComputeError::InvalidPayload(e.to_string()))?;

    let mosaic = decode_image(
        MOSAIC_FIELD,
        raw.mosaic_image_base64
            .ok_or(ComputeError::MissingField(MOSAIC_FIELD))?,
    )?;
    let instructions = decode_image(
        INSTRUCTIONS_FIELD,
        raw.instructions_image_base64
            .ok_or(ComputeError::MissingField(INSTRUCTIONS_FIELD))?,
    )?;
    let pieces = parse_pieces(
        raw.pieces_table
            .ok_or(ComputeError::MissingField(PIECES_FIELD))?,
    )?;

    Ok(MosaicResult {
        mosaic,
        instructions,
        pieces,
    })
}

fn decode_image(field: &'static str, encoded: String) -> Result<RenderedImage, ComputeError> {
    // Tolerate a data URL in place of bare base64.
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded.as_str(),
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ComputeError::InvalidImage {
            field,
            reason: e.to_string(),
        })?;
    RenderedImage::from_encoded(bytes).map_err(|e| ComputeError::InvalidImage {
        field,
        reason: e.to_string(),
    })
}

fn parse_pieces(table: Map<String, Value>) -> Result<PieceTable, ComputeError> {
    table
        .into_iter()
        .map(|(color_id, value)| {
            let label = value
                .get(COLOR_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ComputeError::InvalidPayload(format!(
                        "{PIECES_FIELD}[{color_id}] has no string `{COLOR_KEY}`"
                    ))
                })?
                .to_owned();
            let count = value.get(COUNT_KEY).and_then(as_count).ok_or_else(|| {
                ComputeError::InvalidPayload(format!(
                    "{PIECES_FIELD}[{color_id}] has no non-negative integer `{COUNT_KEY}`"
                ))
            })?;
            Ok(PieceTableEntry {
                color_id,
                label,
                count,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(PieceTable::new)
}

/// Counts arrive as integers, or as whole floats from pandas frames.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= 9.0e15)
            .map(|f| f as u64)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use brickify_pipeline::{Dimensions, LayoutParameters, PanelSize, SourceFormat};

    use super::*;

    fn png_base64(width: u32, height: u32) -> String {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, 255]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        STANDARD.encode(buf)
    }

    fn body(pieces: &str) -> String {
        format!(
            r#"{{"mosaic_image_base64":"{}","instructions_image_base64":"{}","pieces_table":{pieces}}}"#,
            png_base64(64, 96),
            png_base64(10, 10)
        )
    }

    #[test]
    fn request_carries_total_panels_and_aspect() {
        let endpoint = Url::parse("http://127.0.0.1:8000/upload").unwrap();
        let image = Url::parse(
            "https://firebasestorage.googleapis.com/v0/b/x/o/images%2Fcat.png?alt=media&token=t",
        )
        .unwrap();
        let request = MosaicRequest {
            layout: LayoutParameters::new(2, 3, PanelSize::Studs32).unwrap(),
            format: SourceFormat::Png,
        };
        let url = request_url(&endpoint, &image, &request);

        let query = url.query().unwrap();
        assert!(query.contains("panels=6"));
        assert!(query.contains("panel_size=32"));
        assert!(query.contains("image_ext=png"));
        assert!(query.ends_with("&aspect_ratio=2/3"));
        assert!(!query.contains("%2F3"));

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let names: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["image_url", "panels", "image_ext", "panel_size", "aspect_ratio"]
        );
        assert_eq!(pairs[0].1, image.as_str());
        assert_eq!(pairs[4].1, "2/3");
        assert_eq!(url.path(), "/upload");
    }

    #[test]
    fn parses_complete_response_in_order() {
        let json = body(
            r#"{"5":{"LEGO Brick Color":"Bright Yellow","1 x 1":7},"1":{"LEGO Brick Color":"White","1 x 1":3}}"#,
        );
        let result = parse_response(json.as_bytes()).unwrap();
        assert_eq!(result.mosaic.dimensions(), Dimensions::new(64, 96));
        assert_eq!(result.instructions.dimensions(), Dimensions::new(10, 10));
        let labels: Vec<_> = result
            .pieces
            .entries()
            .iter()
            .map(|e| (e.color_id.as_str(), e.label.as_str(), e.count))
            .collect();
        assert_eq!(labels, [("5", "Bright Yellow", 7), ("1", "White", 3)]);
        assert_eq!(result.total_pieces(), 10);
    }

    #[test]
    fn whole_float_counts_are_accepted() {
        let json = body(r#"{"1":{"LEGO Brick Color":"White","1 x 1":12.0}}"#);
        assert_eq!(parse_response(json.as_bytes()).unwrap().total_pieces(), 12);
    }

    #[test]
    fn missing_piece_table_is_an_error() {
        let json = format!(
            r#"{{"mosaic_image_base64":"{0}","instructions_image_base64":"{0}"}}"#,
            png_base64(2, 2)
        );
        assert!(matches!(
            parse_response(json.as_bytes()),
            Err(ComputeError::MissingField("pieces_table"))
        ));
    }

    #[test]
    fn missing_mosaic_is_an_error() {
        let json = r#"{"instructions_image_base64":"","pieces_table":{}}"#;
        assert!(matches!(
            parse_response(json.as_bytes()),
            Err(ComputeError::MissingField("mosaic_image_base64"))
        ));
    }

    #[test]
    fn bad_base64_is_an_image_error() {
        let json = format!(
            r#"{{"mosaic_image_base64":"@@@","instructions_image_base64":"{}","pieces_table":{{}}}}"#,
            png_base64(2, 2)
        );
        assert!(matches!(
            parse_response(json.as_bytes()),
            Err(ComputeError::InvalidImage {
                field: "mosaic_image_base64",
                ..
            })
        ));
    }

    #[test]
    fn base64_of_garbage_is_an_image_error() {
        let json = format!(
            r#"{{"mosaic_image_base64":"{}","instructions_image_base64":"{}","pieces_table":{{}}}}"#,
            png_base64(2, 2),
            STANDARD.encode(b"definitely not a png")
        );
        assert!(matches!(
            parse_response(json.as_bytes()),
            Err(ComputeError::InvalidImage {
                field: "instructions_image_base64",
                ..
            })
        ));
    }

    #[test]
    fn entry_without_count_is_rejected() {
        let json = body(r#"{"1":{"LEGO Brick Color":"White"}}"#);
        assert!(matches!(
            parse_response(json.as_bytes()),
            Err(ComputeError::InvalidPayload(_))
        ));
    }

    #[test]
    fn negative_count_is_rejected() {
        let json = body(r#"{"1":{"LEGO Brick Color":"White","1 x 1":-4}}"#);
        assert!(parse_response(json.as_bytes()).is_err());
    }

    #[test]
    fn data_url_images_are_tolerated() {
        let png = png_base64(3, 3);
        let json = format!(
            r#"{{"mosaic_image_base64":"data:image/png;base64,{png}","instructions_image_base64":"{png}","pieces_table":{{}}}}"#
        );
        assert_eq!(
            parse_response(json.as_bytes())
                .unwrap()
                .mosaic
                .dimensions(),
            Dimensions::new(3, 3)
        );
    }

    #[test]
    fn non_json_is_invalid_payload() {
        assert!(matches!(
            parse_response(b"<html>502 Bad Gateway</html>"),
            Err(ComputeError::InvalidPayload(_))
        ));
    }
}
