use serde_json::Value;
use tracing::warn;

/// File names listed under `images` in a vehicle's details JSON.
///
/// Missing details, a missing or non-array `images` key, and unparsable
/// JSON all yield an empty list. Non-string entries are skipped.
pub fn image_filenames(details_json: Option<&str>) -> Vec<String> {
    let Some(raw) = details_json else {
        return Vec::new();
    };

    let details: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Could not parse details JSON: {}", e);
            return Vec::new();
        }
    };

    details
        .get("images")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
