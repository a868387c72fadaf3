use url::form_urlencoded;

use super::repo_types::Attribution;

/// Payloads starting with this marker carry a query string of utm tags.
pub const UTM_MARKER: &str = "utm:";

/// Source recorded for utm payloads that do not name a `utm_source`.
const UTM_FALLBACK_SOURCE: &str = "utm";

/// Turn the optional start payload into an attribution tuple.
///
/// Total: unknown keys, empty values and malformed pairs are dropped, the
/// first occurrence of a repeated key wins.
pub fn parse_payload(payload: Option<&str>) -> Attribution {
    let Some(raw) = payload.filter(|p| !p.is_empty()) else {
        return Attribution::default();
    };

    let Some(query) = raw.strip_prefix(UTM_MARKER) else {
        return Attribution {
            source: Some(raw.to_string()),
            ..Attribution::default()
        };
    };

    let mut attribution = Attribution::default();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        let slot = match key.as_ref() {
            "utm_source" => &mut attribution.utm_source,
            "utm_medium" => &mut attribution.utm_medium,
            "utm_campaign" => &mut attribution.utm_campaign,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    attribution.source = Some(
        attribution
            .utm_source
            .clone()
            .unwrap_or_else(|| UTM_FALLBACK_SOURCE.to_string()),
    );
    attribution
}
