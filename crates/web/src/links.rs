//! Capture links that are handed to whoever stands at a station.

use schemars::JsonSchema;
use serde::Serialize;
use url::{form_urlencoded, ParseError, Url};

use crate::middleware::base_url::BaseUrl;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinks {
    pub capture_url: String,
    pub message: String,
    pub whatsapp: String,
    pub telegram: String,
    pub sms: String,
    pub email: String,
}

/// Page a capture link points to.
pub fn capture_url(base_url: &BaseUrl, station_id: &str) -> String {
    base_url.full_url(format!("/capture.html?station={}", station_id))
}

pub fn share_links(
    base_url: &BaseUrl,
    station_id: &str,
    station_name: &str,
) -> Result<ShareLinks, ParseError> {
    let capture_url = capture_url(base_url, station_id);
    let message = format!(
        "Please open this link while standing at {} to record its location: {}",
        station_name, capture_url
    );
    let subject = format!("Location capture for {}", station_name);

    let whatsapp = Url::parse_with_params("https://wa.me/", &[("text", &message)])?;
    let telegram = Url::parse_with_params(
        "https://t.me/share/url",
        &[("url", &capture_url), ("text", &message)],
    )?;

    Ok(ShareLinks {
        whatsapp: whatsapp.into(),
        telegram: telegram.into(),
        sms: format!("sms:?body={}", percent_encode(&message)),
        email: format!(
            "mailto:?subject={}&body={}",
            percent_encode(&subject),
            percent_encode(&message)
        ),
        capture_url,
        message,
    })
}

/// `sms:` and `mailto:` handlers do not decode `+` as a space.
fn percent_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
