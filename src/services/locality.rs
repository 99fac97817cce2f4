//! User locality resolution.
//!
//! Turns coordinates into a city name through a Nominatim-compatible
//! reverse geocoder. Any failure falls back to the configured default city,
//! so resolution itself never errors.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{Config, UserLocality};

const UNKNOWN_CITY: &str = "未知城市";

/// Latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: ReverseAddress,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    city: Option<String>,
    town: Option<String>,
    county: Option<String>,
}

/// Build the reverse-geocoding request URL.
pub fn reverse_url(base: &str, coords: Coordinates) -> Result<Url> {
    let url = Url::parse_with_params(
        base,
        &[
            ("format", "json".to_string()),
            ("lat", coords.latitude.to_string()),
            ("lon", coords.longitude.to_string()),
            ("zoom", "10".to_string()),
        ],
    )?;
    Ok(url)
}

/// Pick the city name out of a reverse-geocoding response body.
pub fn city_from_response(body: &str) -> Result<String> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    let address = response.address;
    Ok(address
        .city
        .or(address.town)
        .or(address.county)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_CITY.to_string()))
}

async fn reverse_geocode(client: &Client, base: &str, coords: Coordinates) -> Result<String> {
    let url = reverse_url(base, coords)?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    city_from_response(&body)
}

/// Resolve the user's city once for a session.
pub async fn resolve(client: &Client, config: &Config, coords: Option<Coordinates>) -> UserLocality {
    let default_city = &config.reminder.default_city;

    let Some(coords) = coords else {
        log::info!("No coordinates available, assuming {}", default_city);
        return UserLocality::new(default_city.clone());
    };

    match reverse_geocode(client, &config.locality.geocoder_url, coords).await {
        Ok(city) => {
            log::info!("User city resolved: {}", city);
            UserLocality::new(city)
        }
        Err(e) => {
            log::warn!("Reverse geocoding failed: {}. Assuming {}", e, default_city);
            UserLocality::new(default_city.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::create_async_client;

    #[test]
    fn test_city_preferred_over_town() {
        let body = r#"{"address": {"city": "杭州市", "town": "西湖镇", "county": "西湖区"}}"#;
        assert_eq!(city_from_response(body).unwrap(), "杭州市");
    }

    #[test]
    fn test_falls_back_to_town_then_county() {
        let town = r#"{"address": {"town": "周庄镇", "county": "昆山市"}}"#;
        assert_eq!(city_from_response(town).unwrap(), "周庄镇");

        let county = r#"{"address": {"county": "密云区"}}"#;
        assert_eq!(city_from_response(county).unwrap(), "密云区");
    }

    #[test]
    fn test_unknown_city_when_address_missing() {
        assert_eq!(city_from_response("{}").unwrap(), UNKNOWN_CITY);
    }

    #[test]
    fn test_malformed_body_is_error() {
        assert!(city_from_response("<html>").is_err());
    }

    #[test]
    fn test_reverse_url_params() {
        let url = reverse_url(
            "https://nominatim.openstreetmap.org/reverse",
            Coordinates {
                latitude: 39.9,
                longitude: 116.4,
            },
        )
        .unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("format=json"));
        assert!(query.contains("lat=39.9"));
        assert!(query.contains("lon=116.4"));
        assert!(query.contains("zoom=10"));
    }

    #[tokio::test]
    async fn test_no_coordinates_uses_default_city() {
        let config = Config::default();
        let client = create_async_client(&config.locality).unwrap();
        let locality = resolve(&client, &config, None).await;
        assert_eq!(locality.city_name, "北京");
    }

    #[tokio::test]
    async fn test_unreachable_geocoder_uses_default_city() {
        let mut config = Config::default();
        config.locality.geocoder_url = "http://127.0.0.1:9/reverse".into();
        config.locality.timeout_secs = 2;
        config.reminder.default_city = "成都".into();
        let client = create_async_client(&config.locality).unwrap();

        let coords = Coordinates {
            latitude: 30.6,
            longitude: 104.0,
        };
        assert_eq!(resolve(&client, &config, Some(coords)).await.city_name, "成都");
    }
}
