//! `wayfarer places` and `wayfarer directions`.

use anyhow::{Context, Result};

use wayfarer_api::ApiClient;
use wayfarer_api::models::{DirectionsRequest, TravelProfile};

/// Parse a `"lng,lat"` pair.
pub fn parse_point(s: &str) -> Result<[f64; 2], String> {
    let (lng, lat) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lng,lat\", got {s:?}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude {:?}", lng.trim()))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude {:?}", lat.trim()))?;
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("point {s:?} is out of range"));
    }
    Ok([lng, lat])
}

pub async fn run_places(client: &ApiClient, query: &str, location: Option<&str>) -> Result<()> {
    let places = client
        .search_places(query, location)
        .await
        .context("place search failed")?;

    if places.is_empty() {
        println!("No places found for {query:?}.");
        return Ok(());
    }

    for place in &places {
        let category = place.category.as_deref().unwrap_or("-");
        println!("{} [{category}]", place.name);
        println!("  {}", place.address);
        println!(
            "  lat {:.5}, lng {:.5}",
            place.coordinates.lat, place.coordinates.lng
        );
    }
    Ok(())
}

pub async fn run_directions(
    client: &ApiClient,
    from: [f64; 2],
    to: [f64; 2],
    profile: TravelProfile,
) -> Result<()> {
    let route = client
        .directions(&DirectionsRequest {
            start: from,
            end: to,
            profile,
        })
        .await
        .context("directions request failed")?;

    let pretty = serde_json::to_string_pretty(&route).context("failed to format route")?;
    println!("{pretty}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_point_accepts_spaces() {
        assert_eq!(parse_point("2.2945, 48.8584").unwrap(), [2.2945, 48.8584]);
    }

    #[test]
    fn parse_point_rejects_garbage() {
        assert!(parse_point("2.29").is_err());
        assert!(parse_point("east,48").is_err());
        assert!(parse_point("200,0").is_err());
        assert!(parse_point("0,-91").is_err());
    }
}
