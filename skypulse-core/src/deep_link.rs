//! Shareable links that select a location: `?lat=..&lon=..&name=..`.

use url::Url;

use crate::model::Location;

const LAT: &str = "lat";
const LON: &str = "lon";
const NAME: &str = "name";

/// Location named by a link's query string.
///
/// All three parameters must be present and non-empty, and both coordinates
/// must be finite numbers; otherwise the link selects nothing.
pub fn parse_location(link: &Url) -> Option<Location> {
    let mut lat = None;
    let mut lon = None;
    let mut name = None;

    for (key, value) in link.query_pairs() {
        match key.as_ref() {
            LAT => lat = Some(value.into_owned()),
            LON => lon = Some(value.into_owned()),
            NAME => name = Some(value.into_owned()),
            _ => {}
        }
    }

    let latitude = parse_coordinate(lat.as_deref()?)?;
    let longitude = parse_coordinate(lon.as_deref()?)?;
    let name = name.filter(|n| !n.is_empty())?;

    Some(Location::new(name, latitude, longitude))
}

/// Like [`parse_location`], for a link that has not been parsed yet.
pub fn parse_location_str(link: &str) -> Option<Location> {
    match Url::parse(link) {
        Ok(url) => parse_location(&url),
        Err(err) => {
            tracing::debug!(%err, link, "ignoring unparsable link");
            None
        }
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `base` with `lat`, `lon` and `name` set for `location`.
///
/// Other query parameters on `base` are kept; earlier values of the three
/// location parameters are replaced.
pub fn share_url(base: &Url, location: &Location) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| !matches!(k.as_ref(), LAT | LON | NAME))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(LAT, &location.latitude.to_string())
        .append_pair(LON, &location.longitude.to_string())
        .append_pair(NAME, &location.name);
    url
}
