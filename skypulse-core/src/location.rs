//! Location identity and the favorites set.

use serde::{Deserialize, Serialize};

use crate::model::Location;

/// Stable key for a place: both coordinates rounded to 4 decimals (~11 m).
///
/// The only place this derivation lives; favorites and lookups all go through it.
pub fn location_id(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.4}_{longitude:.4}")
}

impl Location {
    pub fn id(&self) -> String {
        location_id(self.latitude, self.longitude)
    }

    /// `(0, 0)` means nothing has been selected yet.
    pub fn is_unset(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }

    pub fn same_place(&self, other: &Location) -> bool {
        self.id() == other.id()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteCity {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
}

impl From<&Location> for FavoriteCity {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id(),
            name: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            country: location.country.clone(),
            admin1: location.admin1.clone(),
        }
    }
}

impl From<&FavoriteCity> for Location {
    fn from(fav: &FavoriteCity) -> Self {
        Self {
            name: fav.name.clone(),
            latitude: fav.latitude,
            longitude: fav.longitude,
            country: fav.country.clone(),
            admin1: fav.admin1.clone(),
            timezone: None,
        }
    }
}

/// Favorite cities in insertion order, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<FavoriteCity>);

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FavoriteCity> {
        self.0.iter()
    }

    pub fn get(&self, id: &str) -> Option<&FavoriteCity> {
        self.0.iter().find(|f| f.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn contains(&self, location: &Location) -> bool {
        self.contains_id(&location.id())
    }

    /// Append `location` unless its id is already present. Returns whether the set changed.
    pub fn add(&mut self, location: &Location) -> bool {
        if self.contains(location) {
            return false;
        }
        self.0.push(FavoriteCity::from(location));
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|f| f.id != id);
        self.0.len() != before
    }

    /// Remove if present, add otherwise. Returns `true` when the location is now a favorite.
    pub fn toggle(&mut self, location: &Location) -> bool {
        let id = location.id();
        if self.contains_id(&id) {
            self.remove(&id);
            false
        } else {
            self.0.push(FavoriteCity::from(location));
            true
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.id.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Favorites {
    type Item = &'a FavoriteCity;
    type IntoIter = std::slice::Iter<'a, FavoriteCity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
