//! User preferences shared across the application.
//!
//! [`Settings`] owns the persisted state and is handed to consumers by
//! reference. Every change is written through to the store and broadcast to
//! subscribers as a fresh [`SettingsSnapshot`].

use anyhow::Result;
use tokio::sync::watch;

use crate::{
    location::Favorites,
    model::{Location, ThemeMode},
    storage::{
        FAVORITES_KEY, KeyValueStore, LAST_LOCATION_KEY, THEME_KEY, UNIT_KEY,
        read_json_or_default, read_parsed_or_default, write_json,
    },
    units::TemperatureUnit,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsSnapshot {
    pub unit: TemperatureUnit,
    pub theme: ThemeMode,
    pub favorites: Favorites,
    pub current_location: Location,
}

#[derive(Debug)]
pub struct Settings<S: KeyValueStore> {
    store: S,
    state: watch::Sender<SettingsSnapshot>,
}

impl<S: KeyValueStore> Settings<S> {
    /// Load every preference from `store`, defaulting whatever is missing or unreadable.
    pub fn load(store: S) -> Self {
        let snapshot = SettingsSnapshot {
            unit: read_parsed_or_default(&store, UNIT_KEY),
            theme: read_parsed_or_default(&store, THEME_KEY),
            favorites: read_json_or_default(&store, FAVORITES_KEY),
            current_location: read_json_or_default(&store, LAST_LOCATION_KEY),
        };

        let (state, _) = watch::channel(snapshot);
        Self { store, state }
    }

    pub fn snapshot(&self) -> SettingsSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that observes every subsequent change.
    pub fn subscribe(&self) -> watch::Receiver<SettingsSnapshot> {
        self.state.subscribe()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.borrow().unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) -> Result<()> {
        self.store.set(UNIT_KEY, unit.as_str())?;
        self.state.send_modify(|s| s.unit = unit);
        Ok(())
    }

    pub fn toggle_unit(&mut self) -> Result<TemperatureUnit> {
        let unit = self.unit().toggle();
        self.set_unit(unit)?;
        Ok(unit)
    }

    pub fn theme(&self) -> ThemeMode {
        self.state.borrow().theme
    }

    pub fn set_theme(&mut self, theme: ThemeMode) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())?;
        self.state.send_modify(|s| s.theme = theme);
        Ok(())
    }

    pub fn current_location(&self) -> Location {
        self.state.borrow().current_location.clone()
    }

    /// Replace the selected location wholesale.
    pub fn set_current_location(&mut self, location: Location) -> Result<()> {
        write_json(&mut self.store, LAST_LOCATION_KEY, &location)?;
        self.state.send_modify(|s| s.current_location = location);
        Ok(())
    }

    pub fn favorites(&self) -> Favorites {
        self.state.borrow().favorites.clone()
    }

    pub fn is_favorite(&self, location: &Location) -> bool {
        self.state.borrow().favorites.contains(location)
    }

    pub fn add_favorite(&mut self, location: &Location) -> Result<bool> {
        self.update_favorites(|favs| favs.add(location))
    }

    pub fn remove_favorite(&mut self, id: &str) -> Result<bool> {
        self.update_favorites(|favs| favs.remove(id))
    }

    /// Returns `true` when `location` is a favorite afterwards.
    pub fn toggle_favorite(&mut self, location: &Location) -> Result<bool> {
        let mut favs = self.favorites();
        let now_favorite = favs.toggle(location);
        self.store_favorites(favs)?;
        Ok(now_favorite)
    }

    /// Apply `change`; persist and notify only if it reports a modification.
    fn update_favorites(&mut self, change: impl FnOnce(&mut Favorites) -> bool) -> Result<bool> {
        let mut favs = self.favorites();
        if !change(&mut favs) {
            return Ok(false);
        }
        self.store_favorites(favs)?;
        Ok(true)
    }

    fn store_favorites(&mut self, favs: Favorites) -> Result<()> {
        write_json(&mut self.store, FAVORITES_KEY, &favs)?;
        self.state.send_modify(|s| s.favorites = favs);
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn paris() -> Location {
        Location::new("Paris", 48.8566, 2.3522)
    }

    #[test]
    fn empty_store_gives_defaults() {
        let settings = Settings::load(MemoryStore::new());
        let snap = settings.snapshot();

        assert_eq!(snap.unit, TemperatureUnit::Celsius);
        assert_eq!(snap.theme, ThemeMode::System);
        assert!(snap.favorites.is_empty());
        assert_eq!(snap.current_location.name, "New York");
    }

    #[test]
    fn invalid_stored_values_fall_back() {
        let mut store = MemoryStore::new();
        store.set(UNIT_KEY, "kelvin").expect("set");
        store.set(THEME_KEY, "neon").expect("set");
        store.set(FAVORITES_KEY, "not json").expect("set");

        let snap = Settings::load(store).snapshot();
        assert_eq!(snap.unit, TemperatureUnit::Celsius);
        assert_eq!(snap.theme, ThemeMode::System);
        assert!(snap.favorites.is_empty());
    }

    #[test]
    fn writes_are_persisted() {
        let mut settings = Settings::load(MemoryStore::new());
        settings.set_unit(TemperatureUnit::Fahrenheit).expect("unit");
        settings.set_theme(ThemeMode::Dark).expect("theme");
        settings.set_current_location(paris()).expect("location");
        settings.add_favorite(&paris()).expect("favorite");

        let store = settings.into_store();
        assert_eq!(store.get(UNIT_KEY).as_deref(), Some("fahrenheit"));
        assert_eq!(store.get(THEME_KEY).as_deref(), Some("dark"));

        let reloaded = Settings::load(store);
        assert_eq!(reloaded.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(reloaded.current_location().name, "Paris");
        assert!(reloaded.is_favorite(&paris()));
    }

    #[test]
    fn subscribers_see_changes() {
        let mut settings = Settings::load(MemoryStore::new());
        let mut rx = settings.subscribe();
        assert!(!rx.has_changed().expect("sender alive"));

        settings.toggle_unit().expect("toggle");
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn duplicate_favorite_does_not_notify() {
        let mut settings = Settings::load(MemoryStore::new());
        assert!(settings.add_favorite(&paris()).expect("add"));

        let rx = settings.subscribe();
        assert!(!settings.add_favorite(&paris()).expect("add"));
        assert!(!rx.has_changed().expect("sender alive"));
        assert_eq!(settings.favorites().len(), 1);
    }

    #[test]
    fn toggle_favorite_roundtrip() {
        let mut settings = Settings::load(MemoryStore::new());
        assert!(settings.toggle_favorite(&paris()).expect("toggle"));
        assert!(!settings.toggle_favorite(&paris()).expect("toggle"));
        assert!(settings.favorites().is_empty());
        assert!(!settings.remove_favorite(&paris().id()).expect("remove"));
    }
}
