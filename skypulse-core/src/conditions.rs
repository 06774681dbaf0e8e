//! WMO weather interpretation codes.
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::{Deserialize, Serialize};

/// Coarse visual grouping of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clear,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
    Foggy,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clear => "clear",
            Category::Cloudy => "cloudy",
            Category::Rainy => "rainy",
            Category::Snowy => "snowy",
            Category::Stormy => "stormy",
            Category::Foggy => "foggy",
        }
    }
}

/// Every weather code the upstream API emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WmoCode {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    DepositingRimeFog,
    LightDrizzle,
    ModerateDrizzle,
    DenseDrizzle,
    LightFreezingDrizzle,
    DenseFreezingDrizzle,
    SlightRain,
    ModerateRain,
    HeavyRain,
    LightFreezingRain,
    HeavyFreezingRain,
    SlightSnow,
    ModerateSnow,
    HeavySnow,
    SnowGrains,
    SlightRainShowers,
    ModerateRainShowers,
    ViolentRainShowers,
    SlightSnowShowers,
    HeavySnowShowers,
    Thunderstorm,
    ThunderstormSlightHail,
    ThunderstormHeavyHail,
}

impl WmoCode {
    pub const fn all() -> &'static [WmoCode] {
        use WmoCode::*;
        &[
            ClearSky,
            MainlyClear,
            PartlyCloudy,
            Overcast,
            Fog,
            DepositingRimeFog,
            LightDrizzle,
            ModerateDrizzle,
            DenseDrizzle,
            LightFreezingDrizzle,
            DenseFreezingDrizzle,
            SlightRain,
            ModerateRain,
            HeavyRain,
            LightFreezingRain,
            HeavyFreezingRain,
            SlightSnow,
            ModerateSnow,
            HeavySnow,
            SnowGrains,
            SlightRainShowers,
            ModerateRainShowers,
            ViolentRainShowers,
            SlightSnowShowers,
            HeavySnowShowers,
            Thunderstorm,
            ThunderstormSlightHail,
            ThunderstormHeavyHail,
        ]
    }

    pub fn code(self) -> i32 {
        use WmoCode::*;
        match self {
            ClearSky => 0,
            MainlyClear => 1,
            PartlyCloudy => 2,
            Overcast => 3,
            Fog => 45,
            DepositingRimeFog => 48,
            LightDrizzle => 51,
            ModerateDrizzle => 53,
            DenseDrizzle => 55,
            LightFreezingDrizzle => 56,
            DenseFreezingDrizzle => 57,
            SlightRain => 61,
            ModerateRain => 63,
            HeavyRain => 65,
            LightFreezingRain => 66,
            HeavyFreezingRain => 67,
            SlightSnow => 71,
            ModerateSnow => 73,
            HeavySnow => 75,
            SnowGrains => 77,
            SlightRainShowers => 80,
            ModerateRainShowers => 81,
            ViolentRainShowers => 82,
            SlightSnowShowers => 85,
            HeavySnowShowers => 86,
            Thunderstorm => 95,
            ThunderstormSlightHail => 96,
            ThunderstormHeavyHail => 99,
        }
    }

    pub fn description(self) -> &'static str {
        use WmoCode::*;
        match self {
            ClearSky => "Clear sky",
            MainlyClear => "Mainly clear",
            PartlyCloudy => "Partly cloudy",
            Overcast => "Overcast",
            Fog => "Fog",
            DepositingRimeFog => "Depositing rime fog",
            LightDrizzle => "Light drizzle",
            ModerateDrizzle => "Moderate drizzle",
            DenseDrizzle => "Dense drizzle",
            LightFreezingDrizzle => "Light freezing drizzle",
            DenseFreezingDrizzle => "Dense freezing drizzle",
            SlightRain => "Slight rain",
            ModerateRain => "Moderate rain",
            HeavyRain => "Heavy rain",
            LightFreezingRain => "Light freezing rain",
            HeavyFreezingRain => "Heavy freezing rain",
            SlightSnow => "Slight snow",
            ModerateSnow => "Moderate snow",
            HeavySnow => "Heavy snow",
            SnowGrains => "Snow grains",
            SlightRainShowers => "Slight rain showers",
            ModerateRainShowers => "Moderate rain showers",
            ViolentRainShowers => "Violent rain showers",
            SlightSnowShowers => "Slight snow showers",
            HeavySnowShowers => "Heavy snow showers",
            Thunderstorm => "Thunderstorm",
            ThunderstormSlightHail => "Thunderstorm with slight hail",
            ThunderstormHeavyHail => "Thunderstorm with heavy hail",
        }
    }

    pub fn category(self) -> Category {
        use WmoCode::*;
        match self {
            ClearSky | MainlyClear => Category::Clear,
            PartlyCloudy | Overcast => Category::Cloudy,
            Fog | DepositingRimeFog => Category::Foggy,
            LightDrizzle
            | ModerateDrizzle
            | DenseDrizzle
            | LightFreezingDrizzle
            | DenseFreezingDrizzle
            | SlightRain
            | ModerateRain
            | HeavyRain
            | LightFreezingRain
            | HeavyFreezingRain
            | SlightRainShowers
            | ModerateRainShowers
            | ViolentRainShowers => Category::Rainy,
            SlightSnow
            | ModerateSnow
            | HeavySnow
            | SnowGrains
            | SlightSnowShowers
            | HeavySnowShowers => Category::Snowy,
            Thunderstorm | ThunderstormSlightHail | ThunderstormHeavyHail => Category::Stormy,
        }
    }

    pub fn icon_key(self) -> &'static str {
        use WmoCode::*;
        match self {
            ClearSky | MainlyClear => "sun",
            PartlyCloudy => "cloud-sun",
            Overcast => "cloud",
            Fog | DepositingRimeFog => "cloud-fog",
            LightDrizzle
            | ModerateDrizzle
            | DenseDrizzle
            | LightFreezingDrizzle
            | DenseFreezingDrizzle => "cloud-drizzle",
            SlightRain
            | ModerateRain
            | HeavyRain
            | LightFreezingRain
            | HeavyFreezingRain
            | SlightRainShowers
            | ModerateRainShowers
            | ViolentRainShowers => "cloud-rain",
            SlightSnow | ModerateSnow | HeavySnow | SlightSnowShowers | HeavySnowShowers => {
                "cloud-snow"
            }
            SnowGrains => "snowflake",
            Thunderstorm => "cloud-lightning",
            ThunderstormSlightHail | ThunderstormHeavyHail => "cloud-hail",
        }
    }

    /// Night variant of the icon, for the few codes that have one.
    pub fn night_icon_key(self) -> Option<&'static str> {
        match self {
            WmoCode::ClearSky | WmoCode::MainlyClear => Some("moon"),
            WmoCode::PartlyCloudy => Some("cloud-moon"),
            _ => None,
        }
    }
}

impl TryFrom<i32> for WmoCode {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        use WmoCode::*;
        let known = match code {
            0 => ClearSky,
            1 => MainlyClear,
            2 => PartlyCloudy,
            3 => Overcast,
            45 => Fog,
            48 => DepositingRimeFog,
            51 => LightDrizzle,
            53 => ModerateDrizzle,
            55 => DenseDrizzle,
            56 => LightFreezingDrizzle,
            57 => DenseFreezingDrizzle,
            61 => SlightRain,
            63 => ModerateRain,
            65 => HeavyRain,
            66 => LightFreezingRain,
            67 => HeavyFreezingRain,
            71 => SlightSnow,
            73 => ModerateSnow,
            75 => HeavySnow,
            77 => SnowGrains,
            80 => SlightRainShowers,
            81 => ModerateRainShowers,
            82 => ViolentRainShowers,
            85 => SlightSnowShowers,
            86 => HeavySnowShowers,
            95 => Thunderstorm,
            96 => ThunderstormSlightHail,
            99 => ThunderstormHeavyHail,
            other => return Err(other),
        };
        Ok(known)
    }
}

/// Display information for a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionInfo {
    pub description: &'static str,
    pub category: Category,
    pub icon_key: &'static str,
}

impl ConditionInfo {
    pub const UNKNOWN: ConditionInfo = ConditionInfo {
        description: "Unknown",
        category: Category::Clear,
        icon_key: "wind",
    };
}

/// Look up a code; unknown codes resolve to [`ConditionInfo::UNKNOWN`].
pub fn condition_info(code: i32, is_night: bool) -> ConditionInfo {
    let Ok(wmo) = WmoCode::try_from(code) else {
        return ConditionInfo::UNKNOWN;
    };

    let icon_key = match wmo.night_icon_key() {
        Some(night) if is_night => night,
        _ => wmo.icon_key(),
    };

    ConditionInfo {
        description: wmo.description(),
        category: wmo.category(),
        icon_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: [i32; 28] = [
        0, 1, 2, 3, 45, 48, 51, 53, 55, 56, 57, 61, 63, 65, 66, 67, 71, 73, 75, 77, 80, 81, 82, 85,
        86, 95, 96, 99,
    ];

    #[test]
    fn every_known_code_has_a_description() {
        for code in CATALOG {
            for night in [false, true] {
                let info = condition_info(code, night);
                assert_ne!(info.description, "Unknown", "code {code}");
            }
        }
    }

    #[test]
    fn code_enum_roundtrip() {
        assert_eq!(WmoCode::all().len(), CATALOG.len());
        for wmo in WmoCode::all() {
            assert_eq!(WmoCode::try_from(wmo.code()), Ok(*wmo));
        }
    }

    #[test]
    fn unknown_codes_fall_back() {
        for code in [-1, 4, 44, 100, 999, i32::MAX] {
            assert_eq!(condition_info(code, false), ConditionInfo::UNKNOWN);
            assert_eq!(condition_info(code, true), ConditionInfo::UNKNOWN);
        }
        assert_eq!(ConditionInfo::UNKNOWN.icon_key, "wind");
        assert_eq!(ConditionInfo::UNKNOWN.category, Category::Clear);
    }

    #[test]
    fn night_icons_only_for_clear_and_partly_cloudy() {
        assert_eq!(condition_info(0, true).icon_key, "moon");
        assert_eq!(condition_info(1, true).icon_key, "moon");
        assert_eq!(condition_info(2, true).icon_key, "cloud-moon");
        assert_eq!(condition_info(2, false).icon_key, "cloud-sun");

        for code in CATALOG.iter().copied().filter(|c| *c > 2) {
            assert_eq!(
                condition_info(code, true).icon_key,
                condition_info(code, false).icon_key
            );
        }
    }

    #[test]
    fn categories() {
        assert_eq!(condition_info(0, false).category, Category::Clear);
        assert_eq!(condition_info(3, false).category, Category::Cloudy);
        assert_eq!(condition_info(48, false).category, Category::Foggy);
        assert_eq!(condition_info(61, false).category, Category::Rainy);
        assert_eq!(condition_info(61, false).description, "Slight rain");
        assert_eq!(condition_info(77, false).icon_key, "snowflake");
        assert_eq!(condition_info(86, false).category, Category::Snowy);
        assert_eq!(condition_info(99, false).category, Category::Stormy);
    }
}
