//! Weather correlation against an ailment's favorable conditions
//!
//! | Reported | Favorable condition required | Points |
//! |---|---|---|
//! | humid | humidity floor >= 60% | 1 |
//! | rainy | rainfall favoured | 1 |
//! | cold  | temperature ceiling <= 20°C | 1 |
//! | dry   | rainfall not favoured and humidity floor < 50% | 1 |

use crate::types::{AilmentRecord, DiagnosisRequest, WeatherCategory};

pub const WEATHER_POINTS: u32 = 1;

const HUMID_FLOOR: f64 = 60.0;
const DRY_CEILING: f64 = 50.0;
const COLD_CEILING: f64 = 20.0;

pub fn weather_points(ailment: &AilmentRecord, request: &DiagnosisRequest) -> u32 {
    let Some(weather) = request.weather_recent else {
        return 0;
    };
    let conditions = &ailment.favorable_conditions;

    let favoured = match weather {
        WeatherCategory::Humid => conditions.humidity_min.is_some_and(|h| h >= HUMID_FLOOR),
        WeatherCategory::Rainy => conditions.rainfall,
        WeatherCategory::Cold => conditions.temp_max.is_some_and(|t| t <= COLD_CEILING),
        WeatherCategory::Dry => {
            !conditions.rainfall && conditions.humidity_min.is_some_and(|h| h < DRY_CEILING)
        }
    };

    if favoured {
        WEATHER_POINTS
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FavorableConditions;

    fn thriving_in(conditions: FavorableConditions) -> AilmentRecord {
        let mut ailment = AilmentRecord::new(1, 1, "Test");
        ailment.favorable_conditions = conditions;
        ailment
    }

    fn after(weather: WeatherCategory) -> DiagnosisRequest {
        DiagnosisRequest::for_crop("Wheat").with_weather(weather)
    }

    #[test]
    fn test_humid() {
        let damp = thriving_in(FavorableConditions {
            humidity_min: Some(85.0),
            ..Default::default()
        });
        let moderate = thriving_in(FavorableConditions {
            humidity_min: Some(55.0),
            ..Default::default()
        });
        assert_eq!(weather_points(&damp, &after(WeatherCategory::Humid)), 1);
        assert_eq!(weather_points(&moderate, &after(WeatherCategory::Humid)), 0);
    }

    #[test]
    fn test_rainy() {
        let splash = thriving_in(FavorableConditions {
            rainfall: true,
            ..Default::default()
        });
        assert_eq!(weather_points(&splash, &after(WeatherCategory::Rainy)), 1);
        assert_eq!(weather_points(&thriving_in(Default::default()), &after(WeatherCategory::Rainy)), 0);
    }

    #[test]
    fn test_cold() {
        let cool = thriving_in(FavorableConditions {
            temp_max: Some(20.0),
            ..Default::default()
        });
        let warm = thriving_in(FavorableConditions {
            temp_max: Some(30.0),
            ..Default::default()
        });
        assert_eq!(weather_points(&cool, &after(WeatherCategory::Cold)), 1);
        assert_eq!(weather_points(&warm, &after(WeatherCategory::Cold)), 0);
    }

    #[test]
    fn test_dry() {
        let arid = thriving_in(FavorableConditions {
            humidity_min: Some(30.0),
            ..Default::default()
        });
        let arid_but_rain = thriving_in(FavorableConditions {
            humidity_min: Some(30.0),
            rainfall: true,
            ..Default::default()
        });
        let no_floor = thriving_in(FavorableConditions::default());

        assert_eq!(weather_points(&arid, &after(WeatherCategory::Dry)), 1);
        assert_eq!(weather_points(&arid_but_rain, &after(WeatherCategory::Dry)), 0);
        assert_eq!(weather_points(&no_floor, &after(WeatherCategory::Dry)), 0);
    }

    #[test]
    fn test_no_weather_reported() {
        let damp = thriving_in(FavorableConditions {
            humidity_min: Some(90.0),
            rainfall: true,
            ..Default::default()
        });
        assert_eq!(weather_points(&damp, &DiagnosisRequest::for_crop("Wheat")), 0);
    }
}
