//! Czech regional cities the forecast can be shown for.

use crate::{error::CityError, model::Coordinate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct City {
    pub name: &'static str,
    pub coordinate: Coordinate,
}

const fn city(name: &'static str, latitude: f64, longitude: f64) -> City {
    City { name, coordinate: Coordinate::new(latitude, longitude) }
}

pub static CITIES: &[City] = &[
    city("Praha", 50.0755, 14.4378),
    city("Brno", 49.1951, 16.6068),
    city("Ostrava", 49.8209, 18.2625),
    city("Plzeň", 49.7384, 13.3736),
    city("Liberec", 50.7663, 15.0543),
    city("Olomouc", 49.5938, 17.2509),
    city("České Budějovice", 48.9747, 14.4744),
    city("Hradec Králové", 50.2099, 15.8328),
    city("Ústí nad Labem", 50.6607, 14.0328),
    city("Pardubice", 50.0343, 15.7812),
    city("Zlín", 49.2248, 17.6627),
    city("Jihlava", 49.3961, 15.5903),
    city("Karlovy Vary", 50.2304, 12.8716),
];

pub fn first() -> &'static City {
    &CITIES[0]
}

/// Look a city up by name, ignoring case and Czech diacritics.
pub fn find(name: &str) -> Result<&'static City, CityError> {
    let wanted = fold(name);
    CITIES
        .iter()
        .find(|c| fold(c.name) == wanted)
        .ok_or_else(|| CityError::Unknown(name.to_string()))
}

fn fold(s: &str) -> String {
    s.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' => 'a',
            'č' => 'c',
            'ď' => 'd',
            'é' | 'ě' => 'e',
            'í' => 'i',
            'ň' => 'n',
            'ó' => 'o',
            'ř' => 'r',
            'š' => 's',
            'ť' => 't',
            'ú' | 'ů' => 'u',
            'ý' => 'y',
            'ž' => 'z',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_all_regional_cities() {
        assert_eq!(CITIES.len(), 13);
        assert_eq!(first().name, "Praha");
        assert!(CITIES.iter().all(|c| c.coordinate.is_finite()));
    }

    #[test]
    fn find_ignores_case_and_diacritics() {
        assert_eq!(find("plzen").map(|c| c.name).ok(), Some("Plzeň"));
        assert_eq!(find("CESKE BUDEJOVICE").map(|c| c.name).ok(), Some("České Budějovice"));
        assert_eq!(find("  Ústí nad Labem ").map(|c| c.name).ok(), Some("Ústí nad Labem"));
    }

    #[test]
    fn find_returns_coordinates() {
        let brno = find("Brno").expect("Brno is listed");
        assert_eq!(brno.coordinate, Coordinate::new(49.1951, 16.6068));
    }

    #[test]
    fn unknown_city_error() {
        let err = find("Bratislava").unwrap_err();
        assert!(err.to_string().contains("Unknown city 'Bratislava'"));
    }
}
