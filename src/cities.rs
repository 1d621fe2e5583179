//! City dataset and the pool of routes arcs are drawn between

use crate::error::{GlobeError, Result};
use crate::geo::GeoPoint;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub long: f64,
}

impl City {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.long)
    }
}

static BUILTIN_CITIES: &[(&str, &str, f64, f64)] = &[
    // North America
    ("New York", "United States", 40.7, -74.0),
    ("Los Angeles", "United States", 34.1, -118.2),
    ("Chicago", "United States", 41.9, -87.6),
    ("Houston", "United States", 29.8, -95.4),
    ("Phoenix", "United States", 33.4, -112.1),
    ("San Francisco", "United States", 37.8, -122.4),
    ("Seattle", "United States", 47.6, -122.3),
    ("Miami", "United States", 25.8, -80.2),
    ("Anchorage", "United States", 61.2, -149.9),
    ("Honolulu", "United States", 21.3, -157.9),
    ("Toronto", "Canada", 43.7, -79.4),
    ("Montreal", "Canada", 45.5, -73.6),
    ("Vancouver", "Canada", 49.3, -123.1),
    ("Mexico City", "Mexico", 19.4, -99.1),
    ("Havana", "Cuba", 23.1, -82.4),
    ("Panama City", "Panama", 9.0, -79.5),
    // South America
    ("Sao Paulo", "Brazil", -23.5, -46.6),
    ("Rio de Janeiro", "Brazil", -22.9, -43.2),
    ("Buenos Aires", "Argentina", -34.6, -58.4),
    ("Santiago", "Chile", -33.4, -70.6),
    ("Lima", "Peru", -12.0, -77.0),
    ("Bogota", "Colombia", 4.7, -74.1),
    ("Caracas", "Venezuela", 10.5, -66.9),
    ("Quito", "Ecuador", -0.2, -78.5),
    // Europe
    ("London", "United Kingdom", 51.5, -0.1),
    ("Paris", "France", 48.9, 2.3),
    ("Berlin", "Germany", 52.5, 13.4),
    ("Rome", "Italy", 41.9, 12.5),
    ("Madrid", "Spain", 40.4, -3.7),
    ("Lisbon", "Portugal", 38.7, -9.1),
    ("Amsterdam", "Netherlands", 52.4, 4.9),
    ("Oslo", "Norway", 59.9, 10.8),
    ("Stockholm", "Sweden", 59.3, 18.1),
    ("Helsinki", "Finland", 60.2, 24.9),
    ("Reykjavik", "Iceland", 64.1, -21.9),
    ("Dublin", "Ireland", 53.3, -6.3),
    ("Moscow", "Russia", 55.8, 37.6),
    ("Prague", "Czechia", 50.1, 14.4),
    ("Vienna", "Austria", 48.2, 16.4),
    ("Warsaw", "Poland", 52.2, 21.0),
    ("Athens", "Greece", 38.0, 23.7),
    ("Istanbul", "Turkey", 41.0, 29.0),
    // Africa
    ("Cairo", "Egypt", 30.0, 31.2),
    ("Cape Town", "South Africa", -33.9, 18.4),
    ("Johannesburg", "South Africa", -26.2, 28.0),
    ("Nairobi", "Kenya", -1.3, 36.8),
    ("Lagos", "Nigeria", 6.5, 3.4),
    ("Accra", "Ghana", 5.6, -0.2),
    ("Dakar", "Senegal", 14.7, -17.5),
    ("Casablanca", "Morocco", 33.6, -7.6),
    ("Addis Ababa", "Ethiopia", 9.0, 38.7),
    ("Kinshasa", "DR Congo", -4.3, 15.3),
    ("Luanda", "Angola", -8.8, 13.2),
    ("Antananarivo", "Madagascar", -18.9, 47.5),
    // Asia
    ("Tokyo", "Japan", 35.7, 139.7),
    ("Osaka", "Japan", 34.7, 135.5),
    ("Shanghai", "China", 31.2, 121.5),
    ("Beijing", "China", 39.9, 116.4),
    ("Hong Kong", "China", 22.3, 114.2),
    ("Singapore", "Singapore", 1.4, 103.8),
    ("Seoul", "South Korea", 37.6, 127.0),
    ("Bangkok", "Thailand", 13.8, 100.5),
    ("Hanoi", "Vietnam", 21.0, 105.8),
    ("Kuala Lumpur", "Malaysia", 3.1, 101.7),
    ("Delhi", "India", 28.6, 77.2),
    ("Mumbai", "India", 19.1, 72.9),
    ("Bangalore", "India", 13.0, 77.6),
    ("Karachi", "Pakistan", 24.9, 67.0),
    ("Dhaka", "Bangladesh", 23.8, 90.4),
    ("Taipei", "Taiwan", 25.0, 121.5),
    ("Manila", "Philippines", 14.6, 121.0),
    ("Jakarta", "Indonesia", -6.2, 106.8),
    ("Dubai", "United Arab Emirates", 25.3, 55.3),
    ("Riyadh", "Saudi Arabia", 24.7, 46.7),
    ("Tehran", "Iran", 35.7, 51.4),
    ("Tel Aviv", "Israel", 32.1, 34.8),
    ("Almaty", "Kazakhstan", 43.2, 76.9),
    ("Novosibirsk", "Russia", 55.0, 82.9),
    ("Vladivostok", "Russia", 43.1, 131.9),
    // Oceania
    ("Sydney", "Australia", -33.9, 151.2),
    ("Melbourne", "Australia", -37.8, 145.0),
    ("Brisbane", "Australia", -27.5, 153.0),
    ("Perth", "Australia", -31.9, 115.9),
    ("Auckland", "New Zealand", -36.8, 174.8),
    ("Suva", "Fiji", -18.1, 178.4),
];

/// The cities compiled into the binary
pub fn builtin_cities() -> Vec<City> {
    BUILTIN_CITIES
        .iter()
        .map(|&(city, country, lat, long)| City {
            city: city.to_string(),
            country: country.to_string(),
            lat,
            long,
        })
        .collect()
}

/// Read a JSON array of `{city, country, lat, long}` records
pub fn load_cities(path: &Path) -> Result<Vec<City>> {
    let content = std::fs::read_to_string(path)?;
    let cities: Vec<City> = serde_json::from_str(&content).map_err(|source| GlobeError::CityData {
        path: path.to_path_buf(),
        source,
    })?;
    if cities.len() < 2 {
        return Err(GlobeError::NotEnoughCities(cities.len()));
    }
    Ok(cities)
}

/// A directed connection between two cities
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub start: City,
    pub end: City,
    pub label: String,
}

impl Route {
    pub fn new(start: City, end: City) -> Self {
        let label = format!(
            "{}, {} To {}, {}",
            start.city, start.country, end.city, end.country
        );
        Self { start, end, label }
    }
}

/// Pick `count` random routes with distinct endpoints.
///
/// Returns an empty pool when fewer than two cities are given.
pub fn random_routes<R: Rng>(cities: &[City], count: usize, rng: &mut R) -> Vec<Route> {
    if cities.len() < 2 {
        return Vec::new();
    }

    (0..count)
        .map(|_| {
            let start = rng.gen_range(0..cities.len());
            let mut end = rng.gen_range(0..cities.len());
            while end == start {
                end = rng.gen_range(0..cities.len());
            }
            Route::new(cities[start].clone(), cities[end].clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn builtin_cities_are_in_range() {
        let cities = builtin_cities();
        assert!(cities.len() >= 80);
        for c in &cities {
            assert!((-90.0..=90.0).contains(&c.lat), "{}", c.city);
            assert!((-180.0..=180.0).contains(&c.long), "{}", c.city);
        }
    }

    #[test]
    fn route_label_format() {
        let cities = builtin_cities();
        let route = Route::new(cities[0].clone(), cities[1].clone());
        assert_eq!(route.label, "New York, United States To Los Angeles, United States");
    }

    #[test]
    fn random_routes_never_loop_back() {
        let mut rng = StdRng::seed_from_u64(7);
        let routes = random_routes(&builtin_cities(), 150, &mut rng);
        assert_eq!(routes.len(), 150);
        assert!(routes.iter().all(|r| r.start != r.end));
    }

    #[test]
    fn random_routes_are_seeded() {
        let cities = builtin_cities();
        let a = random_routes(&cities, 20, &mut StdRng::seed_from_u64(42));
        let b = random_routes(&cities, 20, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn too_few_cities_gives_empty_pool() {
        let one = vec![builtin_cities().remove(0)];
        assert!(random_routes(&one, 10, &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn loads_json_dataset() {
        let path = std::env::temp_dir().join(format!("dotglobe-cities-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"city":"A","country":"X","lat":1.0,"long":2.0},
                {"city":"B","country":"Y","lat":-3.5,"long":170.0}]"#,
        )
        .unwrap();
        let cities = load_cities(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[1].point(), GeoPoint::new(-3.5, 170.0));
    }

    #[test]
    fn rejects_malformed_json() {
        let path = std::env::temp_dir().join(format!("dotglobe-bad-cities-{}.json", std::process::id()));
        std::fs::write(&path, "[{\"city\": 3}]").unwrap();
        let err = load_cities(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, GlobeError::CityData { .. }));
    }
}
