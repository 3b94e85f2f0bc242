//! Great-circle distance between GPS coordinates.

/// Calculate the distance in meters between two GPS points (Haversine formula).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS: f64 = 6_371_000.0; // meters

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let d = haversine_distance(60.1699, 24.9384, 60.1699, 24.9384);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn one_degree_latitude_is_about_111_km() {
        let d = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn short_hop_matches_surveyed_distance() {
        // Two points ~100 m apart along a meridian
        let d = haversine_distance(51.5000, -0.1200, 51.5009, -0.1200);
        assert!((d - 100.0).abs() < 1.0);
    }
}
