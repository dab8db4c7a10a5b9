//! Great-circle distance between coordinates

/// Mean Earth radius in miles
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Haversine distance in whole miles (rounded to nearest)
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> u32 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_MILES * c).round() as u32
}
