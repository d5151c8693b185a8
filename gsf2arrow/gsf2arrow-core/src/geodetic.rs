//! Beam footprint positions from along/across-track offsets.

/// Per-beam geographic positions in degrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LonLat {
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
}

impl LonLat {
    pub fn len(&self) -> usize {
        self.longitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longitude.is_empty()
    }

    /// `n` beams at the null position (181°, 91°).
    pub fn nulls(n: usize) -> Self {
        Self {
            longitude: vec![crate::sentinel::NULL_LONGITUDE; n],
            latitude: vec![crate::sentinel::NULL_LATITUDE; n],
        }
    }

    pub fn extend_null(&mut self, n: usize) {
        self.longitude
            .extend(std::iter::repeat_n(crate::sentinel::NULL_LONGITUDE, n));
        self.latitude
            .extend(std::iter::repeat_n(crate::sentinel::NULL_LATITUDE, n));
    }

    pub fn append(&mut self, other: LonLat) {
        self.longitude.extend(other.longitude);
        self.latitude.extend(other.latitude);
    }
}

/// Metres per degree of latitude at `latitude_rad`.
pub fn metres_per_degree_latitude(latitude_rad: f64) -> f64 {
    111_132.92 - 559.82 * (2.0 * latitude_rad).cos() + 1.175 * (4.0 * latitude_rad).cos()
        - 0.0023 * (6.0 * latitude_rad).cos()
}

/// Metres per degree of longitude at `latitude_rad`.
pub fn metres_per_degree_longitude(latitude_rad: f64) -> f64 {
    111_412.84 * latitude_rad.cos() - 93.5 * (3.0 * latitude_rad).cos()
        + 0.118 * (5.0 * latitude_rad).cos()
}

/// Projects beam offsets (metres) from the ping position onto longitude/latitude.
///
/// Beams beyond the shorter of `across` and `along` are not produced, so callers
/// pass arrays of the ping's beam count. Positions near the poles degenerate
/// because the longitude scale tends to zero.
pub fn project_beams(
    longitude: f64,
    latitude: f64,
    heading: f64,
    across: &[f64],
    along: &[f64],
) -> LonLat {
    let lat_rad = latitude.to_radians();
    let (sin_h, cos_h) = heading.to_radians().sin_cos();
    let lat_scale = metres_per_degree_latitude(lat_rad);
    let lon_scale = metres_per_degree_longitude(lat_rad);

    let (lons, lats) = across
        .iter()
        .zip(along)
        .map(|(&x, &y)| {
            (
                longitude + (cos_h / lon_scale) * x + (sin_h / lon_scale) * y,
                latitude - (sin_h / lat_scale) * x + (cos_h / lat_scale) * y,
            )
        })
        .unzip();

    LonLat {
        longitude: lons,
        latitude: lats,
    }
}
