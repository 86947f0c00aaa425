pub mod fetcher;

use beacon::model::StarSystem;

/// Complete star system record with coordinates.
pub fn star_system(system_address: u64, name: &str) -> StarSystem {
    StarSystem {
        system_address,
        name: name.to_string(),
        x: Some(-9530.5),
        y: Some(-910.28125),
        z: Some(19808.125),
        ..Default::default()
    }
}
