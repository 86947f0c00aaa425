use beacon::{
    error::{config::ConfigError, Error},
    startup,
};

/// Expect an invalid environment value to be reported through the crate error type
#[test]
fn rejects_zero_concurrent_fetches() {
    std::env::set_var("BEACON_DATA_DIR", std::env::temp_dir());
    std::env::set_var("BEACON_MAX_CONCURRENT_FETCHES", "0");

    let result = startup::load_config();

    std::env::remove_var("BEACON_MAX_CONCURRENT_FETCHES");

    assert!(matches!(
        result,
        Err(Error::ConfigError(ConfigError::InvalidEnvValue { ref var, .. }))
            if var == "BEACON_MAX_CONCURRENT_FETCHES"
    ));
}
