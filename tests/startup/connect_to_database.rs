use beacon::{
    config::{Config, ProviderConfig},
    error::Error,
    startup,
};

fn config(data_dir: std::path::PathBuf, test_mode: bool) -> Config {
    Config {
        data_dir,
        test_mode,
        provider: ProviderConfig::default(),
    }
}

/// Expect the data directory and the mode's database file to be created and migrated
#[tokio::test]
async fn creates_and_migrates_database() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let config = config(dir.path().join("nested").join("beacon"), true);

    let store = startup::connect_to_database(&config).await?;

    assert!(config.data_dir.join("starsystems-test.sqlite").exists());
    assert!(!config.data_dir.join("starsystems.sqlite").exists());
    assert_eq!(store.schema_version().await?, migration::SCHEMA_VERSION);

    Ok(())
}

/// Expect reopening an existing database to keep its rows
#[tokio::test]
async fn reopens_existing_database() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let config = config(dir.path().to_path_buf(), false);

    let store = startup::connect_to_database(&config).await?;
    let record = crate::util::star_system(10477373803, "Sol");
    let summary = store.save(&[record]).await;
    drop(store);

    let reopened = startup::connect_to_database(&config).await?;

    assert_eq!(summary.inserted, 1);
    assert_eq!(reopened.find_by_addresses(&[10477373803]).await.len(), 1);

    Ok(())
}

/// Expect a data directory that cannot be created to surface as a filesystem error
#[tokio::test]
async fn unusable_data_dir_is_an_io_error() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory")?;

    let result = startup::connect_to_database(&config(blocker.join("beacon"), false)).await;

    assert!(matches!(result, Err(Error::Io(_))));

    Ok(())
}
