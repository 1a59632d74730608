use std::fs;

use acervo::{Catalog, CatalogError, Config, Driver, NewBook, Result};

fn dune() -> NewBook {
    NewBook {
        title: "Dune".into(),
        author: "Frank Herbert".into(),
        genres: vec!["Sci-Fi".into()],
        publisher: Some("Ace Books".into()),
        year: Some(1965),
        pages: Some(412),
    }
}

#[test]
fn committed_writes_survive_a_reconnect() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::file(dir.path().join("catalog.json"));

    {
        let catalog = Catalog::new(Driver::connect(&config)?);
        catalog.add_book(&dune())?;
    }

    let catalog = Catalog::new(Driver::connect(&config)?);
    let dump = catalog.dump()?;
    assert_eq!(dump.total_books, 1);
    assert_eq!(dump.books[0].title, "Dune");
    assert_eq!(dump.books[0].year, Some(1965));
    Ok(())
}

#[test]
fn rolled_back_transactions_leave_no_trace_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::file(dir.path().join("catalog.json"));

    {
        let catalog = Catalog::new(Driver::connect(&config)?);
        catalog.add_book(&dune())?;
        let aborted = catalog.add_book(&NewBook {
            title: String::new(),
            ..dune()
        });
        assert!(aborted.is_err());
    }

    let catalog = Catalog::new(Driver::connect(&config)?);
    assert_eq!(catalog.dump()?.total_books, 1);
    Ok(())
}

#[test]
fn clear_persists_across_reconnects() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = Config::file(dir.path().join("catalog.json"));

    {
        let catalog = Catalog::new(Driver::connect(&config)?);
        catalog.add_book(&dune())?;
        catalog.clear()?;
    }

    let catalog = Catalog::new(Driver::connect(&config)?);
    assert_eq!(catalog.dump()?.total_books, 0);
    Ok(())
}

#[test]
fn fresh_file_uri_starts_empty() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let catalog = Catalog::new(Driver::connect(&Config::file(
        dir.path().join("brand-new.json"),
    ))?);
    assert_eq!(catalog.dump()?.total_books, 0);
    Ok(())
}

#[test]
fn corrupt_snapshot_is_a_connection_error() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.json");
    fs::write(&path, b"{ definitely not a snapshot")?;
    let err = Driver::connect(&Config::file(&path)).unwrap_err();
    assert!(matches!(err, CatalogError::Connection(_)));

    // The lenient path degrades instead of failing the process.
    let driver = Driver::connect_or_degraded(&Config::file(&path));
    assert!(driver.is_degraded());
    Ok(())
}

#[test]
fn failed_snapshot_write_aborts_and_rolls_back() -> Result<()> {
    let dir = tempfile::tempdir()?;
    // A plain file sits where the snapshot directory should be, so the
    // commit-time write fails.
    fs::write(dir.path().join("blocked"), b"")?;
    let config = Config::file(dir.path().join("blocked").join("catalog.json"));
    let catalog = Catalog::new(Driver::connect(&config)?);

    let err = catalog.add_book(&dune()).unwrap_err();
    assert!(matches!(err, CatalogError::TransactionAborted { .. }));
    // The in-memory store was restored along the way.
    assert_eq!(catalog.dump()?.total_books, 0);
    Ok(())
}

#[test]
fn snapshot_file_is_written_only_on_commit() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("catalog.json");
    let catalog = Catalog::new(Driver::connect(&Config::file(&path))?);

    // Reads never create the file.
    catalog.dump()?;
    assert!(!path.exists());

    catalog.add_book(&dune())?;
    assert!(path.exists());
    Ok(())
}
