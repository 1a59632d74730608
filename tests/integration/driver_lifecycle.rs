use std::sync::Arc;
use std::thread;

use acervo::{
    Catalog, CatalogError, Config, Driver, EntityKind, NewBook, Params, Result,
};

#[test]
fn connect_verify_and_session_roundtrip() -> Result<()> {
    let driver = Driver::connect(&Config::memory())?;
    driver.verify_connectivity()?;
    driver.with_session(|session| {
        let stmt = acervo::query::parser::parse("MATCH (n) RETURN count(*) AS total")?;
        let outcome = session.run(&stmt, &Params::new())?;
        assert!(outcome.has_rows());
        Ok(())
    })
}

#[test]
fn degraded_driver_short_circuits_every_operation() {
    let driver = Driver::degraded("no store configured");
    assert!(driver.is_degraded());
    assert!(matches!(
        driver.verify_connectivity().unwrap_err(),
        CatalogError::Unavailable(_)
    ));
    assert!(matches!(
        driver.session().unwrap_err(),
        CatalogError::Unavailable(_)
    ));
    let err = driver
        .with_transaction(|_tx| Ok(()))
        .unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
}

#[test]
fn sessions_are_released_on_error_paths_too() -> Result<()> {
    let config = Config {
        max_sessions: 1,
        ..Config::memory()
    };
    let driver = Driver::connect(&config)?;
    let failed: Result<()> = driver.with_session(|_session| {
        Err(CatalogError::Validation("caller mistake".into()))
    });
    assert!(failed.is_err());
    // The slot is free again.
    driver.with_session(|_session| Ok(()))
}

#[test]
fn concurrent_upserts_of_the_same_author_yield_one_node() {
    let catalog = Arc::new(Catalog::new(
        Driver::connect(&Config::memory()).expect("memory store connects"),
    ));
    let mut handles = Vec::new();
    for i in 0..8 {
        let catalog = Arc::clone(&catalog);
        handles.push(thread::spawn(move || {
            catalog
                .add_book(&NewBook {
                    title: format!("Book {i}"),
                    author: "Shared Author".into(),
                    genres: vec!["Fantasy".into()],
                    ..NewBook::default()
                })
                .expect("concurrent upsert succeeds");
        }));
    }
    for handle in handles {
        handle.join().expect("thread completes");
    }
    assert_eq!(catalog.count(EntityKind::Author), 1);
    assert_eq!(catalog.count(EntityKind::Book), 8);
    assert_eq!(catalog.count(EntityKind::Genre), 1);
}

#[test]
fn readers_see_either_all_or_none_of_a_transaction() -> Result<()> {
    let driver = Driver::connect(&Config::memory())?;
    let err = driver
        .with_transaction(|tx| {
            let mut params = Params::new();
            params.insert("name".into(), "Half Done".into());
            tx.run(
                &acervo::query::parser::parse("MERGE (a:Author {name: $name})")?,
                &params,
            )?;
            Err::<(), _>(CatalogError::Execution("simulated store failure".into()))
        })
        .unwrap_err();
    assert!(matches!(err, CatalogError::TransactionAborted { .. }));

    driver.with_session(|session| {
        let stmt = acervo::query::parser::parse("MATCH (a:Author) RETURN count(a) AS total")?;
        let outcome = session.run(&stmt, &Params::new())?;
        assert_eq!(
            outcome.rows().expect("rows")[0][0].1,
            acervo::Value::Int(0)
        );
        Ok(())
    })
}

#[test]
fn session_cap_applies_across_concurrent_holders() -> Result<()> {
    let config = Config {
        max_sessions: 4,
        ..Config::memory()
    };
    let driver = Driver::connect(&config)?;
    let s1 = driver.session()?;
    let s2 = driver.session()?;
    let s3 = driver.session()?;
    let s4 = driver.session()?;
    assert!(driver.session().is_err());
    drop((s1, s2, s3, s4));
    assert!(driver.session().is_ok());
    Ok(())
}
