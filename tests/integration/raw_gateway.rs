use acervo::{Catalog, CatalogError, Config, Driver, ErrorCategory, Params, QueryOutcome, Result};

fn catalog() -> Catalog {
    Catalog::new(Driver::connect(&Config::memory()).expect("memory store connects"))
}

#[test]
fn blank_query_is_rejected_before_parsing() {
    let catalog = catalog();
    for text in ["", "   ", "\n\t"] {
        let err = catalog.run_raw(text, &Params::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)), "got {err}");
    }
}

#[test]
fn write_statements_yield_a_summary_payload() -> Result<()> {
    let catalog = catalog();
    let mut params = Params::new();
    params.insert("name".into(), "Frank Herbert".into());
    let outcome = catalog.run_raw("MERGE (a:Author {name: $name})", &params)?;
    assert!(!outcome.has_rows());
    match &outcome {
        QueryOutcome::Summary(summary) => {
            assert_eq!(summary.nodes_created, 1);
        }
        QueryOutcome::Rows(_) => panic!("expected a summary"),
    }
    // Serialized shape: a single-element array holding the counters.
    let payload = outcome.to_payload();
    assert_eq!(payload[0]["summary"]["nodes_created"], 1);
    Ok(())
}

#[test]
fn read_statements_yield_rows() -> Result<()> {
    let catalog = catalog();
    let mut params = Params::new();
    params.insert("name".into(), "Frank Herbert".into());
    catalog.run_raw("MERGE (a:Author {name: $name})", &params)?;

    let outcome = catalog.run_raw("MATCH (a:Author) RETURN a.name AS name", &Params::new())?;
    assert!(outcome.has_rows());
    let rows = outcome.rows().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0].0, "name");
    let payload = outcome.to_payload();
    assert_eq!(payload, serde_json::json!([{ "name": "Frank Herbert" }]));
    Ok(())
}

#[test]
fn repeated_merge_reports_an_empty_summary() -> Result<()> {
    let catalog = catalog();
    let mut params = Params::new();
    params.insert("name".into(), "Frank Herbert".into());
    catalog.run_raw("MERGE (a:Author {name: $name})", &params)?;
    let outcome = catalog.run_raw("MERGE (a:Author {name: $name})", &params)?;
    match outcome {
        QueryOutcome::Summary(summary) => assert!(summary.is_empty()),
        QueryOutcome::Rows(_) => panic!("expected a summary"),
    }
    Ok(())
}

#[test]
fn parse_failures_surface_as_execution_category() {
    let catalog = catalog();
    let err = catalog
        .run_raw("FROBNICATE EVERYTHING", &Params::new())
        .unwrap_err();
    assert!(matches!(err, CatalogError::Syntax(_)));
    assert_eq!(err.category(), ErrorCategory::Execution);
}

#[test]
fn missing_parameters_fail_the_statement() {
    let catalog = catalog();
    let err = catalog
        .run_raw("MATCH (a:Author {name: $name}) RETURN a", &Params::new())
        .unwrap_err();
    assert!(err.to_string().contains("$name"));
}

#[test]
fn full_wipe_through_the_gateway() -> Result<()> {
    let catalog = catalog();
    let mut params = Params::new();
    params.insert("name".into(), "Frank Herbert".into());
    catalog.run_raw("MERGE (a:Author {name: $name})", &params)?;

    let outcome = catalog.run_raw("MATCH (n) DETACH DELETE n", &Params::new())?;
    match outcome {
        QueryOutcome::Summary(summary) => assert_eq!(summary.nodes_deleted, 1),
        QueryOutcome::Rows(_) => panic!("expected a summary"),
    }
    let check = catalog.run_raw("MATCH (n) RETURN count(*) AS total", &Params::new())?;
    assert_eq!(check.rows().expect("rows")[0][0].1, acervo::Value::Int(0));
    Ok(())
}

#[test]
fn degraded_driver_rejects_raw_statements() {
    let catalog = Catalog::new(Driver::degraded("store offline"));
    let err = catalog
        .run_raw("MATCH (n) RETURN n", &Params::new())
        .unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
}
