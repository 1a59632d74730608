use acervo::{Catalog, CatalogError, Config, Driver, EntityKind, NewBook, Params, Result};
use proptest::prelude::*;

fn memory_catalog() -> Catalog {
    Catalog::new(Driver::connect(&Config::memory()).expect("memory store connects"))
}

fn dune() -> NewBook {
    NewBook {
        title: "Dune".into(),
        author: "Frank Herbert".into(),
        genres: Catalog::split_genres("Sci-Fi, Adventure"),
        publisher: Some("Ace Books".into()),
        year: Some(1965),
        pages: Some(412),
    }
}

fn all_counts(catalog: &Catalog) -> [u64; 4] {
    EntityKind::all().map(|kind| catalog.count(kind))
}

#[test]
fn add_book_creates_all_entities_and_relationships() -> Result<()> {
    let catalog = memory_catalog();
    let receipt = catalog.add_book(&dune())?;
    assert_eq!(receipt.title, "Dune");
    assert_eq!(receipt.summary.nodes_created, 5);
    assert_eq!(receipt.summary.relationships_created, 4);
    assert_eq!(all_counts(&catalog), [1, 1, 2, 1]);
    Ok(())
}

#[test]
fn add_book_twice_is_idempotent() -> Result<()> {
    let catalog = memory_catalog();
    catalog.add_book(&dune())?;
    let before = all_counts(&catalog);
    let repeat = catalog.add_book(&dune())?;
    assert_eq!(all_counts(&catalog), before);
    assert_eq!(repeat.summary.nodes_created, 0);
    assert_eq!(repeat.summary.relationships_created, 0);
    // Re-supplying the same attributes rewrites them in place.
    assert_eq!(repeat.summary.properties_set, 2);
    Ok(())
}

#[test]
fn dune_shows_up_complete_in_the_dump() -> Result<()> {
    let catalog = memory_catalog();
    catalog.add_book(&dune())?;
    let dump = catalog.dump()?;
    assert_eq!(dump.total_books, 1);
    let entry = &dump.books[0];
    assert_eq!(entry.title, "Dune");
    assert_eq!(entry.authors, vec!["Frank Herbert".to_owned()]);
    assert!(entry.genres.contains(&"Sci-Fi".to_owned()));
    assert!(entry.genres.contains(&"Adventure".to_owned()));
    assert_eq!(entry.publishers, vec!["Ace Books".to_owned()]);
    assert_eq!(entry.year, Some(1965));
    assert_eq!(entry.pages, Some(412));
    Ok(())
}

#[test]
fn validation_failures_never_touch_the_store() {
    let catalog = memory_catalog();
    let cases = [
        NewBook {
            title: "  ".into(),
            ..dune()
        },
        NewBook {
            author: String::new(),
            ..dune()
        },
        NewBook {
            genres: vec![" ".into(), String::new()],
            ..dune()
        },
    ];
    for case in cases {
        let err = catalog.add_book(&case).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)), "got {err}");
    }
    assert_eq!(all_counts(&catalog), [0, 0, 0, 0]);
}

#[test]
fn absent_attributes_do_not_clobber_stored_ones() -> Result<()> {
    let catalog = memory_catalog();
    catalog.add_book(&dune())?;
    // Same book, no year/pages supplied.
    catalog.add_book(&NewBook {
        year: None,
        pages: None,
        publisher: None,
        ..dune()
    })?;
    let entry = &catalog.dump()?.books[0];
    assert_eq!(entry.year, Some(1965));
    assert_eq!(entry.pages, Some(412));
    assert_eq!(entry.publishers, vec!["Ace Books".to_owned()]);
    Ok(())
}

#[test]
fn supplied_attributes_overwrite_stored_ones() -> Result<()> {
    let catalog = memory_catalog();
    catalog.add_book(&dune())?;
    catalog.add_book(&NewBook {
        pages: Some(896),
        ..dune()
    })?;
    assert_eq!(catalog.dump()?.books[0].pages, Some(896));
    Ok(())
}

#[test]
fn genre_duplicates_and_padding_are_tolerated() -> Result<()> {
    let catalog = memory_catalog();
    catalog.add_book(&NewBook {
        genres: vec![" Sci-Fi ".into(), "Sci-Fi".into(), String::new()],
        ..dune()
    })?;
    assert_eq!(catalog.count(EntityKind::Genre), 1);
    Ok(())
}

#[test]
fn a_failing_step_rolls_the_whole_transaction_back() {
    let catalog = memory_catalog();
    // Mirror the upsert's first steps, then fail before completion.
    let err = catalog
        .driver()
        .with_transaction(|tx| {
            let mut params = Params::new();
            params.insert("author".into(), "Frank Herbert".into());
            params.insert("title".into(), "Dune".into());
            tx.run(
                &acervo::query::parser::parse("MERGE (a:Author {name: $author})")?,
                &params,
            )?;
            tx.run(
                &acervo::query::parser::parse("MERGE (b:Book {title: $title})")?,
                &params,
            )?;
            // Step 4 fails: malformed relationship merge.
            tx.run(
                &acervo::query::parser::parse("MERGE (a)-[:WROTE]->(missing)")?,
                &params,
            )?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, CatalogError::TransactionAborted { .. }));
    assert_eq!(all_counts(&catalog), [0, 0, 0, 0]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Upserting any valid book twice leaves the same graph as upserting it
    /// once.
    #[test]
    fn upsert_idempotence_holds_for_arbitrary_inputs(
        title in "[a-zA-Z0-9 ]{1,24}",
        author in "[a-zA-Z ]{1,24}",
        genres in proptest::collection::vec("[a-zA-Z]{1,12}", 1..4),
        year in proptest::option::of(1450i64..2030),
        pages in proptest::option::of(1i64..3000),
    ) {
        prop_assume!(!title.trim().is_empty());
        prop_assume!(!author.trim().is_empty());

        let catalog = memory_catalog();
        let book = NewBook { title, author, genres, publisher: None, year, pages };
        catalog.add_book(&book).expect("first upsert succeeds");
        let before = all_counts(&catalog);
        let repeat = catalog.add_book(&book).expect("second upsert succeeds");
        prop_assert_eq!(all_counts(&catalog), before);
        prop_assert_eq!(repeat.summary.nodes_created, 0);
        prop_assert_eq!(repeat.summary.relationships_created, 0);
    }
}
