use acervo::{Catalog, CatalogError, Config, Driver, EntityKind, NewBook, Params, Result};

fn seeded_catalog() -> Catalog {
    let catalog = Catalog::new(Driver::connect(&Config::memory()).expect("memory store connects"));
    let books = [
        ("The Hobbit", "J.R.R. Tolkien", "Fantasy, Adventure", Some(("Allen & Unwin", 1937, 310))),
        ("The Fellowship of the Ring", "J.R.R. Tolkien", "Fantasy", Some(("Allen & Unwin", 1954, 423))),
        ("A Wizard of Earthsea", "Ursula K. Le Guin", "Fantasy", None),
        ("Dune", "Frank Herbert", "Sci-Fi, Adventure", Some(("Ace Books", 1965, 412))),
    ];
    for (title, author, genres, detail) in books {
        let (publisher, year, pages) = match detail {
            Some((p, y, pg)) => (Some(p.to_owned()), Some(y), Some(pg)),
            None => (None, None, None),
        };
        catalog
            .add_book(&NewBook {
                title: title.into(),
                author: author.into(),
                genres: Catalog::split_genres(genres),
                publisher,
                year,
                pages,
            })
            .expect("seed book upserts");
    }
    catalog
}

#[test]
fn genre_matching_is_a_case_insensitive_substring() -> Result<()> {
    let catalog = seeded_catalog();
    let lower = catalog.recommend("fantasy", None)?;
    let upper = catalog.recommend("FANTASY", None)?;
    let partial = catalog.recommend("fanta", None)?;
    assert_eq!(lower, upper);
    assert_eq!(lower, partial);
    assert_eq!(lower.len(), 3);
    Ok(())
}

#[test]
fn author_sentinel_means_any_author() -> Result<()> {
    let catalog = seeded_catalog();
    let any = catalog.recommend("Fantasy", Some("any"))?;
    let blank = catalog.recommend("Fantasy", Some("  "))?;
    let localized = catalog.recommend("Fantasy", Some("Qualquer"))?;
    let none = catalog.recommend("Fantasy", None)?;
    assert_eq!(any, none);
    assert_eq!(blank, none);
    assert_eq!(localized, none);

    let tolkien = catalog.recommend("Fantasy", Some("tolkien"))?;
    assert_eq!(tolkien.len(), 2);
    assert!(tolkien.iter().all(|r| r.author == "J.R.R. Tolkien"));
    Ok(())
}

#[test]
fn authorless_books_report_unknown_and_missing_attributes_na() -> Result<()> {
    let catalog = seeded_catalog();
    // A book merged through the raw gateway, with no author and no year.
    let mut params = Params::new();
    params.insert("title".into(), "Beowulf".into());
    params.insert("genre".into(), "Epic".into());
    catalog.run_raw(
        "MERGE (b:Book {title: $title}) MERGE (g:Genre {name: $genre}) \
         MERGE (b)-[:HAS_GENRE]->(g)",
        &params,
    )?;

    let recs = catalog.recommend("Epic", None)?;
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].title, "Beowulf");
    assert_eq!(recs[0].author, "Unknown");
    assert_eq!(recs[0].year, "N/A");
    assert_eq!(recs[0].pages, "N/A");

    // With an author restriction the authorless book disappears.
    assert!(catalog.recommend("Epic", Some("Tolkien"))?.is_empty());
    Ok(())
}

#[test]
fn recommendations_are_capped_at_ten() -> Result<()> {
    let catalog = Catalog::new(Driver::connect(&Config::memory())?);
    for i in 0..15 {
        catalog.add_book(&NewBook {
            title: format!("Book {i:02}"),
            author: "Prolific Author".into(),
            genres: vec!["Fantasy".into()],
            ..NewBook::default()
        })?;
    }
    assert_eq!(catalog.recommend("fantasy", None)?.len(), 10);
    Ok(())
}

#[test]
fn missing_genre_is_a_validation_error() {
    let catalog = seeded_catalog();
    let err = catalog.recommend("   ", None).unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
}

#[test]
fn dump_is_ordered_by_title_and_deduplicated() -> Result<()> {
    let catalog = seeded_catalog();
    let dump = catalog.dump()?;
    assert_eq!(dump.total_books, 4);
    let titles: Vec<&str> = dump.books.iter().map(|b| b.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);

    let hobbit = dump
        .books
        .iter()
        .find(|b| b.title == "The Hobbit")
        .expect("hobbit present");
    assert_eq!(hobbit.authors, vec!["J.R.R. Tolkien".to_owned()]);
    assert_eq!(hobbit.genres.len(), 2);
    assert_eq!(hobbit.publishers, vec!["Allen & Unwin".to_owned()]);

    // No publisher: an empty list, never a null entry.
    let earthsea = dump
        .books
        .iter()
        .find(|b| b.title == "A Wizard of Earthsea")
        .expect("earthsea present");
    assert!(earthsea.publishers.is_empty());
    assert_eq!(earthsea.year, None);
    Ok(())
}

#[test]
fn name_listings_are_distinct_and_ascending() -> Result<()> {
    let catalog = seeded_catalog();
    let genres = catalog.genres()?;
    assert_eq!(genres, vec!["Adventure", "Fantasy", "Sci-Fi"]);
    let authors = catalog.authors()?;
    assert_eq!(
        authors,
        vec!["Frank Herbert", "J.R.R. Tolkien", "Ursula K. Le Guin"]
    );
    Ok(())
}

#[test]
fn counts_track_each_label() {
    let catalog = seeded_catalog();
    assert_eq!(catalog.count(EntityKind::Book), 4);
    assert_eq!(catalog.count(EntityKind::Author), 3);
    assert_eq!(catalog.count(EntityKind::Genre), 3);
    assert_eq!(catalog.count(EntityKind::Publisher), 2);
}

#[test]
fn top_rankings_order_by_relationship_count() -> Result<()> {
    let catalog = seeded_catalog();
    let authors = catalog.top_authors(3)?;
    assert_eq!(authors[0].author, "J.R.R. Tolkien");
    assert_eq!(authors[0].book_count, 2);
    assert_eq!(authors.len(), 3);

    let genres = catalog.top_genres(2)?;
    assert_eq!(genres.len(), 2);
    assert_eq!(genres[0].genre, "Fantasy");
    assert_eq!(genres[0].book_count, 3);
    Ok(())
}

#[test]
fn clear_wipes_every_label() -> Result<()> {
    let catalog = seeded_catalog();
    let summary = catalog.clear()?;
    assert_eq!(summary.nodes_deleted, 12);
    for kind in EntityKind::all() {
        assert_eq!(catalog.count(kind), 0);
    }
    // Clearing an empty store is a quiet no-op.
    assert_eq!(catalog.clear()?.nodes_deleted, 0);
    Ok(())
}

#[test]
fn count_on_a_degraded_store_is_zero_but_reads_fail() {
    let catalog = Catalog::new(Driver::degraded("store offline"));
    for kind in EntityKind::all() {
        assert_eq!(catalog.count(kind), 0);
    }
    let err = catalog.recommend("Fantasy", None).unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
    let err = catalog.dump().unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
}
