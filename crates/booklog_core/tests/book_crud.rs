use booklog_core::db::migrations::latest_version;
use booklog_core::db::open_db_in_memory;
use booklog_core::{
    BookField, BookRepository, Condition, FieldSelection, FieldValue, NewBook, RepoError,
    SearchHits, SearchMode, SqliteBookRepository,
};
use rusqlite::types::Value;
use rusqlite::Connection;

fn dune() -> NewBook {
    NewBook::new("Dune", "Frank", "Herbert", 412, "SciFi")
        .with_owned(true)
        .with_tags("classic")
}

fn emma() -> NewBook {
    NewBook::new("Emma", "Jane", "Austen", 474, "Novel")
}

#[test]
fn add_then_get_last_returns_inserted_values() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let book = dune();
    let id = repo.add_book(&book).unwrap();

    let row = repo.get_last(&FieldSelection::all()).unwrap().unwrap();
    let loaded = row.to_book().unwrap();
    assert_eq!(loaded.book_pk, id);
    assert_eq!(loaded.to_new_book(), book);
}

#[test]
fn get_last_projects_requested_field() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.add_book(&dune()).unwrap();

    let row = repo
        .get_last(&FieldSelection::parse("title").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(row.len(), 1);
    assert_eq!(
        row.get(BookField::Title),
        Some(&FieldValue::Text("Dune".to_string()))
    );
}

#[test]
fn get_last_on_empty_table_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    assert!(repo.get_last(&FieldSelection::all()).unwrap().is_none());
    assert_eq!(repo.last_id().unwrap(), None);
}

#[test]
fn get_last_falls_back_to_max_key_after_other_statements() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let first = repo.add_book(&dune()).unwrap();
    let second = repo.add_book(&emma()).unwrap();
    assert!(repo.is_in_database("Dune", "Frank", "Herbert").unwrap());
    assert_eq!(repo.last_id().unwrap(), Some(second));

    repo.remove_by_id(second).unwrap();
    let row = repo.get_last(&FieldSelection::all()).unwrap().unwrap();
    assert_eq!(row.book_id(), Some(first));
}

#[test]
fn get_last_sees_inserts_from_other_repositories() {
    let conn = open_db_in_memory().unwrap();
    let writer = SqliteBookRepository::try_new(&conn).unwrap();
    let reader = SqliteBookRepository::try_new(&conn).unwrap();

    writer.add_book(&dune()).unwrap();
    let id = writer.add_book(&emma()).unwrap();

    assert_eq!(reader.last_id().unwrap(), Some(id));
}

#[test]
fn add_does_not_deduplicate() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let first = repo.add_book(&dune()).unwrap();
    let second = repo.add_book(&dune()).unwrap();
    assert_ne!(first, second);

    let hits = repo
        .search_general(
            &Condition::where_title_author("Dune", "Frank", "Herbert"),
            &FieldSelection::single(BookField::BookPk),
            SearchMode::All,
        )
        .unwrap()
        .unwrap();
    assert_eq!(hits.into_rows().len(), 2);
}

#[test]
fn remove_by_id_on_missing_key_deletes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.add_book(&dune()).unwrap();

    assert_eq!(repo.remove_by_id(id + 100).unwrap(), 0);
    assert!(repo.search_by_id(id, &FieldSelection::all()).unwrap().is_some());

    assert_eq!(repo.remove_by_id(id).unwrap(), 1);
    assert!(repo.search_by_id(id, &FieldSelection::all()).unwrap().is_none());
}

#[test]
fn remove_by_title_author_deletes_every_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.add_book(&dune()).unwrap();
    repo.add_book(&dune()).unwrap();
    repo.add_book(&emma()).unwrap();

    assert_eq!(
        repo.remove_by_title_author("Dune", "Frank", "Herbert")
            .unwrap(),
        2
    );
    assert!(!repo.is_in_database("Dune", "Frank", "Herbert").unwrap());
    assert!(repo.is_in_database("Emma", "Jane", "Austen").unwrap());
}

#[test]
fn dune_example_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.add_book(&dune()).unwrap();

    let title = repo
        .get_last(&FieldSelection::single(BookField::Title))
        .unwrap()
        .unwrap();
    assert_eq!(
        title.values().collect::<Vec<_>>(),
        vec![&FieldValue::Text("Dune".to_string())]
    );

    repo.remove_by_title_author("Dune", "Frank", "Herbert")
        .unwrap();
    assert!(!repo.is_in_database("Dune", "Frank", "Herbert").unwrap());
}

#[test]
fn search_by_title_author_requires_exact_triple() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.add_book(&dune()).unwrap();

    assert!(repo
        .search_by_title_author("Dune", "Frank", "Herbertson", &FieldSelection::all())
        .unwrap()
        .is_none());
    assert!(repo
        .search_by_title_author("dune", "Frank", "Herbert", &FieldSelection::all())
        .unwrap()
        .is_none());

    let row = repo
        .search_by_title_author("Dune", "Frank", "Herbert", &FieldSelection::all())
        .unwrap()
        .unwrap();
    assert_eq!(row.book_id(), Some(id));
    assert_eq!(
        repo.search_id_by_title_author("Dune", "Frank", "Herbert")
            .unwrap(),
        Some(id)
    );
    assert_eq!(
        repo.search_id_by_title_author("Emma", "Jane", "Austen")
            .unwrap(),
        None
    );
}

#[test]
fn is_in_database_agrees_with_search_by_title_author() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.add_book(&emma()).unwrap();

    for (title, name, surname) in [
        ("Emma", "Jane", "Austen"),
        ("Emma", "Jane", "Eyre"),
        ("Dune", "Frank", "Herbert"),
    ] {
        let found = repo
            .search_by_title_author(title, name, surname, &FieldSelection::all())
            .unwrap()
            .is_some();
        assert_eq!(repo.is_in_database(title, name, surname).unwrap(), found);
    }
}

#[test]
fn missing_optional_fields_read_back_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.add_book(&emma()).unwrap();

    let row = repo
        .search_by_id(id, &FieldSelection::parse("owned, tags").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(
        row.fields().collect::<Vec<_>>(),
        vec![BookField::Owned, BookField::Tags]
    );
    assert!(row.values().all(FieldValue::is_null));
}

#[test]
fn multi_field_projection_keeps_requested_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.add_book(&dune()).unwrap();

    let row = repo
        .search_by_id(id, &FieldSelection::parse("pages title owned").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(
        row.values().cloned().collect::<Vec<_>>(),
        vec![
            FieldValue::Integer(412),
            FieldValue::Text("Dune".to_string()),
            FieldValue::Bool(true),
        ]
    );
    assert!(row.to_book().is_err());
}

#[test]
fn quotes_in_values_match_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let tricky = NewBook::new("It's' OR '1'='1", "Flann", "O'Brien", 200, "Comic");
    let id = repo.add_book(&tricky).unwrap();
    repo.add_book(&emma()).unwrap();

    assert_eq!(
        repo.search_id_by_title_author("It's' OR '1'='1", "Flann", "O'Brien")
            .unwrap(),
        Some(id)
    );
    assert_eq!(
        repo.remove_by_title_author("x' OR '1'='1", "Flann", "O'Brien")
            .unwrap(),
        0
    );
    assert!(repo.is_in_database("Emma", "Jane", "Austen").unwrap());
}

#[test]
fn search_general_returns_none_instead_of_empty_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();

    let all = FieldSelection::all();
    assert!(repo
        .search_general(&Condition::none(), &all, SearchMode::All)
        .unwrap()
        .is_none());
    assert!(repo
        .search_general(&Condition::none(), &all, SearchMode::One)
        .unwrap()
        .is_none());

    repo.add_book(&dune()).unwrap();
    repo.add_book(&emma()).unwrap();

    match repo
        .search_general(&Condition::none(), &all, SearchMode::All)
        .unwrap()
    {
        Some(SearchHits::Many(rows)) => assert_eq!(rows.len(), 2),
        other => panic!("unexpected hits: {other:?}"),
    }
    assert!(matches!(
        repo.search_general(&Condition::none(), &all, SearchMode::One)
            .unwrap(),
        Some(SearchHits::One(_))
    ));
}

#[test]
fn search_general_accepts_custom_parameterized_condition() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    repo.add_book(&dune()).unwrap();
    repo.add_book(&emma()).unwrap();
    repo.add_book(&NewBook::new("Hyperion", "Dan", "Simmons", 482, "SciFi"))
        .unwrap();

    let condition = Condition::new(
        "genre = ? AND pages > ?",
        vec![Value::Text("SciFi".to_string()), Value::Integer(450)],
    );
    let rows = repo
        .search_general(
            &condition,
            &FieldSelection::single(BookField::Title),
            SearchMode::All,
        )
        .unwrap()
        .unwrap()
        .into_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get(BookField::Title).and_then(FieldValue::as_str),
        Some("Hyperion")
    );

    let removed = repo
        .remove_general(&Condition::new(
            "genre = ?",
            vec![Value::Text("SciFi".to_string())],
        ))
        .unwrap();
    assert_eq!(removed, 2);
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteBookRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        } if expected_version == latest_version()
    ));
}

#[test]
fn try_new_rejects_foreign_schema() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "CREATE TABLE Book (book_pk INTEGER PRIMARY KEY, title TEXT);
         PRAGMA user_version = {};",
        latest_version()
    ))
    .unwrap();

    let err = SqliteBookRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::MissingRequiredColumn {
            table: "Book",
            column: "author_name",
        }
    ));
}

#[test]
fn corrupt_owned_value_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.add_book(&emma()).unwrap();

    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE Book SET owned = 7 WHERE book_pk = ?1;", [id])
        .unwrap();

    let err = repo
        .search_by_id(id, &FieldSelection::single(BookField::Owned))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repeated_field_input_serializes_each_column_once() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::try_new(&conn).unwrap();
    let id = repo.add_book(&dune()).unwrap();

    let row = repo
        .search_by_id(id, &FieldSelection::parse("title, title pages").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(row.len(), 2);
    assert_eq!(
        serde_json::to_string(&row).unwrap(),
        r#"{"title":"Dune","pages":412}"#
    );
}
