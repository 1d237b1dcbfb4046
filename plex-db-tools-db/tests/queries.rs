use plex_db_tools_db::*;
use rusqlite::params;

fn setup_db() -> Connection {
    let conn = open_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO library_sections (id, name, section_type) VALUES
            (1, 'Movies', 1),
            (2, 'TV', 2),
            (3, 'Music', 8);",
    )
    .unwrap();

    // Movies: empty poster, placeholder poster, real poster
    insert_item(&conn, 10, 1, 1, "com.plexapp.agents.imdb://tt0076759?lang=en", "Star Wars", Some(1977), "", 300);
    insert_item(&conn, 11, 1, 1, "com.plexapp.agents.imdb://tt0080684?lang=en", "The Empire Strikes Back", Some(1980), "media://a/b.jpg", 100);
    insert_item(&conn, 12, 1, 1, "com.plexapp.agents.themoviedb://1892?lang=en", "Return of the Jedi", Some(1983), "upload://posters/abc", 200);
    // Collection row in the movie library
    insert_item(&conn, 13, 1, 18, "collection://13", "Star Wars Collection", None, "", 400);

    // Shows: empty poster, placeholder poster
    insert_item(&conn, 20, 2, 2, "com.plexapp.agents.thetvdb://81189?lang=en", "Breaking Bad", Some(2008), "", 100);
    insert_item(&conn, 21, 2, 2, "com.plexapp.agents.thetvdb://121361?lang=en", "Game of Thrones", Some(2011), "media://x/y.jpg", 200);
    // An episode under a show
    insert_item(&conn, 22, 2, 4, "com.plexapp.agents.thetvdb://81189/1/1?lang=en", "Pilot", Some(2008), "", 150);

    // Music library row
    insert_item(&conn, 30, 3, 8, "com.plexapp.agents.lastfm://artist", "Artist", None, "", 50);

    // Media: star wars analyzed, empire not analyzed, pilot not analyzed, music not analyzed
    insert_media(&conn, 100, 10, Some(8000), "/movies/Star Wars (1977)/Star Wars.mkv");
    insert_media(&conn, 101, 11, None, "/movies/Empire (1980)/Empire.mkv");
    insert_media(&conn, 102, 22, None, "/tv/Breaking Bad/S01E01.mkv");
    insert_media(&conn, 103, 30, None, "/music/artist/track.flac");

    conn
}

#[allow(clippy::too_many_arguments)]
fn insert_item(
    conn: &Connection,
    id: i64,
    section: i64,
    metadata_type: i64,
    guid: &str,
    title: &str,
    year: Option<i64>,
    poster: &str,
    added_at: i64,
) {
    conn.execute(
        "INSERT INTO metadata_items
            (id, library_section_id, metadata_type, guid, title, year, user_thumb_url, added_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![id, section, metadata_type, guid, title, year, poster, added_at],
    )
    .unwrap();
}

fn insert_media(conn: &Connection, id: i64, metadata_item_id: i64, bitrate: Option<i64>, file: &str) {
    conn.execute(
        "INSERT INTO media_items (id, metadata_item_id, bitrate) VALUES (?1, ?2, ?3)",
        params![id, metadata_item_id, bitrate],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO media_parts (id, media_item_id, file) VALUES (?1, ?2, ?3)",
        params![id, id, file],
    )
    .unwrap();
}

// ── Library Lookups ─────────────────────────────────────────────────────────

#[test]
fn find_library_by_name() {
    let conn = setup_db();
    let movies = find_library(&conn, "Movies").unwrap().unwrap();
    assert_eq!(movies.id, 1);
    assert_eq!(movies.kind, LibraryKind::Movie);

    let tv = find_library(&conn, "TV").unwrap().unwrap();
    assert_eq!(tv.kind, LibraryKind::Show);

    let music = find_library(&conn, "Music").unwrap().unwrap();
    assert_eq!(music.kind, LibraryKind::Other(8));
}

#[test]
fn unknown_library_is_none() {
    let conn = setup_db();
    assert!(find_library(&conn, "Anime").unwrap().is_none());
    assert!(matches!(
        require_library(&conn, "Anime"),
        Err(QueryError::UnknownLibrary(name)) if name == "Anime"
    ));
}

// ── Missing Posters ─────────────────────────────────────────────────────────

#[test]
fn movie_missing_posters_include_empty_and_placeholder() {
    let conn = setup_db();
    let items = find_items_missing_posters(&conn, "Movies").unwrap();
    let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    // Ordered by added_at: Empire (100) before Star Wars (300)
    assert_eq!(ids, vec![11, 10]);
    assert!(items.iter().all(|i| i.poster_is_placeholder()));
    assert_eq!(items[0].library_name, "Movies");
}

#[test]
fn movie_with_real_poster_is_excluded() {
    let conn = setup_db();
    let items = find_items_missing_posters(&conn, "Movies").unwrap();
    assert!(!items.iter().any(|i| i.id == 12));
    // Collections are not movies
    assert!(!items.iter().any(|i| i.id == 13));
}

#[test]
fn show_missing_posters_only_match_empty() {
    let conn = setup_db();
    let items = find_items_missing_posters(&conn, "TV").unwrap();
    let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    // Placeholder poster and episodes are not reported for shows
    assert_eq!(ids, vec![20]);
}

#[test]
fn missing_posters_unsupported_library_kind() {
    let conn = setup_db();
    let err = find_items_missing_posters(&conn, "Music").unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedLibraryKind { .. }));
}

#[test]
fn missing_posters_empty_result() {
    let conn = setup_db();
    conn.execute("UPDATE metadata_items SET user_thumb_url = 'upload://x' WHERE library_section_id = 2", [])
        .unwrap();
    let items = find_items_missing_posters(&conn, "TV").unwrap();
    assert!(items.is_empty());
}

// ── Unanalyzed Media ────────────────────────────────────────────────────────

#[test]
fn unanalyzed_movies_have_null_bitrate() {
    let conn = setup_db();
    let items = find_unanalyzed_items(&conn, "Movies").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].metadata_item_id, 11);
    assert_eq!(items[0].media_item_id, 101);
    assert_eq!(items[0].file, "/movies/Empire (1980)/Empire.mkv");
    assert_eq!(items[0].added_at.as_deref(), Some("100"));
}

#[test]
fn unanalyzed_shows_report_episodes() {
    let conn = setup_db();
    let items = find_unanalyzed_items(&conn, "TV").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Pilot");
}

#[test]
fn unanalyzed_rejects_other_library_kinds() {
    let conn = setup_db();
    let err = find_unanalyzed_items(&conn, "Music").unwrap_err();
    assert!(matches!(
        err,
        QueryError::UnsupportedLibraryKind { kind: LibraryKind::Other(8), .. }
    ));
}

#[test]
fn unanalyzed_unknown_library() {
    let conn = setup_db();
    assert!(matches!(
        find_unanalyzed_items(&conn, "Nope"),
        Err(QueryError::UnknownLibrary(_))
    ));
}

#[test]
fn unanalyzed_skips_parts_without_file() {
    let conn = setup_db();
    conn.execute("UPDATE media_parts SET file = NULL WHERE id = 101", []).unwrap();
    let items = find_unanalyzed_items(&conn, "Movies").unwrap();
    assert!(items.is_empty());
}

// ── Item Lookups ────────────────────────────────────────────────────────────

#[test]
fn find_item_by_guid_in_library() {
    let conn = setup_db();
    let item = find_item_by_guid(&conn, "Movies", "com.plexapp.agents.imdb://tt0076759?lang=en")
        .unwrap()
        .unwrap();
    assert_eq!(item.id, 10);
    assert_eq!(item.library_section_id, 1);
    assert_eq!(item.display_name(), "Star Wars (1977)");
}

#[test]
fn find_item_by_guid_is_scoped_to_library() {
    let conn = setup_db();
    let item = find_item_by_guid(&conn, "TV", "com.plexapp.agents.imdb://tt0076759?lang=en").unwrap();
    assert!(item.is_none());
}

#[test]
fn find_collection_by_exact_name() {
    let conn = setup_db();
    let collection = find_collection_by_name(&conn, "Movies", "Star Wars Collection")
        .unwrap()
        .unwrap();
    assert_eq!(collection.id, 13);
    assert_eq!(collection.metadata_type, METADATA_TYPE_COLLECTION);
    assert_eq!(collection.display_name(), "Star Wars Collection (????)");

    // A movie with the same title prefix is not a collection
    assert!(find_collection_by_name(&conn, "Movies", "Star Wars").unwrap().is_none());
}

#[test]
fn text_added_at_is_preserved() {
    let conn = setup_db();
    conn.execute(
        "UPDATE metadata_items SET added_at = '2019-01-01 10:00:00' WHERE id = 20",
        [],
    )
    .unwrap();
    let items = find_items_missing_posters(&conn, "TV").unwrap();
    assert_eq!(items[0].added_at.as_deref(), Some("2019-01-01 10:00:00"));
}
