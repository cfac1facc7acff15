mod common;

use article_studio::session::Session;
use article_studio::StudioError;
use mockito::Matcher;
use tempfile::tempdir;

#[test]
fn open_loads_categories_once() {
    let mut server = mockito::Server::new();
    let dir = tempdir().unwrap();
    common::write_wp_config(dir.path(), &server.url());
    let categories = server
        .mock("GET", "/wp-json/wp/v2/categories")
        .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
        .with_status(200)
        .with_body(r#"[{"id": 3, "name": "Travel"}, {"id": 7, "name": "Nature"}]"#)
        .expect(1)
        .create();

    let session = Session::open(common::config_for(dir.path(), &server.url())).unwrap();

    let ids: Vec<u64> = session.categories().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 7]);
    assert!(session.publisher().is_ok());
    categories.assert();
}

#[test]
fn unreadable_config_leaves_session_untouched() {
    let mut server = mockito::Server::new();
    let dir = tempdir().unwrap();
    common::write_wp_config(dir.path(), &server.url());
    let _categories = server
        .mock("GET", "/wp-json/wp/v2/categories")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"[{"id": 3, "name": "Travel"}]"#)
        .create();
    let mut session = Session::open(common::config_for(dir.path(), &server.url())).unwrap();
    assert_eq!(session.categories().len(), 1);

    // A directory where the file should be makes the read fail with an
    // error other than NotFound.
    let config = dir.path().join("wordpress_config.txt");
    std::fs::remove_file(&config).unwrap();
    std::fs::create_dir(&config).unwrap();

    let err = session.refresh().unwrap_err();

    assert!(matches!(err, StudioError::Io(_)));
    assert_eq!(session.categories().len(), 1);
    assert!(session.publisher().is_ok());
}

#[test]
fn missing_credentials_disable_publishing_only() {
    let server = mockito::Server::new();
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("openai_api_key.txt"), "sk-test").unwrap();

    let mut session = Session::open(common::config_for(dir.path(), &server.url())).unwrap();
    session.refresh().unwrap();

    assert!(session.generator().has_api_key());
    assert!(session.categories().is_empty());
    match session.publisher() {
        Err(StudioError::MissingCredentials(missing)) => assert_eq!(
            missing,
            vec!["WORDPRESS_URL", "WORDPRESS_USERNAME", "WORDPRESS_PASSWORD"]
        ),
        other => panic!("unexpected: {:?}", other.map(|c| c.base_url().to_string())),
    }
}
