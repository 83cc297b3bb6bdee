use chanmarkup::config::load_sites;
use chanmarkup::markup::{visible_text, Color, Link, SiteRegistry};
use chanmarkup::MarkupError;

#[test]
fn test_registry_loads_site_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.toml");
    let content = r##"
# tinyboard clone with its own greentext class
[[site]]
name = "tinyclone"
extends = "vichan"

[[site.rule]]
tag = "span"
class = "green"
foreground = "inline_quote"
linkify = true

[[site]]
name = "Vichan"
extends = "4chan"
"##;
    std::fs::write(&path, content).unwrap();

    let mut registry = SiteRegistry::new();
    assert_eq!(registry.load_file(&path).unwrap(), 2);
    assert_eq!(registry.list_sites(), vec!["4chan", "Vichan", "foolfuuka", "tinyclone"]);

    let spans = registry
        .parse_comment("tinyclone", r#"<span class="green">&gt;see /b/res/1.html#2</span>"#)
        .unwrap();
    assert_eq!(visible_text(&spans), ">see /b/res/1.html#2");
    assert_eq!(spans[1].style.fg, Color::InlineQuote);
    assert!(matches!(spans[1].style.link, Some(Link::Thread { thread_id: 1, post_id: 2, .. })));

    // The replaced vichan now uses 4chan quote syntax
    let spans = registry.parse_comment("vichan", "#p9").unwrap();
    assert_eq!(spans[0].style.link, Some(Link::Quote { post_id: 9 }));
}

#[test]
fn test_missing_site_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_sites(&dir.path().join("absent.toml"), &SiteRegistry::new());
    assert!(matches!(result, Err(MarkupError::Io(_))));
}

#[test]
fn test_invalid_site_file_leaves_registry_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.toml");
    std::fs::write(&path, "[[site]]\nname = \"bad\"\nextends = \"vichan\"\nfull_quote_pattern = '/(\\w+)/(\\d+)'\n").unwrap();

    let mut registry = SiteRegistry::new();
    let err = registry.load_file(&path).unwrap_err();
    assert!(matches!(err, MarkupError::MissingCaptureGroup { expected: 3, found: 2, .. }));
    assert!(registry.get("bad").is_none());
}
