use super::*;
use tempfile::TempDir;

fn names(deps: &[DependencyDescriptor]) -> Vec<&str> {
    deps.iter().map(|d| d.name.as_str()).collect()
}

#[test]
fn test_demo_table_contents() {
    let source = StaticSource::demo();
    assert_eq!(source.len(), 6);
    assert_eq!(names(&source.dependencies_of("A")), vec!["B", "C"]);
    assert_eq!(names(&source.dependencies_of("E")), vec!["A"]);
    assert!(source.dependencies_of("F").is_empty());
}

#[test]
fn test_table_dependencies_use_fixed_requirement() {
    let source = StaticSource::from_table([("root", vec!["leaf"])]);
    let deps = source.dependencies_of("root");
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].version_req, DEFAULT_TABLE_REQUIREMENT);
    assert_eq!(deps[0].kind, "normal");
}

#[test]
fn test_unknown_package_has_no_dependencies() {
    let source = StaticSource::demo();
    assert!(source.dependencies_of("Z").is_empty());
}

#[test]
fn test_parse_text_table() {
    let text = "\
# demo graph
A: B, C

B: D
this line has no separator
C: , D ,E,
F:
";
    let source = StaticSource::parse(text).unwrap();
    assert_eq!(source.len(), 4);
    assert_eq!(names(&source.dependencies_of("A")), vec!["B", "C"]);
    assert_eq!(names(&source.dependencies_of("C")), vec!["D", "E"]);
    assert!(source.dependencies_of("F").is_empty());
}

#[test]
fn test_parse_rejects_empty_name() {
    let err = StaticSource::parse("A: B\n : C\n").unwrap_err();
    assert!(matches!(err, SourceError::MalformedTable { line: 2, .. }));
}

#[test]
fn test_parse_rejects_duplicate_definition() {
    let err = StaticSource::parse("A: B\nA: C\n").unwrap_err();
    assert!(matches!(err, SourceError::MalformedTable { line: 2, .. }));
}

#[test]
fn test_load_missing_file_falls_back_to_demo() {
    let temp_dir = TempDir::new().unwrap();
    let source = StaticSource::load(Some(&temp_dir.path().join("absent.txt"))).unwrap();
    assert_eq!(names(&source.dependencies_of("A")), vec!["B", "C"]);
    assert!(source.describe().contains("demo"));
}

#[test]
fn test_load_without_path_uses_demo() {
    let source = StaticSource::load(None).unwrap();
    assert_eq!(source.len(), 6);
}

#[test]
fn test_load_reads_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("table.txt");
    std::fs::write(&path, "app: http, log\nhttp: log\n").unwrap();

    let source = StaticSource::load(Some(&path)).unwrap();
    assert_eq!(names(&source.dependencies_of("app")), vec!["http", "log"]);
    assert!(source.describe().contains("table.txt"));
}

#[tokio::test]
async fn test_fetch_ignores_version() {
    let source = StaticSource::demo();
    let first = source.fetch_dependencies("B", "1.0").await.unwrap();
    let second = source.fetch_dependencies("B", "9.9.9").await.unwrap();
    assert_eq!(first, second);
}
