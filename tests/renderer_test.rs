use std::fs;
use std::path::Path;

use cpp_hub::collector::ValueMapping;
use cpp_hub::error::Error;
use cpp_hub::renderer::{render_tree, substitute, substitute_bytes};
use tempfile::TempDir;

fn values(pairs: &[(&str, &str)]) -> ValueMapping {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_substitute_known_tokens() {
    let values = values(&[("name", "demo"), ("version", "1.2")]);
    assert_eq!(
        substitute("project({{name}} VERSION {{version}}) # {{name}}", &values),
        "project(demo VERSION 1.2) # demo"
    );
}

#[test]
fn test_substitute_leaves_unknown_tokens() {
    let values = values(&[("name", "demo")]);
    assert_eq!(substitute("{{name}} {{unknown}} {{ name }}", &values), "demo {{unknown}} {{ name }}");
}

#[test]
fn test_substitute_is_case_sensitive() {
    let values = values(&[("name", "demo")]);
    assert_eq!(substitute("{{Name}}", &values), "{{Name}}");
}

#[test]
fn test_replacement_text_is_not_rescanned() {
    let values = values(&[("a", "{{b}}"), ("b", "boom"), ("self", "{{self}}")]);
    assert_eq!(substitute("{{a}} {{b}} {{self}}", &values), "{{b}} boom {{self}}");
}

#[test]
fn test_substitute_adjacent_and_nested_braces() {
    let values = values(&[("a", "1")]);
    assert_eq!(substitute("{{a}}{{a}}", &values), "11");
    assert_eq!(substitute("{{{a}}}", &values), "{1}");
    assert_eq!(substitute("{{x{{a}}", &values), "{{x1");
}

#[test]
fn test_substitute_without_tokens_is_unchanged() {
    let values = values(&[("a", "1")]);
    let content = b"\x00\xff binary {not a token}";
    assert_eq!(&*substitute_bytes(content, &values), content);
}

#[test]
fn test_substitute_in_non_utf8_content() {
    let values = values(&[("a", "1")]);
    let content = b"\xff{{a}}\xfe";
    assert_eq!(&*substitute_bytes(content, &values), b"\xff1\xfe");
}

#[test]
fn test_render_matches_expected_tree() {
    let template = TempDir::new().unwrap();
    let expected = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let destination = output.path().join("project");

    write(template.path(), "CMakeLists.txt", "project({{project_name}})\n");
    write(template.path(), "src/{{project_name}}.cpp", "// {{project_name}} by {{author}}\n");
    write(template.path(), "include/{{project_name}}/{{project_name}}.hpp", "#pragma once\n");
    write(template.path(), "docs/{{missing}}.md", "{{missing}}\n");

    write(expected.path(), "CMakeLists.txt", "project(demo)\n");
    write(expected.path(), "src/demo.cpp", "// demo by {{author}}\n");
    write(expected.path(), "include/demo/demo.hpp", "#pragma once\n");
    write(expected.path(), "docs/{{missing}}.md", "{{missing}}\n");

    let values = values(&[("project_name", "demo")]);
    let written = render_tree(template.path(), &destination, &values, false).unwrap();

    assert_eq!(written.len(), 4);
    assert!(!dir_diff::is_different(&destination, expected.path()).unwrap());
}

#[test]
fn test_render_creates_empty_directories() {
    let template = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let destination = output.path().join("project");
    fs::create_dir_all(template.path().join("build/{{project_name}}")).unwrap();

    render_tree(template.path(), &destination, &values(&[("project_name", "demo")]), false)
        .unwrap();

    assert!(destination.join("build/demo").is_dir());
}

#[test]
fn test_render_refuses_existing_destination() {
    let template = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(template.path(), "file.txt", "new");
    write(destination.path(), "keep.txt", "old");

    let result = render_tree(template.path(), destination.path(), &values(&[]), false);

    assert!(matches!(result, Err(Error::DestinationExistsError { .. })));
    assert!(!destination.path().join("file.txt").exists());
    assert_eq!(fs::read_to_string(destination.path().join("keep.txt")).unwrap(), "old");
}

#[test]
fn test_render_merges_when_allowed() {
    let template = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(template.path(), "shared.txt", "from overlay {{v}}");
    write(template.path(), "dir/added.txt", "added");
    write(destination.path(), "shared.txt", "from base");
    write(destination.path(), "dir/existing.txt", "existing");

    render_tree(template.path(), destination.path(), &values(&[("v", "1")]), true).unwrap();

    let read = |relative: &str| fs::read_to_string(destination.path().join(relative)).unwrap();
    assert_eq!(read("shared.txt"), "from overlay 1");
    assert_eq!(read("dir/added.txt"), "added");
    assert_eq!(read("dir/existing.txt"), "existing");
}

#[test]
fn test_render_skips_git_directories_at_any_depth() {
    let template = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let destination = output.path().join("project");
    write(template.path(), ".git/HEAD", "ref: refs/heads/main");
    write(template.path(), ".git/objects/ab/cdef", "object");
    write(template.path(), "vendor/lib/.git/config", "[core]");
    write(template.path(), "vendor/lib/lib.cpp", "int x;");
    write(template.path(), ".gitignore", "build/");

    render_tree(template.path(), &destination, &values(&[]), false).unwrap();

    assert!(!destination.join(".git").exists());
    assert!(!destination.join("vendor/lib/.git").exists());
    assert!(destination.join("vendor/lib/lib.cpp").is_file());
    assert!(destination.join(".gitignore").is_file());
}

#[test]
fn test_render_skips_git_file() {
    let template = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let destination = output.path().join("project");
    // Submodule checkouts have a `.git` file instead of a directory.
    write(template.path(), "sub/.git", "gitdir: ../.git/modules/sub");
    write(template.path(), "sub/code.cpp", "");

    render_tree(template.path(), &destination, &values(&[]), false).unwrap();

    assert!(!destination.join("sub/.git").exists());
    assert!(destination.join("sub/code.cpp").exists());
}

#[test]
fn test_render_skips_manifest_at_every_level() {
    let template = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let destination = output.path().join("project");
    write(template.path(), "hub-manifest.json", "{}");
    write(template.path(), "nested/hub-manifest.json", "{}");
    write(template.path(), "nested/kept.txt", "kept");
    write(template.path(), "other/hub-manifest.json/inside.txt", "skipped with its directory");

    render_tree(template.path(), &destination, &values(&[]), false).unwrap();

    assert!(!destination.join("hub-manifest.json").exists());
    assert!(!destination.join("nested/hub-manifest.json").exists());
    assert!(destination.join("nested/kept.txt").exists());
    assert!(!destination.join("other/hub-manifest.json").exists());
}

#[test]
fn test_render_copies_binary_content() {
    let template = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let destination = output.path().join("project");
    let image: Vec<u8> = (0..=255u8).collect();
    fs::write(template.path().join("logo.png"), &image).unwrap();

    render_tree(template.path(), &destination, &values(&[("a", "b")]), false).unwrap();

    assert_eq!(fs::read(destination.join("logo.png")).unwrap(), image);
}

#[test]
fn test_render_missing_source_fails() {
    let output = TempDir::new().unwrap();
    let missing = output.path().join("does-not-exist");
    let destination = output.path().join("project");

    let result = render_tree(&missing, &destination, &values(&[]), false);
    assert!(result.is_err());
}

#[test]
fn test_render_rejects_values_leaving_destination() {
    let workspace = TempDir::new().unwrap();
    let template = workspace.path().join("template");
    let destination = workspace.path().join("out");
    write(&template, "{{name}}.txt", "content");

    for value in ["../escaped", "/tmp/escaped"] {
        let result = render_tree(&template, &destination, &values(&[("name", value)]), true);
        assert!(matches!(result, Err(Error::RelativePathError { .. })), "{value}");
    }

    assert!(!workspace.path().join("escaped.txt").exists());
    assert_eq!(fs::read_dir(&destination).unwrap().count(), 0);
}

#[test]
fn test_render_into_subdirectory_of_template() {
    let template = TempDir::new().unwrap();
    write(template.path(), "a.txt", "{{name}}");
    let destination = template.path().join("demo");

    let written =
        render_tree(template.path(), &destination, &values(&[("name", "demo")]), false).unwrap();

    assert_eq!(written, vec![destination.join("a.txt")]);
    assert_eq!(fs::read_to_string(destination.join("a.txt")).unwrap(), "demo");
    assert!(!destination.join("demo").exists());
}
