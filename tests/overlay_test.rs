use std::fs;
use std::path::Path;

use cpp_hub::collector::ValueMapping;
use cpp_hub::error::Error;
use cpp_hub::generator::{default_target_dir, generate_project, lint_template};
use cpp_hub::manifest::{parse_manifest, OverlayRule, TemplateManifest};
use cpp_hub::overlay::{apply_overlays, OverlayOutcome};
use tempfile::TempDir;

fn values(pairs: &[(&str, &str)]) -> ValueMapping {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn rule(variable: &str, equals_value: &str, path: &str) -> OverlayRule {
    OverlayRule {
        variable: variable.to_string(),
        equals_value: equals_value.to_string(),
        path: path.to_string(),
    }
}

fn vcpkg_manifest() -> TemplateManifest {
    parse_manifest(
        r#"{
            "schema_version": "1",
            "id": "cmake-app",
            "name": "CMake App",
            "version": "1.0.0",
            "variables": {
                "project_name": {"type": "string", "default": "demo"},
                "pm": {"type": "select", "options": ["cmake", "vcpkg"], "default": "cmake"}
            },
            "overlays": [
                {"variable": "pm", "equalsValue": "vcpkg", "path": "overlays/vcpkg"}
            ]
        }"#,
        "hub-manifest.json",
    )
    .unwrap()
}

fn vcpkg_template() -> TempDir {
    let template = TempDir::new().unwrap();
    write(template.path(), "CMakeLists.txt", "project({{project_name}})\n");
    write(template.path(), "README.md", "base readme\n");
    write(template.path(), "overlays/vcpkg/vcpkg.json", "{\"name\": \"{{project_name}}\"}\n");
    write(template.path(), "overlays/vcpkg/README.md", "vcpkg readme for {{project_name}}\n");
    template
}

#[test]
fn test_rule_matching_is_exact() {
    let rule = rule("pm", "vcpkg", "overlays/vcpkg");

    assert!(rule.matches(&values(&[("pm", "vcpkg")])));
    assert!(!rule.matches(&values(&[("pm", "VCPKG")])));
    assert!(!rule.matches(&values(&[("pm", "vcpkg2")])));
    assert!(!rule.matches(&values(&[("pm", "vcp")])));
    assert!(!rule.matches(&values(&[("other", "vcpkg")])));
}

#[test]
fn test_matching_overlay_overwrites_base_files() {
    let template = vcpkg_template();
    let output = TempDir::new().unwrap();
    let project = output.path().join("demo");
    let manifest = vcpkg_manifest();
    let values = values(&[("project_name", "demo"), ("pm", "vcpkg")]);

    let report = generate_project(template.path(), &manifest, &values, &project).unwrap();

    assert_eq!(fs::read_to_string(project.join("README.md")).unwrap(), "vcpkg readme for demo\n");
    assert_eq!(fs::read_to_string(project.join("vcpkg.json")).unwrap(), "{\"name\": \"demo\"}\n");
    assert_eq!(fs::read_to_string(project.join("CMakeLists.txt")).unwrap(), "project(demo)\n");
    assert!(matches!(
        report.overlays.as_slice(),
        [OverlayOutcome::Applied { files, .. }] if files.len() == 2
    ));
}

#[test]
fn test_non_matching_overlay_leaves_base_render() {
    let template = vcpkg_template();
    let output = TempDir::new().unwrap();
    let with_rules = output.path().join("with-rules");
    let base_only = output.path().join("base-only");
    let mut manifest = vcpkg_manifest();
    let values = values(&[("project_name", "demo"), ("pm", "cmake")]);

    let report = generate_project(template.path(), &manifest, &values, &with_rules).unwrap();
    manifest.overlays.clear();
    generate_project(template.path(), &manifest, &values, &base_only).unwrap();

    assert!(report.overlays.is_empty());
    assert!(!with_rules.join("vcpkg.json").exists());
    assert!(!dir_diff::is_different(&with_rules, &base_only).unwrap());
}

#[test]
fn test_rules_apply_in_declared_order() {
    let template = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(template.path(), "first/config.txt", "first");
    write(template.path(), "second/config.txt", "second");
    let rules = [rule("ci", "true", "first"), rule("ci", "true", "second")];

    let outcomes =
        apply_overlays(template.path(), project.path(), &rules, &values(&[("ci", "true")]))
            .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(fs::read_to_string(project.path().join("config.txt")).unwrap(), "second");
}

#[test_log::test]
fn test_missing_overlay_directory_is_skipped() {
    let template = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(template.path(), "present/added.txt", "added");
    let rules = [rule("pm", "vcpkg", "overlays/absent"), rule("pm", "vcpkg", "present")];

    let outcomes =
        apply_overlays(template.path(), project.path(), &rules, &values(&[("pm", "vcpkg")]))
            .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(&outcomes[0], OverlayOutcome::Missing { source } if source.ends_with("overlays/absent")));
    assert!(project.path().join("added.txt").exists());
}

#[test]
fn test_overlay_render_failure_is_fatal() {
    let template = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(template.path(), "overlay/dir/file.txt", "content");
    // A file where the overlay needs a directory makes the render fail.
    write(project.path(), "dir", "blocking file");
    let rules = [rule("pm", "vcpkg", "overlay")];

    let result =
        apply_overlays(template.path(), project.path(), &rules, &values(&[("pm", "vcpkg")]));

    assert!(matches!(result, Err(Error::RenderError { .. })));
}

#[test]
fn test_generate_refuses_existing_project() {
    let template = vcpkg_template();
    let project = TempDir::new().unwrap();
    let manifest = vcpkg_manifest();

    let result = generate_project(template.path(), &manifest, &values(&[]), project.path());

    assert!(matches!(result, Err(Error::DestinationExistsError { .. })));
    assert!(!project.path().join("CMakeLists.txt").exists());
}

#[test]
fn test_default_target_dir() {
    let manifest = vcpkg_manifest();
    let cwd = Path::new("/work");

    assert_eq!(
        default_target_dir(cwd, &manifest, &values(&[("project_name", "app")])),
        cwd.join("app")
    );
    assert_eq!(
        default_target_dir(cwd, &manifest, &values(&[("project_name", "")])),
        cwd.join("cmake-app")
    );
    assert_eq!(default_target_dir(cwd, &manifest, &values(&[])), cwd.join("cmake-app"));
}

#[test]
fn test_lint_template() {
    let template = TempDir::new().unwrap();
    let manifest = parse_manifest(
        r#"{
            "schema_version": "1", "id": "t", "name": "T", "version": "1",
            "variables": {
                "name": {"type": "string", "validation_regex": "([a-z"},
                "pm": {"type": "select", "options": ["cmake"], "default": "meson"},
                "ok": {"type": "boolean", "default": true}
            },
            "overlays": [{"variable": "ghost", "equalsValue": "x", "path": "overlays/ghost"}]
        }"#,
        "hub-manifest.json",
    )
    .unwrap();

    let warnings = lint_template(template.path(), &manifest);

    assert_eq!(warnings.len(), 4, "{warnings:?}");
    assert!(warnings[0].contains("'name'"));
    assert!(warnings[1].starts_with("select variable 'pm'"), "{}", warnings[1]);
    assert!(warnings[2].contains("'ghost'"));
    assert!(warnings[3].contains("overlays/ghost"));
}
