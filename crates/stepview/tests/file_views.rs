//! Views backed by the `File` loader and YAML settings.

use std::fs;
use std::path::Path;

use stepview::{Context, Overrides, StepKind, StrategyRegistry, View, ViewError, ViewSettings};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn app_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "views/users/index.html", "<h1>{:title}</h1>");
    write(dir.path(), "elements/nav.html", "<nav>{:user}</nav>");
    write(dir.path(), "layouts/default.html", "<body>{:content}</body>");
    dir
}

fn settings_for(dir: &TempDir) -> ViewSettings {
    let yaml = format!(
        r#"
loader: File
renderer: Simple
root: "{}"
paths:
  template:
    - "views/{{:controller}}/{{:template}}.html"
  element:
    - "elements/{{:element}}.html"
  layout:
    - "layouts/{{:layout}}.html"
"#,
        dir.path().display()
    );
    ViewSettings::from_yaml(&yaml).unwrap()
}

#[test]
fn renders_all_steps_from_disk() {
    let dir = app_dir();
    let view = View::from_settings(&settings_for(&dir), &StrategyRegistry::new()).unwrap();

    let out = view
        .render(
            "all",
            &Context::new().with("title", "Users").with("user", "joe"),
            &Overrides::new()
                .with("controller", "users")
                .with("template", "index")
                .with("element", "nav")
                .with("layout", "default"),
        )
        .unwrap();

    assert_eq!(out, "<body><nav>joe</nav><h1>Users</h1></body>");
}

#[test]
fn missing_file_is_template_not_found() {
    let dir = app_dir();
    let view = View::from_settings(&settings_for(&dir), &StrategyRegistry::new()).unwrap();

    let err = view
        .render(
            "template",
            &Context::new(),
            &Overrides::new()
                .with("controller", "posts")
                .with("template", "index"),
        )
        .unwrap_err();

    assert!(matches!(err, ViewError::TemplateNotFound { step, .. } if step == "template"));
}

#[test]
fn settings_load_from_file() {
    let dir = app_dir();
    write(
        dir.path(),
        "view.yaml",
        "loader: File\nrenderer: Jinja\nencoding: ISO-8859-1\n",
    );

    let settings = ViewSettings::from_file(dir.path().join("view.yaml")).unwrap();
    assert_eq!(settings.renderer, "Jinja");
    assert!(settings.paths.get(&StepKind::Template).is_none());

    let view = View::from_settings(&settings, &StrategyRegistry::new()).unwrap();
    assert_eq!(view.loader().name(), "File");
}

#[test]
fn settings_with_unknown_loader_fail_construction() {
    let settings = ViewSettings::from_yaml("loader: Badness").unwrap();
    let err = View::from_settings(&settings, &StrategyRegistry::new()).unwrap_err();
    assert!(err.to_string().contains("'Badness'"));
}
