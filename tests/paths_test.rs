use cookiecutter_runner::error::Error;
use cookiecutter_runner::layout::TemplateLayout;
use cookiecutter_runner::paths::{build_path_set, rebase_path};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROJECT: &str = "{{cookiecutter.var_name}}";

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn template(files: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let root = fs::canonicalize(temp_dir.path()).unwrap();
    write(&root.join("cookiecutter.json"), r#"{"var_name": "demo"}"#);
    fs::create_dir_all(root.join(PROJECT)).unwrap();
    for file in files {
        write(&root.join(file), "content");
    }
    (temp_dir, root)
}

fn relative(paths: impl IntoIterator<Item = PathBuf>, root: &Path) -> Vec<PathBuf> {
    paths.into_iter().map(|p| p.strip_prefix(root).unwrap().to_path_buf()).collect()
}

#[test]
fn test_rebase_path() {
    assert_eq!(
        rebase_path("/root/a/b/c", "/root/a", "/root/a/d").unwrap(),
        PathBuf::from("/root/a/d/b/c")
    );
    assert_eq!(
        rebase_path("/dir_11/dir_12/dir_13", "/dir_11", "/dir_11/dir_14").unwrap(),
        PathBuf::from("/dir_11/dir_14/dir_12/dir_13")
    );
}

#[test]
fn test_rebase_path_outside_root() {
    assert!(matches!(
        rebase_path("/elsewhere/file", "/root/a", "/cache"),
        Err(Error::PathOutsideRoot { .. })
    ));
}

#[test]
fn test_path_set_with_gitignore() {
    let (_temp_dir, root) = template(&[
        "{{cookiecutter.var_name}}/test.py",
        "{{cookiecutter.var_name}}/test.pyc",
        "README.md",
    ]);
    write(&root.join(PROJECT).join(".gitignore"), "*.pyc\n");

    let paths = build_path_set(&root, &TemplateLayout::default()).unwrap();
    assert_eq!(
        relative(paths, &root),
        vec![
            PathBuf::from("cookiecutter.json"),
            Path::new(PROJECT).join(".gitignore"),
            Path::new(PROJECT).join("test.py"),
        ]
    );
}

#[test]
fn test_path_set_order_and_hooks() {
    let (_temp_dir, root) = template(&[
        "hooks/pre_gen_project.py",
        "hooks/post_gen_project.py",
        "hooks/lib/helper.pyc",
        "{{cookiecutter.var_name}}/test_2.py",
        "{{cookiecutter.var_name}}/skip.pyc",
    ]);
    write(&root.join(PROJECT).join(".gitignore"), "*.pyc\n");

    let paths = build_path_set(&root, &TemplateLayout::default()).unwrap();
    assert_eq!(
        relative(paths, &root),
        vec![
            PathBuf::from("cookiecutter.json"),
            // Hooks are never filtered by the project's ignore file.
            PathBuf::from("hooks/lib/helper.pyc"),
            PathBuf::from("hooks/post_gen_project.py"),
            PathBuf::from("hooks/pre_gen_project.py"),
            Path::new(PROJECT).join(".gitignore"),
            Path::new(PROJECT).join("test_2.py"),
        ]
    );
}

#[test]
fn test_path_set_without_hooks_or_gitignore() {
    let (_temp_dir, root) = template(&[
        "{{cookiecutter.var_name}}/test.py",
        "{{cookiecutter.var_name}}/test_2.py",
    ]);

    let paths = build_path_set(&root, &TemplateLayout::default()).unwrap();
    let manifest = root.join("cookiecutter.json");
    assert_eq!(paths.iter().filter(|p| **p == manifest).count(), 1);
    assert!(paths.iter().all(|p| !p.starts_with(root.join("hooks"))));
    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.is_absolute()));
}

#[test]
fn test_path_set_relative_template_dir() {
    let (_temp_dir, root) = template(&["{{cookiecutter.var_name}}/test.py"]);
    let dotted = root.join(PROJECT).join("..");

    let paths = build_path_set(&dotted, &TemplateLayout::default()).unwrap();
    assert_eq!(paths.first(), Some(&root.join("cookiecutter.json")));
    assert_eq!(paths.last(), Some(&root.join(PROJECT).join("test.py")));
}

#[test]
fn test_path_set_invalid_template() {
    let (_temp_dir, root) = template(&[]);
    fs::create_dir_all(root.join("{{cookiecutter.other}}")).unwrap();

    assert!(matches!(
        build_path_set(&root, &TemplateLayout::default()),
        Err(Error::InvalidTemplate { .. })
    ));
}
