//! Tests for layered settings

use std::fs;
use std::path::PathBuf;

use navtree::application::ApplicationError;
use navtree::config::{local_config_path, Settings};
use navtree::domain::DuplicatePolicy;
use rstest::rstest;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = local_config_path(dir.path());
    fs::write(&path, content).unwrap();
    path
}

#[rstest]
fn given_full_config_file_when_loading_then_all_fields_applied() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(
        &temp,
        r#"
menu_file = "/srv/site/menu.json"
order_step = 100
duplicate_policy = "reject"
external_id_prefix = "link-"
"#,
    );

    // Act
    let settings = Settings::load_file(&path).unwrap();

    // Assert
    assert_eq!(
        settings,
        Settings {
            menu_file: PathBuf::from("/srv/site/menu.json"),
            order_step: 100,
            duplicate_policy: DuplicatePolicy::Reject,
            external_id_prefix: "link-".to_string(),
        }
    );
}

#[rstest]
fn given_partial_config_file_when_loading_then_defaults_fill_rest() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "order_step = 5\n");

    // Act
    let settings = Settings::load_file(&path).unwrap();

    // Assert
    assert_eq!(settings.order_step, 5);
    assert_eq!(settings.duplicate_policy, DuplicatePolicy::FirstWins);
    assert_eq!(settings.menu_file, PathBuf::from("menu.json"));
}

#[rstest]
#[case("order_step = 0\n")]
#[case("order_step = -10\n")]
#[case("order_step = 4611686018427387903\n")]
#[case("external_id_prefix = \"\"\n")]
#[case("duplicate_policy = \"last-wins\"\n")]
#[case("order_step = \"ten\"\n")]
fn given_invalid_config_when_loading_then_config_error(#[case] content: &str) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, content);

    // Act
    let result = Settings::load_file(&path);

    // Assert
    assert!(
        matches!(result, Err(ApplicationError::Config { .. })),
        "expected config error for {:?}",
        content
    );
}

#[rstest]
fn given_missing_file_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let result = Settings::load_file(&temp.path().join("absent.toml"));
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[rstest]
fn given_env_var_in_menu_file_when_loading_then_expanded() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "menu_file = \"$HOME/menu.json\"\n");

    // Act
    let settings = Settings::load_file(&path).unwrap();

    // Assert
    let home = std::env::var("HOME").unwrap();
    assert_eq!(settings.menu_file, PathBuf::from(home).join("menu.json"));
}

#[rstest]
fn given_effective_settings_when_rendered_then_reloadable() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let original = Settings {
        order_step: 25,
        ..Settings::default()
    };
    let path = write_config(&temp, &original.to_toml().unwrap());

    // Act
    let reloaded = Settings::load_file(&path).unwrap();

    // Assert
    assert_eq!(reloaded, original);
}
