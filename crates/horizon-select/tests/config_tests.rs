//! Configuration loading, label validation at construction, and logging.

use horizon_select::prelude::*;
use horizon_select::{HostSurface, Surface};

#[test]
fn test_container_config_from_toml() {
    let config: ContainerConfig = toml::from_str(
        r#"
            default_label = "picked"
            ignore_label = ["starred", "hidden"]
            model_sharing = false
        "#,
    )
    .unwrap();

    assert_eq!(config.default_label.as_str(), "picked");
    assert_eq!(config.ignore_label.len(), 2);
    assert!(!config.model_sharing);

    let registry = SelectionRegistry::new();
    let multi = registry.create_multi(config).unwrap();
    assert_eq!(multi.default_label(), Some(Label::from("picked")));
    assert!(!multi.model_sharing());
}

#[test]
fn test_single_ignore_label_from_toml() {
    let config: ContainerConfig = toml::from_str(r#"ignore_label = "starred""#).unwrap();
    assert_eq!(config.ignore_label, vec![Label::from("starred")]);
    assert_eq!(config.default_label, Label::default());
    assert!(config.model_sharing);
}

#[test]
fn test_item_config_from_toml() {
    let config: ItemConfig = toml::from_str(r#"default_label = "flagged""#).unwrap();
    let registry = SelectionRegistry::new();
    let item = registry.create_item_with(config).unwrap();

    item.select().unwrap();
    assert!(item.is_selected_for("flagged"));
    assert!(!item.is_selected_for("selected"));
}

#[test]
fn test_ignoring_default_label_is_rejected() {
    let registry = SelectionRegistry::new();
    let config: ContainerConfig = toml::from_str(
        r#"
            default_label = "picked"
            ignore_label = "picked"
        "#,
    )
    .unwrap();

    let err = registry.create_single(config).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("'picked'"));
    assert_eq!(registry.container_count(), 0);
}

struct AppSurface;

impl HostSurface for AppSurface {
    fn item_members(&self) -> &[&'static str] {
        &["title", "save"]
    }

    fn container_members(&self) -> &[&'static str] {
        &["comparator"]
    }
}

#[test]
fn test_custom_host_surface() {
    let registry = SelectionRegistry::with_surface(AppSurface);
    let item = registry.create_item();

    assert_eq!(
        item.select_with(SelectOptions::from("title")).unwrap_err(),
        SelectError::collision("title", Surface::Item)
    );
    assert_eq!(
        registry
            .create_multi(ContainerConfig::new().ignore_label("comparator"))
            .unwrap_err(),
        SelectError::collision("comparator", Surface::Container)
    );
    assert!(item.select_with(SelectOptions::from("select_all")).is_ok());
}

#[test]
fn test_empty_label_is_rejected() {
    let registry = SelectionRegistry::new();
    let item = registry.create_item();
    assert_eq!(
        item.select_with(SelectOptions::from("")).unwrap_err(),
        SelectError::EmptyLabel
    );
}

#[test]
fn test_operations_emit_tracing_output() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("horizon_select=trace"))
        .with_test_writer()
        .try_init();

    let registry = SelectionRegistry::new();
    let single = registry.create_single(ContainerConfig::default()).unwrap();
    let items: Vec<Item> = (0..2).map(|_| registry.create_item()).collect();
    single.add(&items).unwrap();
    single.select(&items[0]).unwrap().select(&items[1]).unwrap();
    items[1].destroy().unwrap();
    single.close();

    assert!(!items[0].is_selected());
    assert_eq!(registry.item_count(), 1);
}
