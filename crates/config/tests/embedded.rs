//! Loading resources compiled into the binary.

use {
    include_dir::{Dir, include_dir},
    webcall_config::{PropertyLoader, StaticVariables},
};

static RESOURCES: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/tests/fixtures");

fn loader() -> PropertyLoader {
    PropertyLoader::new()
        .with_environment(StaticVariables::new())
        .with_resources(RESOURCES.clone())
}

#[test]
fn embedded_includes_are_followed() {
    let mut props = loader();
    props.load_resource("embedded/base.properties").unwrap();

    assert_eq!(props.keys(), vec!["Embedded", "Extra"]);
    assert_eq!(props.value("Extra").as_deref(), Some("yes-extra"));
}

#[test]
fn reloading_an_embedded_resource_is_skipped() {
    let mut props = loader();
    props.load_resource("embedded/extra.properties").unwrap();
    props.load_resource("embedded/base.properties").unwrap();

    // The include of extra.properties was already loaded and is skipped.
    assert_eq!(props.keys(), vec!["Extra", "Embedded"]);
    assert_eq!(props.loaded_sources().count(), 2);
}
