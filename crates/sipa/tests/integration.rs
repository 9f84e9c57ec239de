//! Integration tests - full pipeline from config to rendered, stored state
//!
//! Config → App → components → DOM → storage → restored component

use std::fs;

use sipa::{
    app_from_config, init_logging, listener, serialize, storage_from_config, Component,
    ComponentClass, ComponentOptions, Config, LifecycleEvent, LogConfig, Map, Storage, Value,
};

fn define_cart(app: &sipa::App) {
    app.define(ComponentClass::new("CartLine", "cart-line", |ctx| {
        format!(
            r#"<li data-sku="{}">{} x {}</li>"#,
            ctx.attr("sku"),
            ctx.text("qty"),
            ctx.text("name")
        )
    }))
    .unwrap();
    app.define(
        ComponentClass::new("Cart", "shop-cart", |ctx| {
            format!(
                concat!(
                    r#"<div class="cart">"#,
                    r#"<header><slot name="title"></slot></header>"#,
                    r#"<ul><cart-line sipa-alias="apples" sku="'A1'" name="'Apple'" qty="2"></cart-line></ul>"#,
                    "<footer>{}</footer>",
                    "</div>"
                ),
                ctx.text("note")
            )
        })
        .with_defaults([("note", "")].into_iter().collect::<Map>())
        .with_events(["checkout"]),
    )
    .unwrap();
}

/// Data without child references, ready for storage
fn storable(component: &Component) -> Value {
    let data = component.data().unwrap();
    Value::Object(data.into_iter().filter(|(_, v)| !v.is_handle()).collect())
}

// ============================================================================
// CONFIG TO APP
// ============================================================================

#[test]
fn test_app_from_config() {
    let config = Config::from_json(r#"{ "document_url": "https://shop.example/cart" }"#).unwrap();
    let app = app_from_config(&config);
    define_cart(&app);

    let cart = app
        .create(
            "Cart",
            Value::Undefined,
            ComponentOptions::new().with_content(r#"<h2 slot="title">Basket</h2>"#),
        )
        .unwrap();
    cart.append(app.body().unwrap()).unwrap();

    let html = app.html();
    assert!(html.contains(r#"<header><h2 slot="title">Basket</h2></header>"#));
    assert!(html.contains(r#"<li data-sku="A1" sipa-id="2">2 x Apple</li>"#));
}

#[test]
fn test_config_file() {
    let dir = std::env::temp_dir().join(format!("sipa-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sipa.json");
    fs::write(&path, r#"{ "validate_custom_triggers": false, "log": { "with_target": true } }"#).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(!config.validate_custom_triggers);
    assert!(config.log.with_target);
    assert!(!config.app_config().validate_custom_triggers);

    assert!(Config::from_file(dir.join("missing.json")).is_err());
}

#[test]
fn test_unvalidated_triggers_from_config() {
    let config = Config::from_json(r#"{ "validate_custom_triggers": false }"#).unwrap();
    let app = app_from_config(&config);
    define_cart(&app);
    let cart = app.create("Cart", Value::Undefined, ComponentOptions::new()).unwrap();

    assert!(cart.trigger("not-declared", Vec::new()).is_ok());
}

#[test]
fn test_init_logging_twice_is_harmless() {
    let config = LogConfig::default();
    init_logging(&config);
    assert!(!init_logging(&config));
}

// ============================================================================
// STATE ROUND TRIP
// ============================================================================

#[test]
fn test_component_state_survives_storage() {
    let dir = std::env::temp_dir().join(format!("sipa-store-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let mut config = Config::default();
    config.storage.local_path = Some(dir.join("state.json"));

    let app = app_from_config(&config);
    define_cart(&app);
    let cart = app
        .create(
            "Cart",
            [
                ("note", Value::from("ship friday")),
                ("since", Value::date_from_millis(1_704_164_645_678).unwrap()),
                ("discount", Value::Number(f64::NAN)),
            ]
            .into_iter()
            .collect::<Map>()
            .into(),
            ComponentOptions::new(),
        )
        .unwrap();
    cart.append(app.body().unwrap()).unwrap();

    // Child references are not storable as-is
    assert!(serialize(&Value::Object(cart.data().unwrap())).is_err());

    let mut storage = storage_from_config(&config).unwrap();
    storage.set("cart", &storable(&cart)).unwrap();

    let restored_data = Storage::local(dir.join("state.json")).unwrap().get("cart").unwrap();
    let fresh = sipa::App::headless();
    define_cart(&fresh);
    let restored = fresh
        .create("Cart", restored_data.clone(), ComponentOptions::new())
        .unwrap();

    assert_eq!(storable(&restored), restored_data);
    assert!(restored.html().unwrap().contains("<footer>ship friday</footer>"));
}

#[test]
fn test_checkout_event_updates_footer() {
    let app = sipa::App::headless();
    define_cart(&app);
    let cart = app.create("Cart", Value::Undefined, ComponentOptions::new()).unwrap();
    cart.append(app.body().unwrap()).unwrap();

    cart.subscribe(
        "checkout",
        listener(|event: &mut LifecycleEvent| {
            let total = event.args.first().and_then(Value::as_f64).unwrap_or(0.0);
            let note: Map = [("note", Value::from(format!("paid {total}")))].into_iter().collect();
            event.component.update(note.into())?;
            Ok(())
        }),
    )
    .unwrap();

    cart.trigger("checkout", vec![Value::from(12)]).unwrap();
    assert!(app.html().contains("<footer>paid 12</footer>"));
}
