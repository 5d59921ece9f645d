use price_catalog::store::PRODUCTS_SLOT;
use price_catalog::{
    import_text, Action, BatchPolicy, CatalogError, CatalogStore, EditableField, ExtractedItem,
    FileSlots, ImportMode, Importer, ProductDraft, SlotStorage,
};
use std::fs;

fn draft(name: &str, price: f64) -> ProductDraft {
    ProductDraft::from(ExtractedItem {
        name: name.to_string(),
        price,
    })
}

fn seeded_store(dir: &std::path::Path) -> CatalogStore<FileSlots> {
    let mut store = CatalogStore::load(FileSlots::new(dir), BatchPolicy::Merge).unwrap();
    store.dispatch(Action::SetFreightDefault(45.0)).unwrap();
    store.dispatch(Action::SetMarginDefault(12.5)).unwrap();
    store
        .dispatch(Action::ImportBatch(vec![
            draft("iPhone 16 • 256GB", 3500.0),
            draft("Watch 10 • 46mm", 2100.0),
            draft("AirPods Pro 2", 1200.0),
        ]))
        .unwrap();
    store
}

#[test]
fn test_reload_reproduces_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = seeded_store(dir.path());
    let id = store.products()[1].id;
    store
        .dispatch(Action::EditField {
            id,
            field: EditableField::CostPrice,
            raw: "2.200,00".to_string(),
        })
        .unwrap();

    let reloaded = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Merge).unwrap();

    assert_eq!(reloaded.products(), store.products());
    assert_eq!(reloaded.settings(), store.settings());
    assert_eq!(reloaded.settings().freight_default, 45.0);
    assert_eq!(reloaded.settings().margin_default, 12.5);
    assert_eq!(reloaded.products()[1].sale_price, 2520.0);
}

#[test]
fn test_corrupt_products_slot_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    seeded_store(dir.path());
    fs::write(dir.path().join("products.json"), "[{\"broken\": ").unwrap();

    let reloaded = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Merge).unwrap();
    assert!(reloaded.products().is_empty());
    assert_eq!(reloaded.settings().freight_default, 45.0);
}

#[test]
fn test_failed_write_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_dir = dir.path().join("catalog");
    let mut store = seeded_store(&catalog_dir);
    let before = store.state().clone();

    // Replace the storage directory with a file so every write fails
    fs::remove_dir_all(&catalog_dir).unwrap();
    fs::write(&catalog_dir, "not a directory").unwrap();

    let id = store.products()[0].id;
    let result = store.dispatch(Action::Delete {
        id,
        confirmed: true,
    });

    assert!(matches!(result, Err(CatalogError::PersistenceFailure(_))));
    assert_eq!(store.state(), &before);
}

#[test]
fn test_every_mutation_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = seeded_store(dir.path());
    let slots = FileSlots::new(dir.path());
    let id = store.products()[0].id;

    store
        .dispatch(Action::EditField {
            id,
            field: EditableField::Freight,
            raw: "10".to_string(),
        })
        .unwrap();
    let saved = slots.read(PRODUCTS_SLOT).unwrap().unwrap();
    assert!(saved.contains("\"freight\":10.0"));

    store
        .dispatch(Action::Delete {
            id,
            confirmed: true,
        })
        .unwrap();
    let saved = slots.read(PRODUCTS_SLOT).unwrap().unwrap();
    assert!(!saved.contains(&id.to_string()));
}

#[test]
fn test_replace_policy_drops_unmatched_products() {
    let dir = tempfile::tempdir().unwrap();
    seeded_store(dir.path());

    let mut store = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Replace).unwrap();
    let iphone_id = store.products()[0].id;
    store
        .dispatch(Action::ImportBatch(vec![
            draft("iphone 16 256gb", 3400.0),
            draft("iPad Air", 4800.0),
        ]))
        .unwrap();

    assert_eq!(store.products().len(), 2);
    assert_eq!(store.products()[0].id, iphone_id);
    assert_eq!(store.products()[0].cost_price, 3400.0);
    assert_eq!(store.products()[1].name, "iPad Air");
}

#[test]
fn test_edits_keep_prices_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = seeded_store(dir.path());
    let id = store.products()[2].id;

    for (field, raw) in [
        (EditableField::CostPrice, "1.150,00"),
        (EditableField::MarginPercentage, "18"),
        (EditableField::Freight, "0"),
    ] {
        store
            .dispatch(Action::EditField {
                id,
                field,
                raw: raw.to_string(),
            })
            .unwrap();
        let product = store.product(id).unwrap();
        assert_eq!(product.sale_price, product.computed_sale_price());
        assert_eq!(
            product.margin_value,
            price_catalog::pricing::margin_value(product.cost_price, product.margin_percentage)
        );
    }

    let product = store.product(id).unwrap();
    assert_eq!(product.cost_price, 1150.0);
    assert_eq!(product.margin_value, 207.0);
    assert_eq!(product.sale_price, 1357.0);
}

#[tokio::test]
async fn test_oversized_prices_never_reach_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Merge).unwrap();
    let text = format!("iPhone 16: 1{}\nWatch 10: 2100", "0".repeat(305));

    import_text(&mut store, &Importer::parser_only(), &text, ImportMode::Parser)
        .await
        .unwrap();
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.products()[0].name, "Watch 10");

    let id = store.products()[0].id;
    let result = store.dispatch(Action::EditField {
        id,
        field: EditableField::CostPrice,
        raw: format!("1{}", "0".repeat(305)),
    });
    assert!(matches!(result, Err(CatalogError::InvalidNumericEdit(_))));

    let saved = FileSlots::new(dir.path())
        .read(PRODUCTS_SLOT)
        .unwrap()
        .unwrap();
    assert!(!saved.contains("null"));

    let reloaded = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Merge).unwrap();
    assert_eq!(reloaded.products(), store.products());
    assert_eq!(reloaded.products()[0].sale_price, 2415.0);
}

#[test]
fn test_duplicate_names_in_one_batch_keep_ids_unique() {
    let dir = tempfile::tempdir().unwrap();
    seeded_store(dir.path());
    let mut store = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Replace).unwrap();
    let airpods_id = store.products()[2].id;

    store
        .dispatch(Action::ImportBatch(vec![
            draft("AirPods Pro 2", 1150.0),
            draft("airpods-pro-2", 1100.0),
        ]))
        .unwrap();
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.products()[0].id, airpods_id);

    store
        .dispatch(Action::EditField {
            id: airpods_id,
            field: EditableField::CostPrice,
            raw: "1.000,00".to_string(),
        })
        .unwrap();
    let reloaded = CatalogStore::load(FileSlots::new(dir.path()), BatchPolicy::Replace).unwrap();
    assert_eq!(reloaded.products().len(), 1);
    assert_eq!(reloaded.products()[0].cost_price, 1000.0);
}
