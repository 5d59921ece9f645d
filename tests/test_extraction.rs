use mockito::{Matcher, Server};
use serde_json::json;

use price_catalog::{
    import_text, Action, BatchPolicy, CatalogError, CatalogStore, Category, ExtractedItem,
    ImportMode, ImportReport, Importer, MemorySlots, Outcome, ProductDraft,
};

const PASTED: &str = "Bom dia! Segue a lista:\niPhone 16 256GB por 3.400\nAirPods 4 saindo a 899,90";

fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    })
    .to_string()
}

fn seeded_store() -> CatalogStore<MemorySlots> {
    let mut store = CatalogStore::load(MemorySlots::new(), BatchPolicy::Merge).unwrap();
    store
        .dispatch(Action::ImportBatch(vec![ProductDraft {
            name: "iPhone 16 • 256GB".to_string(),
            cost_price: 3500.0,
            margin_percentage: Some(10.0),
            freight: Some(50.0),
            category: Some(Category::IPhone),
        }]))
        .unwrap();
    store
}

#[tokio::test]
async fn test_gemini_import_updates_and_inserts() {
    let mut server = Server::new_async().await;
    let answer = "```json\n[\n  {\"name\": \"iPhone 16 - 256GB\", \"price\": \"3.400,00\"},\n  {\"name\": \"AirPods 4\", \"price\": 899.9},\n  {\"name\": \"\", \"price\": 10}\n]\n```";
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::Regex("AirPods 4 saindo".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(answer))
        .create_async()
        .await;

    let importer = Importer::builder()
        .provider("google")
        .base_url(server.url())
        .build()
        .unwrap();
    let mut store = seeded_store();
    let existing_id = store.products()[0].id;

    let outcome = import_text(
        &mut store,
        &importer,
        PASTED,
        ImportMode::Provider { api_key: "test-key" },
    )
    .await
    .unwrap();

    mock.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::Imported(ImportReport {
            updated: 1,
            inserted: 1
        })
    );

    let products = store.products();
    assert_eq!(products.len(), 2);

    // matched by normalized name; margin and freight carried over
    assert_eq!(products[0].id, existing_id);
    assert_eq!(products[0].name, "iPhone 16 - 256GB");
    assert_eq!(products[0].cost_price, 3400.0);
    assert_eq!(products[0].margin_percentage, 10.0);
    assert_eq!(products[0].freight, 50.0);
    assert_eq!(products[0].sale_price, 3790.0);

    // new products take the catalog defaults
    assert_eq!(products[1].name, "AirPods 4");
    assert_eq!(products[1].category, Category::AirPods);
    assert_eq!(products[1].margin_percentage, 20.0);
    assert_eq!(products[1].freight, 0.0);
    assert!(!importer.is_busy());
}

#[tokio::test]
async fn test_openai_import() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "message": { "content": "[{\"name\": \"Watch Ultra 2\", \"price\": 5100}]" }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let importer = Importer::builder()
        .provider("openai")
        .base_url(server.url())
        .build()
        .unwrap();
    let mut store = CatalogStore::load(MemorySlots::new(), BatchPolicy::Merge).unwrap();

    import_text(
        &mut store,
        &importer,
        "Watch Ultra 2 5.100",
        ImportMode::Provider { api_key: "sk-test" },
    )
    .await
    .unwrap();

    mock.assert_async().await;
    assert_eq!(store.products().len(), 1);
    assert_eq!(store.products()[0].cost_price, 5100.0);
    assert_eq!(store.products()[0].sale_price, 6120.0);
}

#[tokio::test]
async fn test_service_error_imports_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let importer = Importer::builder()
        .provider("google")
        .base_url(server.url())
        .build()
        .unwrap();
    let mut store = seeded_store();
    let before = store.state().clone();

    let result = import_text(
        &mut store,
        &importer,
        PASTED,
        ImportMode::Provider { api_key: "test-key" },
    )
    .await;

    mock.assert_async().await;
    assert!(matches!(result, Err(CatalogError::ParseEmpty)));
    assert_eq!(store.state(), &before);
}

#[tokio::test]
async fn test_unusable_answers_import_nothing() {
    for answer in [
        "Desculpe, não encontrei produtos.",
        "{\"name\": \"iPhone 16\", \"price\": 3500}",
        "[{\"name\": \"iPhone 16\", \"price\": -1}, {\"price\": 20}]",
    ] {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(gemini_body(answer))
            .create_async()
            .await;

        let importer = Importer::builder()
            .provider("google")
            .base_url(server.url())
            .build()
            .unwrap();
        let mut store = seeded_store();

        let result = import_text(
            &mut store,
            &importer,
            PASTED,
            ImportMode::Provider { api_key: "test-key" },
        )
        .await;

        assert!(matches!(result, Err(CatalogError::ParseEmpty)), "{}", answer);
        assert_eq!(store.products().len(), 1);
    }
}

#[test]
fn test_parse_items_accepts_brazilian_string_prices() {
    let items = price_catalog::extraction::parse_items(
        "[{\"name\": \"iPad Air\", \"price\": \"4.899,90\"}, {\"name\": \"Mac mini\", \"price\": 5200}]",
    )
    .unwrap();
    assert_eq!(
        items,
        vec![
            ExtractedItem {
                name: "iPad Air".to_string(),
                price: 4899.9
            },
            ExtractedItem {
                name: "Mac mini".to_string(),
                price: 5200.0
            },
        ]
    );
}
