use log::{debug, error};
use std::env;
use std::error::Error;
use std::io::{self, BufRead, Read, Write};
use uuid::Uuid;

use price_catalog::currency::{format_brl, format_percentage};
use price_catalog::pricing::parse_numeric_input;
use price_catalog::{
    generate_message, import_text, open_catalog, Action, AppConfig, CatalogError, CatalogStore,
    EditableField, FileSlots, ImportMode, Importer, Outcome,
};

const USAGE: &str = "\
Usage: price-catalog <command> [args]

Commands:
  import <file|-> [--llm] [--provider NAME] [--api-key KEY]
  list
  summary
  edit <id> <cost|margin|sale|margin-value|freight> <value>
  delete <id> [--yes]
  message
  set-freight <value>
  set-margin <value>";

type CliResult = Result<(), Box<dyn Error>>;

#[tokio::main]
async fn main() -> CliResult {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = AppConfig::load()?;
    let mut store = open_catalog(&config)?;
    debug!("Using storage at {}", store.storage().dir().display());

    let result = match command.as_str() {
        "import" => import(&mut store, &config, &args[1..]).await,
        "list" => {
            list(&store);
            Ok(())
        }
        "summary" => {
            summary(&store);
            Ok(())
        }
        "edit" => edit(&mut store, &args[1..]),
        "delete" => delete(&mut store, &args[1..]),
        "message" => {
            print!("{}", generate_message(store.products(), &config.message));
            Ok(())
        }
        "set-freight" => set_default(&mut store, &args[1..], Action::SetFreightDefault),
        "set-margin" => set_default(&mut store, &args[1..], Action::SetMarginDefault),
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            return Ok(());
        }
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn import(
    store: &mut CatalogStore<FileSlots>,
    config: &AppConfig,
    args: &[String],
) -> CliResult {
    let source = args.first().map(String::as_str).unwrap_or("-");
    let text = read_source(source)?;

    let outcome = if flag(args, "--llm") {
        let api_key = option(args, "--api-key")
            .map(String::from)
            .or_else(|| env::var("PRICE_CATALOG_API_KEY").ok())
            .ok_or("An API key is required (--api-key or PRICE_CATALOG_API_KEY)")?;
        let mut builder = Importer::builder().config(config.extraction.clone());
        if let Some(provider) = option(args, "--provider") {
            builder = builder.provider(provider);
        }
        let importer = builder.build()?;
        import_text(store, &importer, &text, ImportMode::Provider { api_key: &api_key }).await
    } else {
        import_text(store, &Importer::parser_only(), &text, ImportMode::Parser).await
    };

    match outcome {
        Ok(Outcome::Imported(report)) => println!(
            "{} produtos atualizados, {} produtos adicionados com sucesso!",
            report.updated, report.inserted
        ),
        Ok(_) => {}
        Err(CatalogError::ParseEmpty) => {
            println!("Nenhum produto encontrado no texto fornecido.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn list(store: &CatalogStore<FileSlots>) {
    for product in store.products() {
        println!(
            "{}  {:<32} {:>8}  custo {:>14}  margem {:>8} ({})  frete {:>11}  venda {:>14}",
            product.id,
            product.name,
            product.category,
            format_brl(product.cost_price),
            format_percentage(product.margin_percentage),
            format_brl(product.margin_value),
            format_brl(product.freight),
            format_brl(product.sale_price),
        );
    }
}

fn summary(store: &CatalogStore<FileSlots>) {
    let summary = store.summary();
    let settings = store.settings();
    println!("Produtos:        {}", summary.count);
    println!("Custo total:     {}", format_brl(summary.total_cost));
    println!("Margem total:    {}", format_brl(summary.total_margin));
    println!("Venda total:     {}", format_brl(summary.total_sale));
    println!("Frete padrão:    {}", format_brl(settings.freight_default));
    println!("Margem padrão:   {}", format_percentage(settings.margin_default));
}

fn edit(store: &mut CatalogStore<FileSlots>, args: &[String]) -> CliResult {
    let [id, field, value] = args else {
        return Err("Usage: edit <id> <field> <value>".into());
    };
    let id = parse_id(id)?;
    let field: EditableField = field.parse()?;

    match store.dispatch(Action::EditField {
        id,
        field,
        raw: value.clone(),
    })? {
        Outcome::Edited(product) => println!(
            "{}: custo {} margem {} ({}) venda {}",
            product.name,
            format_brl(product.cost_price),
            format_percentage(product.margin_percentage),
            format_brl(product.margin_value),
            format_brl(product.sale_price),
        ),
        _ => println!("Nada a alterar."),
    }
    Ok(())
}

fn delete(store: &mut CatalogStore<FileSlots>, args: &[String]) -> CliResult {
    let id = parse_id(args.first().ok_or("Usage: delete <id> [--yes]")?)?;
    let product = store.product(id).ok_or(CatalogError::ProductNotFound(id))?;

    let confirmed = flag(args, "--yes") || confirm(&format!("Deletar {}?", product.name));
    match store.dispatch(Action::Delete { id, confirmed }) {
        Ok(_) => println!("Produto deletado com sucesso"),
        Err(CatalogError::DeletionNotConfirmed) => println!("Cancelado."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn set_default(
    store: &mut CatalogStore<FileSlots>,
    args: &[String],
    action: fn(f64) -> Action,
) -> CliResult {
    let raw = args.first().ok_or("A value is required")?;
    let value = parse_numeric_input(raw)?;
    store.dispatch(action(value))?;
    Ok(())
}

fn read_source(source: &str) -> Result<String, Box<dyn Error>> {
    if source == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
            .map_err(|e| format!("Failed to read {}: {}", source, e).into())
    }
}

fn parse_id(raw: &str) -> Result<Uuid, Box<dyn Error>> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("Invalid product id '{}'", raw).into())
}

fn flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn option<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn confirm(question: &str) -> bool {
    print!("{} [s/N] ", question);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes")
}
