use anyhow::{bail, Context, Result};
use pims::{init_tracing, CloudKind, Config, QuoteForm, Services};
use std::env;

const USAGE: &str = "\
Usage:
  pims list impacts|quotes
  pims cloud impacts|quotes|entities
  pims register
  pims submit-quote <name> <org> <quote>";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    if args.is_empty() || args[0] == "help" || args[0] == "--help" {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::from_env().context("Invalid configuration")?;
    let services = Services::from_config(&config)?;

    match args.as_slice() {
        ["list", "impacts"] => run_list_impacts(&services).await,
        ["list", "quotes"] => run_list_quotes(&services).await,
        ["cloud", kind] => {
            let kind = CloudKind::parse(kind)
                .with_context(|| format!("Unknown word cloud: {}\n{}", kind, USAGE))?;
            run_cloud(&services, kind).await
        }
        ["register"] => run_register(&services).await,
        ["submit-quote", name, org, quote] => run_submit_quote(&services, name, org, quote).await,
        _ => bail!("Unknown command\n{}", USAGE),
    }
}

async fn run_list_impacts(services: &Services) -> Result<()> {
    let cards = services.display.impact_cards().await?;
    println!("📣 {} impact entries (newest first)\n", cards.len());

    for card in cards {
        println!("#{} [{:?}] {}", card.entry.id, card.style, card.heading());
        println!("   {}", card.entry.blurb);
        if let Some(link) = &card.entry.link {
            println!("   {}", link);
        }
    }

    Ok(())
}

async fn run_list_quotes(services: &Services) -> Result<()> {
    let quotes = services.display.quotes().await?;
    println!("💬 {} quotes (newest first)\n", quotes.len());

    for q in quotes {
        println!("#{} \"{}\" - {}, {}", q.id, q.quote, q.name, q.org);
    }

    Ok(())
}

async fn run_cloud(services: &Services, kind: CloudKind) -> Result<()> {
    let freq = services.cloud(kind).await?;

    if freq.is_empty() {
        println!("No words for the {:?} cloud yet.", kind);
        return Ok(());
    }

    for w in &freq.words {
        println!("{:>5}  {}", w.count, w.word);
    }

    Ok(())
}

async fn run_register(services: &Services) -> Result<()> {
    let register = services.register().await?;
    let projects = register.impact_projects();
    println!(
        "📋 {} projects, {} with impact to report\n",
        register.rows.len(),
        projects.len()
    );

    for row in projects {
        println!("{}  {} ({}, {})", row.code, row.title, row.lead_org, row.lead);
        if !row.impact.is_empty() {
            println!("      {}", row.impact);
        }
    }

    Ok(())
}

async fn run_submit_quote(services: &Services, name: &str, org: &str, quote: &str) -> Result<()> {
    let form = QuoteForm {
        name: name.to_string(),
        org: org.to_string(),
        quote: quote.to_string(),
    };

    let draft = form.validate()?;
    let saved = services.pipeline.submit_quote(draft).await?;
    println!("✓ Quote saved with id {}", saved.id);

    Ok(())
}
