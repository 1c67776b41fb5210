use clap::Parser as _;
use ingredient_parser::{
    IngredientParser, InMemoryKnowledgeBase, Parser, ParserConfig, ParserKind,
};
use log::{debug, error};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

#[derive(clap::Parser, Debug)]
#[command(name = "ingredient-parser", version)]
#[command(about = "Parse recipe ingredient lines into structured JSON")]
#[command(
    after_help = "Settings are read from ingredient-parser.toml and INGREDIENT_PARSER__* environment variables."
)]
struct Args {
    /// Use the LLM-assisted parser
    #[arg(long, conflicts_with = "rules")]
    llm: bool,

    /// Use the rule-based parser
    #[arg(long)]
    rules: bool,

    /// Knowledge base JSON file to load instead of the configured one
    #[arg(long = "kb", value_name = "PATH")]
    knowledge_base: Option<PathBuf>,

    /// Ingredient lines to parse; stdin is read when none are given
    lines: Vec<String>,
}

impl Args {
    fn strategy(&self) -> Option<ParserKind> {
        match (self.llm, self.rules) {
            (true, _) => Some(ParserKind::Llm),
            (_, true) => Some(ParserKind::Rules),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let config = ParserConfig::load()?;
    debug!("Loaded configuration: {:?}", config.strategy);

    let mut builder = Parser::builder().config(config);
    if let Some(strategy) = args.strategy() {
        builder = builder.strategy(strategy);
    }
    if let Some(path) = &args.knowledge_base {
        builder = builder.knowledge_base(Arc::new(InMemoryKnowledgeBase::from_path(path).await?));
    }
    let parser = builder.build().await?;

    if args.lines.is_empty() {
        let mut lines = BufReader::new(stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                print_parsed(parser.as_ref(), &line).await;
            }
        }
    } else {
        for line in &args.lines {
            print_parsed(parser.as_ref(), line).await;
        }
    }

    Ok(())
}

async fn print_parsed(parser: &dyn IngredientParser, line: &str) {
    let parsed = parser.parse(line).await;
    match serde_json::to_string_pretty(&parsed) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize result for '{}': {}", line, e),
    }
}
