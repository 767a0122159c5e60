use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use travel_search::config::Settings;
use travel_search::index::RemoteIndex;
use travel_search::nlu::GeminiClient;
use travel_search::{Assistant, ConstraintSet, Searcher, report};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "travel-search")]
#[command(version, about = "Find travel places for a question in Vietnamese, English, Chinese, Korean, or Japanese")]
struct Cli {
    /// The travel question
    question: String,

    /// Maximum number of places to return
    #[arg(short, long, default_value_t = 5)]
    limit: usize,

    /// Only keep places of this type
    #[arg(long)]
    place_type: Option<String>,

    /// Only keep places in this area
    #[arg(long)]
    region: Option<String>,

    /// Keyword the place should mention (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Price tier, e.g. "free"
    #[arg(long)]
    price: Option<String>,

    /// Do not ask the language model for constraints
    #[arg(long)]
    no_extract: bool,

    /// Print the reply as JSON
    #[arg(long)]
    json: bool,

    /// Settings file (default: ./travel-search.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Constraints given on the command line, or `None` to let the model infer them.
    fn constraints(&self) -> Option<ConstraintSet> {
        let given = ConstraintSet {
            place_type: self.place_type.clone(),
            region: self.region.clone(),
            keywords: self.keywords.clone(),
            price_tier: self.price.clone(),
        }
        .cleaned();
        (self.no_extract || !given.is_empty()).then_some(given)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("travel_search=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let question = cli.question.trim();
    if question.is_empty() {
        return Err("question must not be empty".into());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let http = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    let index = RemoteIndex::new(http.clone(), &settings.index)?;
    let nlu = GeminiClient::from_env(http)
        .inspect_err(|e| warn!("language model unavailable, using local detection only: {e}"))
        .ok()
        .map(|client| client.with_timeout(settings.nlu.timeout()));

    let searcher = Searcher::new(index, settings.ranking).with_timeout(settings.index.timeout());
    let assistant = Assistant::new(searcher, nlu).with_nlu_timeout(settings.nlu.timeout());

    info!(limit = cli.limit, "answering question");
    let reply = assistant
        .answer(question, cli.constraints(), cli.limit)
        .await
        .inspect_err(|e| tracing::error!("search failed: {e}"))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        print!("{}", report::format_reply(&reply, question));
    }
    Ok(())
}
