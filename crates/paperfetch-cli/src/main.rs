use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use paperfetch_core::config_file::{delay_from_secs, load_config};
use paperfetch_core::{Config, HeadlessBrowser, HttpBrowser, PaperRecord, PaperResolver};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Exit status when the lookup ran but found nothing.
const EXIT_NOT_FOUND: u8 = 2;

/// Paper Fetch - Look up paper metadata on Semantic Scholar
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the record as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Semantic Scholar API key
    #[arg(long, global = true)]
    s2_api_key: Option<String>,

    /// Seconds between REST API requests (0 disables spacing)
    #[arg(long, global = true)]
    api_delay: Option<f64>,

    /// Seconds between search page loads (0 disables spacing)
    #[arg(long, global = true)]
    search_delay: Option<f64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a paper by arXiv id (a version suffix is ignored)
    Arxiv {
        /// arXiv identifier, e.g. 1805.09547 or 1805.09547v2
        id: String,
    },

    /// Look up a paper by Semantic Scholar paper id
    S2 {
        /// 40-character Semantic Scholar paper id
        id: String,
    },

    /// Search by title, optionally narrowed by first author
    Search {
        /// Paper title
        title: String,

        /// First author's name
        #[arg(long)]
        author: Option<String>,

        /// Only accept a result whose title and first author both match
        #[arg(long, requires = "author")]
        exact: bool,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_NOT_FOUND),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("paperfetch_core={level},paperfetch={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns whether a record was found.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = resolve_config(&cli);
    tracing::debug!(?config, "resolved configuration");

    let browser: Box<dyn HeadlessBrowser> = match &cli.command {
        Command::Search { .. } => open_browser(&config)?,
        // Id lookups never navigate; skip launching a real browser.
        _ => Box::new(HttpBrowser::new(&config.user_agent, config.http_timeout())?),
    };
    let mut resolver = PaperResolver::new(&config, browser)?;

    let (query, record) = match &cli.command {
        Command::Arxiv { id } => (id.clone(), resolver.fetch_from_arxiv_id(id)?),
        Command::S2 { id } => (id.clone(), resolver.fetch_from_s2_id(id)?),
        Command::Search {
            title,
            author,
            exact,
        } => {
            let record = match (author.as_deref(), *exact) {
                (Some(author), true) => resolver.search_exact(title, author)?,
                (author, _) => resolver.search_best(title, author)?,
            };
            (title.clone(), record)
        }
    };

    let color = ColorMode(!cli.no_color && !cli.json);
    report(&mut std::io::stdout(), &query, record.as_ref(), cli.json, color)?;
    Ok(record.is_some())
}

/// Defaults, then config files, then environment and flags.
fn resolve_config(cli: &Cli) -> Config {
    let mut config = load_config().apply(Config::default());

    if let Some(key) = cli
        .s2_api_key
        .clone()
        .or_else(|| std::env::var("S2_API_KEY").ok())
        .filter(|k| !k.is_empty())
    {
        config.s2_api_key = Some(key);
    }
    if let Some(secs) = cli.api_delay {
        config.api_delay = delay_from_secs(secs);
    }
    if let Some(secs) = cli.search_delay {
        config.search_delay = delay_from_secs(secs);
    }
    config
}

#[cfg(feature = "chromium")]
fn open_browser(config: &Config) -> anyhow::Result<Box<dyn HeadlessBrowser>> {
    use paperfetch_core::browser::chromium::ChromiumBrowser;
    let browser = ChromiumBrowser::launch(config.browser_user_agent.as_deref())?;
    Ok(Box::new(browser))
}

#[cfg(not(feature = "chromium"))]
fn open_browser(config: &Config) -> anyhow::Result<Box<dyn HeadlessBrowser>> {
    tracing::warn!(
        "built without the `chromium` feature; search results that need JavaScript to render will not be found"
    );
    Ok(Box::new(HttpBrowser::new(
        config.search_user_agent(),
        config.http_timeout(),
    )?))
}

fn report(
    w: &mut dyn Write,
    query: &str,
    record: Option<&PaperRecord>,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *w, &record)?;
        writeln!(w)?;
        return Ok(());
    }
    match record {
        Some(record) => output::print_record(w, record, color)?,
        None => output::print_not_found(w, query, color)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PaperRecord {
        PaperRecord {
            id: "d0d084fb94c54a9d7cb468cacb6f69d257d3ca49".into(),
            title: "Interpretable and Compositional Relation Learning".into(),
            authors: vec!["Ryo Takahashi".into(), "Ran Tian".into()],
            abstract_text: Some("Embedding models.".into()),
            year: Some(2018),
            venue: Some("ACL".into()),
            url: "https://www.semanticscholar.org/paper/d0d084fb94c54a9d7cb468cacb6f69d257d3ca49"
                .into(),
            arxiv_id: Some("1805.09547".into()),
            arxiv_url: Some("https://arxiv.org/abs/1805.09547".into()),
            figure_urls: vec!["https://figures.example/1-Figure1-1.png".into()],
            table_urls: vec![],
        }
    }

    fn render(record: Option<&PaperRecord>, json: bool) -> String {
        let mut buf = Vec::new();
        report(&mut buf, "query", record, json, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn default_build_searches_with_chromium() {
        assert!(cfg!(feature = "chromium"));
    }

    #[test]
    fn exact_requires_author() {
        assert!(Cli::try_parse_from(["paperfetch", "search", "A Title", "--exact"]).is_err());
        assert!(
            Cli::try_parse_from(["paperfetch", "search", "A Title", "--exact", "--author", "A B"])
                .is_ok()
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["paperfetch", "arxiv", "1805.09547", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Arxiv { ref id } if id == "1805.09547"));
    }

    #[test]
    fn text_report_lists_fields() {
        let text = render(Some(&record()), false);
        assert!(text.starts_with("Interpretable and Compositional Relation Learning\n"));
        assert!(text.contains("  Authors: Ryo Takahashi, Ran Tian"));
        assert!(text.contains("  Published: 2018, ACL"));
        assert!(text.contains("  arXiv: https://arxiv.org/abs/1805.09547"));
        assert!(text.contains("  Figures (1):"));
        assert!(!text.contains("Tables"));
    }

    #[test]
    fn json_report_uses_abstract_key() {
        let value: serde_json::Value = serde_json::from_str(&render(Some(&record()), true)).unwrap();
        assert_eq!(value["abstract"], "Embedding models.");
        assert_eq!(value["year"], 2018);
    }

    #[test]
    fn not_found_reports() {
        assert_eq!(render(None, false), "NOT FOUND: query\n");
        assert_eq!(render(None, true), "null\n");
    }

    #[test]
    fn delay_flags_parse_as_seconds() {
        let cli =
            Cli::try_parse_from(["paperfetch", "s2", "abc", "--api-delay", "0.5", "--search-delay", "0"])
                .unwrap();
        assert_eq!(cli.api_delay, Some(0.5));
        assert_eq!(cli.search_delay, Some(0.0));
    }
}
