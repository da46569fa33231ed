use clap::Parser;
use path_templater::{Delimiters, Options, Templater, Value};
use tracing::Level;

/// Render a template (or evaluate one expression) against JSON data.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Template text, or an expression with --evaluate
    template: String,
    /// Primary data context as JSON
    #[arg(long, default_value = "{}")]
    data: String,
    /// Secondary data context as JSON (seen by `##@` functions)
    #[arg(long)]
    other: Option<String>,
    /// Delimiters in `open...close` form
    #[arg(long, default_value = "{...}")]
    delimiters: String,
    /// Evaluate a single expression and print its value as JSON
    #[arg(long)]
    evaluate: bool,
    /// Start with the path cache disabled
    #[arg(long)]
    no_cache: bool,
    /// Key the cache by a hash of the whole context
    #[arg(long)]
    strict_cache: bool,
    /// Limit on nested template re-entry
    #[arg(long)]
    max_depth: Option<usize>,
    /// Log debug output to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let data = read_json("--data", &args.data);
    let other = args.other.as_deref().map(|text| read_json("--other", text));
    let delimiters: Delimiters = args.delimiters.parse().unwrap_or_else(|e| fail(e));

    let options = Options {
        cache: !args.no_cache,
        cache_mode: if args.strict_cache {
            path_templater::CacheMode::Strict
        } else {
            path_templater::CacheMode::Approximate
        },
        max_depth: args.max_depth,
        delimiters,
    };
    let templater = Templater::with_options(options);

    if args.evaluate {
        match templater.evaluate(&args.template, &data, other.as_ref()) {
            Some(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => println!("{text}"),
                Err(e) => fail(e),
            },
            None => fail(format!("`{}` names no registered function", args.template)),
        }
    } else {
        println!("{}", templater.parse(&args.template, &data, other.as_ref()));
    }
}

fn read_json(flag: &str, text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| fail(format!("invalid JSON for {flag}: {e}")))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}
