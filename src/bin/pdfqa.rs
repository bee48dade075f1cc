//! CLI binary for edgequake-pdfqa.
//!
//! A thin shim over the library crate that maps CLI flags to `QaConfig`
//! and prints answers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_pdfqa::pipeline::input::load_input;
use edgequake_pdfqa::{
    extract_text, search_web, Answer, Assistant, DuckDuckGoSearch, QaConfig, Task,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ask a question about a local PDF
  pdfqa ask report.pdf "What are the key findings?"

  # Ground the answer with live web results
  pdfqa ask --web report.pdf "How does this compare to last year?"

  # Summarise / quiz a PDF from a URL
  pdfqa summarize https://arxiv.org/pdf/1706.03762
  pdfqa quiz lecture.pdf

  # Upload once, then ask many questions
  pdfqa chat handbook.pdf

  # Raw building blocks
  pdfqa extract report.pdf > report.txt
  pdfqa search "rust ownership" --max-results 5

CHAT COMMANDS:
  <question>        answer from the document
  /web <question>   answer from the document plus web results
  /summary          summarise the document
  /quiz             generate a five-question quiz
  /quit             leave

ENVIRONMENT VARIABLES:
  OPENROUTER_API_KEY  Bearer credential for the chat-completions endpoint
  PDFQA_MODEL         Model ID (default: stepfun/step-3.5-flash:free)
  PDFQA_ENDPOINT      Any OpenAI-compatible chat-completions URL
  PDFQA_PROVIDER      Use an edgequake-llm provider instead (openai, anthropic,
                      gemini, ollama); reads that provider's own key variable
  PDFIUM_LIB_PATH     Path to libpdfium
"#;

/// Ask questions about PDF documents using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about PDF files using an LLM, optionally grounded with web search",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// LLM model ID.
    #[arg(long, global = true, env = "PDFQA_MODEL")]
    model: Option<String>,

    /// Chat-completions endpoint URL.
    #[arg(long, global = true, env = "PDFQA_ENDPOINT")]
    endpoint: Option<String>,

    /// edgequake-llm provider name; overrides --endpoint.
    #[arg(long, global = true, env = "PDFQA_PROVIDER")]
    provider: Option<String>,

    /// Bearer credential for --endpoint.
    #[arg(long, global = true, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM request timeout in seconds.
    #[arg(long, global = true, env = "PDFQA_API_TIMEOUT", default_value_t = 30)]
    api_timeout: u64,

    /// Web results folded into the context.
    #[arg(long, global = true, env = "PDFQA_MAX_RESULTS", default_value_t = 3)]
    max_results: usize,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, global = true, env = "PDFQA_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print answers as JSON (kind + content or error fields).
    #[arg(long, global = true, env = "PDFQA_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDFQA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, global = true, env = "PDFQA_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the extracted text of a PDF.
    Extract {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
    },
    /// Answer one question about a PDF.
    Ask {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
        question: String,
        /// Add web-search snippets to the context.
        #[arg(long)]
        web: bool,
    },
    /// Summarise a PDF.
    Summarize {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
    },
    /// Generate a multiple-choice quiz from a PDF.
    Quiz {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
    },
    /// Print the web snippet blob for a query.
    Search { query: String },
    /// Upload a PDF once, then answer questions from stdin.
    Chat {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    match &cli.command {
        Command::Extract { input } => {
            let loaded = load_input(input, config.download_timeout_secs)
                .await
                .context("Failed to read input")?;
            let doc = with_spinner(&cli, "Extracting text…", extract_text(loaded.bytes))
                .await
                .context("Extraction failed")?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&doc).context("Failed to serialise output")?
                );
            } else {
                print!("{}", doc.text);
                io::stdout().flush().ok();
                if !cli.quiet {
                    eprintln!(
                        "{} {}/{} pages with text, {} chars",
                        green("✔"),
                        doc.pages_with_text,
                        doc.page_count,
                        doc.text.chars().count()
                    );
                }
            }
        }
        Command::Search { query } => {
            let search =
                DuckDuckGoSearch::from_config(&config).context("Invalid search configuration")?;
            let blob = with_spinner(
                &cli,
                "Searching the web…",
                search_web(&search, query, config.search_max_results),
            )
            .await;
            println!("{}", blob.trim_start());
        }
        Command::Ask { input, question, web } => {
            let assistant = open(&cli, config, input).await?;
            let task = if *web { Task::QaWithWeb } else { Task::Qa };
            let answer = with_spinner(&cli, "Thinking…", assistant.run(task, Some(question)))
                .await
                .context("Question failed")?;
            print_answer(&cli, &answer)?;
        }
        Command::Summarize { input } => {
            let assistant = open(&cli, config, input).await?;
            let answer = with_spinner(&cli, "Summarising…", assistant.summarize())
                .await
                .context("Summary failed")?;
            print_answer(&cli, &answer)?;
        }
        Command::Quiz { input } => {
            let assistant = open(&cli, config, input).await?;
            let answer = with_spinner(&cli, "Writing quiz…", assistant.generate_quiz())
                .await
                .context("Quiz generation failed")?;
            print_answer(&cli, &answer)?;
        }
        Command::Chat { input } => {
            let assistant = open(&cli, config, input).await?;
            chat_loop(&cli, &assistant).await?;
        }
    }

    Ok(())
}

/// Map CLI args to `QaConfig`.
fn build_config(cli: &Cli) -> Result<QaConfig> {
    let mut builder = QaConfig::builder()
        .api_timeout_secs(cli.api_timeout)
        .search_max_results(cli.max_results)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }

    builder.build().context("Invalid configuration")
}

/// Build the assistant and upload `input` into its session.
async fn open(cli: &Cli, config: QaConfig, input: &str) -> Result<Assistant> {
    let assistant = Assistant::new(config).context("Failed to initialise LLM backend")?;
    let doc = with_spinner(cli, "Reading PDF…", assistant.upload_input(input))
        .await
        .with_context(|| format!("Failed to load '{input}'"))?;

    if !cli.quiet {
        eprintln!(
            "{} PDF '{}' uploaded successfully  {}",
            green("✔"),
            bold(&doc.filename),
            dim(&format!("{} chars", doc.text.chars().count()))
        );
    }
    Ok(assistant)
}

/// Interactive loop: one line in, one answer out.
async fn chat_loop(cli: &Cli, assistant: &Assistant) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if !cli.quiet {
            eprint!("{} ", bold("›"));
            io::stderr().flush().ok();
        }
        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        let (task, question) = match parse_chat_line(&line) {
            ChatLine::Skip => continue,
            ChatLine::Quit => break,
            ChatLine::Usage(hint) => {
                eprintln!("{} {}", dim("usage:"), hint);
                continue;
            }
            ChatLine::Run(task, question) => (task, question),
        };

        match with_spinner(cli, "Thinking…", assistant.run(task, question)).await {
            Ok(answer) => print_answer(cli, &answer)?,
            // Hard errors end this turn, not the session.
            Err(e) => eprintln!("{} {}", red("✗"), e),
        }
    }
    Ok(())
}

/// One line of chat input, interpreted.
#[derive(Debug, PartialEq)]
enum ChatLine<'a> {
    Skip,
    Quit,
    Usage(&'static str),
    Run(Task, Option<&'a str>),
}

fn parse_chat_line(line: &str) -> ChatLine<'_> {
    let line = line.trim();
    match line {
        "" => ChatLine::Skip,
        "/quit" | "/exit" => ChatLine::Quit,
        "/summary" => ChatLine::Run(Task::Summarize, None),
        "/quiz" => ChatLine::Run(Task::Quiz, None),
        "/web" => ChatLine::Usage("/web <question>"),
        _ => match line.strip_prefix("/web ") {
            Some(q) => ChatLine::Run(Task::QaWithWeb, Some(q.trim())),
            None => ChatLine::Run(Task::Qa, Some(line)),
        },
    }
}

/// Print an answer. Soft errors are printed like any other answer, with a
/// marker on stderr.
fn print_answer(cli: &Cli, answer: &Answer) -> Result<()> {
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(answer).context("Failed to serialise answer")?
        );
        return Ok(());
    }
    if !answer.is_ok() && !cli.quiet {
        eprintln!("{} the LLM request failed; showing the error as returned", red("⚠"));
    }
    println!("{answer}");
    Ok(())
}

/// Drive `fut` while a spinner runs on stderr (unless quiet or JSON).
async fn with_spinner<F: Future>(cli: &Cli, message: &'static str, fut: F) -> F::Output {
    if cli.quiet || cli.json {
        return fut.await;
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    let out = fut.await;
    bar.finish_and_clear();
    out
}
