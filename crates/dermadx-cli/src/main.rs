mod display;
mod serve;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use dermadx_ai::{ClassifierError, ImageClassifier, SkinClassifier};
use dermadx_core::{DiagnosticSession, Mode};
use dermadx_flow::{
    DiagnosticFlow, ask_health_question, collect_answers, plan_or_fallback, predict_from_text,
};
use dermadx_llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient, LlmConfig, TextGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dermadx", version, about = "Skin-condition diagnostic assistant")]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,

    /// ONNX export of the skin-lesion classifier.
    #[arg(
        long,
        env = "DERMADX_CHECKPOINT",
        default_value = "models/skin_disease_model.onnx",
        global = true
    )]
    checkpoint: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct LlmArgs {
    /// Gemini API key.
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[arg(long, env = "DERMADX_MODEL", default_value = DEFAULT_MODEL, global = true)]
    model: String,

    #[arg(long, env = "DERMADX_LLM_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Per-request timeout for the text-generation service.
    #[arg(long, env = "DERMADX_LLM_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a skin image with the local model
    Classify {
        image: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Predict candidate diseases from a symptom description
    Predict {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run a full diagnostic session, asking follow-up questions on stdin
    Diagnose {
        /// Symptom description.
        #[arg(long)]
        text: Option<String>,
        /// Photo of the affected skin.
        #[arg(long)]
        image: Option<PathBuf>,
        /// Image-only capture session.
        #[arg(long, requires = "image", conflicts_with = "text")]
        live: bool,
        /// Print the finished session as JSON instead of cards.
        #[arg(long)]
        json: bool,
    },
    /// Generate a treatment plan for a named disease
    Treatment {
        #[arg(required = true, num_args = 1..)]
        disease: Vec<String>,
    },
    /// Ask a short women's-health question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long, env = "DERMADX_BIND", default_value = "0.0.0.0:5000")]
        bind: String,
        /// Front-end origin allowed by CORS.
        #[arg(long, env = "DERMADX_CORS_ORIGIN", default_value = "http://localhost:3000")]
        cors_origin: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so `--json` output stays clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dermadx=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Classify { image, json } => {
            let classifier = load_classifier(&cli.checkpoint)?;
            let bytes = read_image(&image)?;
            let candidate = classifier
                .classify_bytes(&bytes)
                .with_context(|| format!("classifying {}", image.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&candidate)?);
            } else {
                display::print_candidates("Image Prediction", std::slice::from_ref(&candidate));
            }
        }

        Command::Predict { description, json } => {
            let generator = build_generator(&cli.llm)?;
            let candidates = predict_from_text(&*generator, &description.join(" "))
                .await
                .context("predicting from description")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&candidates)?);
            } else {
                display::print_candidates("Text Predictions", &candidates);
            }
        }

        Command::Diagnose {
            text,
            image,
            live,
            json,
        } => {
            if text.is_none() && image.is_none() {
                bail!("provide --text, --image, or both");
            }
            let flow = DiagnosticFlow::new(build_generator(&cli.llm)?);
            let mode = if live { Mode::LiveAr } else { Mode::ImageText };

            let image_candidate = match &image {
                Some(path) => {
                    let classifier = load_classifier(&cli.checkpoint)?;
                    let bytes = read_image(path)?;
                    Some(
                        classifier
                            .classify_bytes(&bytes)
                            .with_context(|| format!("classifying {}", path.display()))?,
                    )
                }
                None => None,
            };

            let mut session = DiagnosticSession::new(mode);
            flow.analyze(&mut session, text.as_deref(), image_candidate)
                .await
                .context("analysing inputs")?;

            if !json {
                display::print_candidates("Candidate Diagnoses", session.candidates());
            }

            let answers = collect_answers(session.followup_questions(), prompt_stdin);
            flow.submit_answers(&mut session, &answers)?;
            flow.finalize(&mut session)
                .await
                .context("resolving final diagnosis")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                display::print_session(&session);
            }
        }

        Command::Treatment { disease } => {
            let generator = build_generator(&cli.llm)?;
            let disease = disease.join(" ");
            let plan = plan_or_fallback(&*generator, &disease).await;
            display::print_treatment(&disease, &plan);
        }

        Command::Ask { question } => {
            let generator = build_generator(&cli.llm)?;
            let answer = ask_health_question(&*generator, &question.join(" "))
                .await
                .context("asking health question")?;
            println!("{answer}");
        }

        Command::Serve { bind, cors_origin } => {
            let flow = DiagnosticFlow::new(build_generator(&cli.llm)?);
            let classifier: Option<Arc<dyn ImageClassifier>> =
                match SkinClassifier::load(&cli.checkpoint) {
                    Ok(c) => Some(Arc::new(c)),
                    Err(ClassifierError::CheckpointNotFound(path)) => {
                        tracing::warn!(
                            checkpoint = %path.display(),
                            "checkpoint not found, image uploads will be rejected"
                        );
                        None
                    }
                    Err(e) => return Err(e).context("loading classifier"),
                };
            let state = serve::AppState::new(flow, classifier);
            serve::run(&bind, &cors_origin, state).await?;
        }
    }

    Ok(())
}

fn build_generator(args: &LlmArgs) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let api_key = args
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .context("GOOGLE_API_KEY is not set (export it or add it to .env)")?;

    let config = LlmConfig::new(api_key)
        .with_base_url(&args.base_url)
        .with_model(args.model.clone())
        .with_timeout(Duration::from_secs(args.timeout_secs));
    let client = GeminiClient::new(config).context("building Gemini client")?;
    Ok(Arc::new(client))
}

fn load_classifier(checkpoint: &Path) -> anyhow::Result<SkinClassifier> {
    SkinClassifier::load(checkpoint)
        .with_context(|| format!("loading classifier from {}", checkpoint.display()))
}

fn read_image(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Print a follow-up question and read one line of reply.
fn prompt_stdin(question: &str) -> Option<String> {
    eprint!("{question}\n> ");
    io::stderr().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}
