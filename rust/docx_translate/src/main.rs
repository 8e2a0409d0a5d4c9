use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use docx_translate::{AppConfig, DocumentSession, Orchestrator, ParagraphId};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use translation_service::{build_translator, LanguageCode, ServiceKind, Translator};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON config file (optional; environment and flags override it).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Translation provider: google, deepl or libre.
    #[arg(long, global = true)]
    provider: Option<ServiceKind>,

    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Provider base URL override (required for libre).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print `id<TAB>text` for every paragraph.
    Paragraphs {
        #[arg(long)]
        input: PathBuf,
    },

    /// Write original.html and translated.html for a document.
    Render {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        out_dir: PathBuf,
    },

    /// Translate paragraphs step by step and save the result.
    Translate {
        #[arg(long)]
        input: PathBuf,

        /// Output .docx path.
        #[arg(long)]
        out: PathBuf,

        /// `ID[:TEXT][=LANG]`; TEXT selects part of the paragraph.
        #[arg(long = "step", required = true)]
        steps: Vec<Step>,

        /// Target language for steps without `=LANG`.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Print the configured language list.
    Languages,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    id: usize,
    text: Option<String>,
    lang: Option<String>,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (head, lang) = match s.rsplit_once('=') {
            Some((head, lang)) if LanguageCode::parse(lang).is_ok() => (head, Some(lang.trim().to_string())),
            _ => (s, None),
        };
        let (id, text) = match head.split_once(':') {
            Some((id, text)) => (id, Some(text.to_string())),
            None => (head, None),
        };
        let id = id
            .trim()
            .parse()
            .map_err(|_| format!("invalid step {:?}: expected ID[:TEXT][=LANG]", s))?;
        Ok(Step { id, text, lang })
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }
    if let Some(timeout) = cli.timeout_secs {
        config.timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn open_session(input: &Path, config: &AppConfig) -> Result<DocumentSession> {
    let mut session = DocumentSession::new(config.default_target()?);
    let is_html = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));

    if is_html {
        let html = std::fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
        session.load_html(&html)
    } else {
        session.load_path(input)
    }
    .with_context(|| format!("load {}", input.display()))?;
    Ok(session)
}

async fn run_step<T: Translator>(
    session: &mut DocumentSession,
    orchestrator: &Orchestrator<T>,
    step: &Step,
    default_lang: &str,
) -> docx_translate::Result<String> {
    let id = ParagraphId::new(step.id);
    match &step.text {
        Some(text) => session.select_text(id, text)?,
        None => session.select_paragraph(id)?,
    }
    session.choose_target_language(step.lang.as_deref().unwrap_or(default_lang))?;
    let outcome = session.translate_selection(orchestrator).await?;
    let (_, translated) = session.view().lookup(outcome.paragraph_id)?;
    Ok(translated.current_translated_text().to_string())
}

async fn translate(config: &AppConfig, input: &Path, out: &Path, steps: &[Step], lang: Option<&str>) -> Result<()> {
    let translator = build_translator(config.provider, config.provider_settings()?)?;
    let orchestrator = Orchestrator::new(translator)
        .with_timeout(config.timeout())
        .with_retry(config.retry_transient);

    let mut session = open_session(input, config)?;
    let default_lang = lang.unwrap_or(&config.default_target_lang).to_string();

    let mut failed = 0usize;
    for step in steps {
        match run_step(&mut session, &orchestrator, step, &default_lang).await {
            Ok(text) => println!("{}\t{}", step.id, text.replace('\n', "\\n")),
            Err(e) if e.is_recoverable() => {
                failed += 1;
                warn!(paragraph_id = step.id, error = %e, "step failed");
                eprintln!("step {}: {}", step.id, e);
            }
            Err(e) => return Err(anyhow!(e).context(format!("step {}", step.id))),
        }
    }

    session.save(out).with_context(|| format!("save {}", out.display()))?;
    info!(steps = steps.len(), failed, out = %out.display(), "translation run finished");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli).context("load configuration")?;

    let result = match &cli.command {
        Command::Paragraphs { input } => {
            let session = open_session(input, &config)?;
            for paragraph in session.view().original() {
                println!("{}\t{}", paragraph.id(), paragraph.original_text().replace('\n', "\\n"));
            }
            Ok(())
        }
        Command::Render { input, out_dir } => {
            let session = open_session(input, &config)?;
            std::fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
            std::fs::write(out_dir.join("original.html"), session.render_original_html())?;
            std::fs::write(out_dir.join("translated.html"), session.render_translated_html())?;
            Ok(())
        }
        Command::Translate {
            input,
            out,
            steps,
            lang,
        } => translate(&config, input, out, steps, lang.as_deref()).await,
        Command::Languages => {
            for language in &config.languages {
                println!("{}\t{}", language.code, language.name);
            }
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_forms() {
        assert_eq!(
            "1=fr".parse::<Step>().unwrap(),
            Step { id: 1, text: None, lang: Some("fr".to_string()) }
        );
        assert_eq!("2".parse::<Step>().unwrap(), Step { id: 2, text: None, lang: None });
        assert_eq!(
            "0:a = b=es".parse::<Step>().unwrap(),
            Step { id: 0, text: Some("a = b".to_string()), lang: Some("es".to_string()) }
        );
        assert_eq!(
            "3:x=y z".parse::<Step>().unwrap(),
            Step { id: 3, text: Some("x=y z".to_string()), lang: None }
        );
        assert!("one=fr".parse::<Step>().is_err());
    }

    #[test]
    fn cli_parses_repeated_steps() {
        let cli = Cli::try_parse_from([
            "docx-translate",
            "--provider",
            "deepl",
            "translate",
            "--input",
            "in.docx",
            "--out",
            "out.docx",
            "--step",
            "1=fr",
            "--step",
            "1=es",
        ])
        .unwrap();
        assert_eq!(cli.provider, Some(ServiceKind::Deepl));
        match cli.command {
            Command::Translate { steps, .. } => assert_eq!(steps.len(), 2),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
