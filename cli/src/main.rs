use anyhow::Result;
use insighthub::export::default_export_dir;
use insighthub::{
    AiGateway, AppController, AppView, Config, DocumentStore, FileStore, Language,
    MockAuthProvider, PdfTextExtractor, ReadinessScore, Report, ReportExporter, TextReportExporter,
    UploadRequest,
};
use std::io::{self, BufRead, Write};
use std::path::Path;

struct Session {
    controller: AppController,
    auth: MockAuthProvider,
    exporter: TextReportExporter,
    language: Language,
    last_readiness: Option<(String, ReadinessScore)>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let store = DocumentStore::new(Box::new(FileStore::new(&config.data_dir)));
    let gateway = AiGateway::new(&config)?;
    let mut session = Session {
        controller: AppController::new(store, gateway, Box::new(PdfTextExtractor)),
        auth: MockAuthProvider::default(),
        exporter: TextReportExporter::new(default_export_dir(Path::new(&config.data_dir))),
        language: Language::default(),
        last_readiness: None,
    };
    session.controller.resolve_auth_gate(&session.auth);

    println!("InsightHub research assistant");
    println!(
        "Backend: {} | {} papers tracked | type 'help' for commands",
        config.backend_url,
        session.controller.store().len()
    );

    let stdin = io::stdin();
    loop {
        print!("{}> ", view_name(session.controller.view()));
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }
        if let Err(e) = run_command(&mut session, line).await {
            println!("error: {e}");
        }
    }

    Ok(())
}

async fn run_command(session: &mut Session, line: &str) -> Result<()> {
    let (command, rest) = match line.split_once(' ') {
        Some((head, tail)) => (head, tail.trim()),
        None => (line, ""),
    };

    match command {
        "help" => print_help(),
        "list" => list_documents(session),
        "goto" => match parse_view(rest) {
            Some(view) => session.controller.navigate(view),
            None => println!("unknown view: {rest}"),
        },
        "upload" => upload(session, rest)?,
        "select" => session.controller.select_document(rest)?,
        "open" => session.controller.open_summarizer(rest)?,
        "delete" => {
            session.controller.delete_document(rest);
            println!("deleted {rest}");
        }
        "summarize" => {
            let summary = session.controller.generate_summary().await?;
            println!("Abstract: {}", summary.abstract_text);
            for (i, finding) in summary.findings.iter().enumerate() {
                println!("  {}. {finding}", i + 1);
            }
            println!("Methodology: {}", summary.methodology);
            println!("Limitations: {}", summary.limitations);
        }
        "insights" => {
            let insights = session.controller.generate_insights().await?;
            println!("Key concepts: {}", insights.key_concepts.join(", "));
            println!("Objectives: {}", insights.objectives.join("; "));
            println!("Results: {}", insights.results.join("; "));
            println!("Conclusions: {}", insights.conclusions.join("; "));
        }
        "search" => {
            let outcome = session.controller.search(rest).await?;
            println!("AI answer: {}", outcome.answer);
            for result in &outcome.results {
                println!(
                    "  [{:.2}] {} p.{}: {}",
                    result.score, result.doc_name, result.page, result.text
                );
            }
        }
        "chat" => {
            let reply = session.controller.chat(rest, session.language).await?;
            println!("{reply}");
        }
        "lang" => match Language::parse(rest) {
            Some(language) => {
                session.language = language;
                println!("chat language set to {}", language.label());
            }
            None => println!("unknown language: {rest} (English, Hindi, Marathi, Hinglish)"),
        },
        "readiness" => {
            let score = session.controller.evaluate_readiness().await?;
            print_readiness(&score);
            let name = session
                .controller
                .store()
                .selected()
                .map(|d| d.name.clone())
                .unwrap_or_default();
            session.last_readiness = Some((name, score));
        }
        "export" => export(session, rest)?,
        "logout" => {
            let outcome = session.controller.logout(&mut session.auth);
            println!("{}", outcome.message);
        }
        _ => println!("unknown command: {command} (try 'help')"),
    }
    Ok(())
}

fn upload(session: &mut Session, path: &str) -> Result<()> {
    if path.is_empty() {
        println!("usage: upload <file.pdf>");
        return Ok(());
    }
    let bytes = std::fs::read(path)?;
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    let mime_type = if name.to_lowercase().ends_with(".pdf") {
        "application/pdf".to_string()
    } else {
        "application/octet-stream".to_string()
    };

    let id = session.controller.upload(UploadRequest {
        name: name.clone(),
        mime_type,
        bytes,
    })?;
    println!("uploaded {name} as {id}");
    Ok(())
}

fn export(session: &mut Session, what: &str) -> Result<()> {
    match what {
        "summary" => {
            let Some(doc) = session.controller.store().selected() else {
                println!("select a document first");
                return Ok(());
            };
            let Some(summary) = &doc.summary else {
                println!("no summary generated yet (run 'summarize')");
                return Ok(());
            };
            session.exporter.export(&doc.name, &Report::Summary(summary))?;
            println!("summary report written");
        }
        "insights" => {
            let Some(doc) = session.controller.store().selected() else {
                println!("select a document first");
                return Ok(());
            };
            let Some(insights) = &doc.insights else {
                println!("no insights generated yet (run 'insights')");
                return Ok(());
            };
            session
                .exporter
                .export(&doc.name, &Report::Insights(insights))?;
            println!("insights report written");
        }
        "readiness" => {
            let Some((name, score)) = &session.last_readiness else {
                println!("no readiness evaluation yet (run 'readiness')");
                return Ok(());
            };
            session.exporter.export(name, &Report::Readiness(score))?;
            println!("readiness report written");
        }
        _ => println!("usage: export summary|insights|readiness"),
    }
    Ok(())
}

fn list_documents(session: &Session) {
    let store = session.controller.store();
    if store.is_empty() {
        println!("no papers uploaded");
        return;
    }
    for doc in store.documents() {
        let marker = if store.selected_id() == Some(doc.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {}  {} ({} pages, {:.1}k chars)",
            doc.id,
            doc.name,
            doc.page_count,
            doc.content.chars().count() as f64 / 1000.0
        );
    }
}

fn print_readiness(score: &ReadinessScore) {
    println!("Overall: {}/100 ({})", score.average(), score.final_verdict);
    println!("  Novelty: {:.0}", score.novelty_score);
    println!("  Technical depth: {:.0}", score.technical_depth_score);
    println!("  Experimental rigor: {:.0}", score.experimental_rigor_score);
    println!("  Literature coverage: {:.0}", score.literature_coverage_score);
    println!(
        "  Publication readiness: {:.0}",
        score.publication_readiness_score
    );
    for strength in &score.strengths {
        println!("  + {strength}");
    }
    for weakness in &score.weaknesses {
        println!("  - {weakness}");
    }
    for suggestion in &score.suggestions {
        println!("  > {suggestion}");
    }
    println!("Suitable venues: {}", score.suitable_venues.join(", "));
}

fn print_help() {
    println!("  list                 show uploaded papers (* marks the selection)");
    println!("  upload <file.pdf>    extract text and add the paper");
    println!("  select <id>          make a paper the active selection");
    println!("  open <id>            select and jump to the summarizer");
    println!("  delete <id>          remove a paper");
    println!("  summarize            AI summary of the selected paper");
    println!("  insights             AI insights for the selected paper");
    println!("  search <query>       semantic search across all papers");
    println!("  chat <question>      chat about the selected paper");
    println!("  lang <language>      chat reply language (English, Hindi, Marathi, Hinglish)");
    println!("  readiness            research readiness evaluation");
    println!("  export <kind>        write a summary|insights|readiness report file");
    println!("  goto <view>          navigate (dashboard, upload, summarizer, ...)");
    println!("  logout               end the session and return to the landing view");
    println!("  quit                 exit");
}

fn view_name(view: AppView) -> &'static str {
    match view {
        AppView::Landing => "landing",
        AppView::Dashboard => "dashboard",
        AppView::Upload => "upload",
        AppView::Summarizer => "summarizer",
        AppView::Insights => "insights",
        AppView::Search => "search",
        AppView::Chat => "chat",
        AppView::ResearchReadiness => "readiness",
    }
}

fn parse_view(name: &str) -> Option<AppView> {
    match name.to_lowercase().as_str() {
        "landing" => Some(AppView::Landing),
        "dashboard" => Some(AppView::Dashboard),
        "upload" => Some(AppView::Upload),
        "summarizer" => Some(AppView::Summarizer),
        "insights" => Some(AppView::Insights),
        "search" => Some(AppView::Search),
        "chat" => Some(AppView::Chat),
        "readiness" | "research-readiness" => Some(AppView::ResearchReadiness),
        _ => None,
    }
}
