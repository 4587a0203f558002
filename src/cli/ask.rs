//! Ask command - runs one workflow and prints the answer

use clap::Args;

use crate::config::AppConfig;
use crate::domain::workflow::WorkflowInput;
use crate::infrastructure::logging;
use crate::infrastructure::services::WorkflowKind;

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Workflow to run (basic, self_correcting, corrective, agentic)
    #[arg(long, short)]
    pub workflow: Option<String>,

    /// Knowledge scope to search
    #[arg(long, short)]
    pub scope: String,

    /// Restrict retrieval to this document set; repeatable
    #[arg(long = "document-set", short = 'd')]
    pub document_sets: Vec<String>,

    /// Print the executed steps to stderr
    #[arg(long)]
    pub trace: bool,

    /// The question
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

impl AskArgs {
    pub fn question(&self) -> String {
        self.question.join(" ")
    }
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let service = crate::build_inference_service(&config).await?;
    let kind = match args.workflow {
        Some(ref raw) => raw.parse::<WorkflowKind>()?,
        None => service.default_kind(),
    };

    let input = WorkflowInput::new(&args.scope, args.question())
        .with_document_sets(args.document_sets.clone());
    let run = service.run_with_trace(kind, input).await?;

    if args.trace {
        for step in &run.steps {
            eprintln!("{:>6} ms  {}", step.execution_time_ms, step.step_name);
        }
    }
    println!("{}", run.answer());

    Ok(())
}
