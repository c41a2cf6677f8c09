//! Command line front end for the stock analysis team
//!
//! Reads a task, runs a fresh team on it and prints every streamed event.
//!
//! ```bash
//! # interactive
//! agent-cli
//! # one task, then exit
//! agent-cli --task "搜索港股昨天市值最高的科技类股票的名称，并进行分析"
//! ```

mod render;

use agent_core::Context;
use agent_stock::{Language, StockConfig, StockTeamFactory};
use agent_team::{TeamEvent, TeamFactory};
use anyhow::{Context as _, bail};
use clap::Parser;
use futures::StreamExt;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "Run the multi-agent stock analysis team from the terminal", long_about = None)]
struct Args {
    /// Run this task and exit instead of prompting
    #[arg(short, long)]
    task: Option<String>,

    /// Prompt and output language (en or zh)
    #[arg(short, long, env = "AGENT_LANGUAGE")]
    language: Option<String>,

    /// Turn budget per task
    #[arg(long, env = "MAX_TURNS")]
    max_turns: Option<usize>,

    /// Directory for charts and reports
    #[arg(short, long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

impl Args {
    fn stock_config(&self) -> anyhow::Result<StockConfig> {
        let mut config = StockConfig::from_env()?;
        if let Some(code) = &self.language {
            config.language = Language::from_code(code)
                .with_context(|| format!("unsupported language '{code}', expected en or zh"))?;
        }
        if let Some(turns) = self.max_turns {
            config.max_turns = turns;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        config.validate()?;
        Ok(config)
    }
}

const EXIT_WORDS: [&str; 4] = ["exit", "quit", "/exit", "/quit"];

async fn run_task(factory: &StockTeamFactory, task: &str) -> anyhow::Result<()> {
    let language = factory.config().language;
    let team = Arc::new(factory.create_team()?);
    let mut events = std::pin::pin!(team.run_stream(task, Context::new()));

    while let Some(event) = events.next().await {
        match event {
            Ok(event @ TeamEvent::Message(_)) => println!("{}", render::render_event(&event, language)),
            Ok(event @ TeamEvent::Completed(_)) => {
                println!("{}", render::render_event(&event, language));
                return Ok(());
            }
            Err(e) => bail!("team run failed: {e}"),
        }
    }
    bail!("team stream ended without a result")
}

fn read_task(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::load_env();
    agent_utils::init_tracing();

    let args = Args::parse();
    let config = args.stock_config()?;
    let language = config.language;

    match language {
        Language::English => println!("Starting the multi-agent stock analysis system..."),
        Language::Chinese => println!("启动多智能体股票分析系统……初始化中"),
    }
    let factory = StockTeamFactory::from_config(config)?;
    info!(language = language.code(), "Team factory ready");

    if let Some(task) = args.task {
        return run_task(&factory, &task).await;
    }

    let prompt = match language {
        Language::English => "Enter a task (exit to quit)> ",
        Language::Chinese => "请输入需要执行的指令（exit 退出）> ",
    };
    while let Some(task) = read_task(prompt)? {
        if task.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&task.to_lowercase().as_str()) {
            break;
        }
        if let Err(e) = run_task(&factory, &task).await {
            error!(error = %e, "Task failed");
            eprintln!("Error: {e:#}\n");
        }
    }

    Ok(())
}
