//! Command-line companion for the vision-chat API: upload an image, ask
//! about it, chat interactively or run the end-to-end smoke sequence.

mod api_client;

use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use crate::api_client::{ApiClient, Reply};

const SMOKE_IMAGES: [(&str, &str); 2] = [
    ("dog.jpg", "https://raw.githubusercontent.com/pytorch/hub/master/images/dog.jpg"),
    ("cat.jpg", "https://raw.githubusercontent.com/pytorch/hub/master/images/cat.jpg"),
];

const SMOKE_QUESTIONS: [&str; 4] = [
    "What is in the image?",
    "Can you describe what you see?",
    "What are the main objects in this image?",
    "Is there an animal in the image?",
];

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the vision-chat API
    #[arg(long, default_value = "http://127.0.0.1:5000", global = true)]
    server: String,

    /// Conversation id sent as X-Session-Id
    #[arg(long, global = true)]
    session: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload an image and print its analysis
    Upload { path: PathBuf },
    /// Ask a question about the last uploaded image
    Ask { question: String },
    /// Upload an image, then read questions from stdin until EOF or `exit`
    Chat { path: PathBuf },
    /// Start over: forget the current image and history
    Reset,
    /// Check the inference backends
    Health,
    /// Download sample images, upload each and ask the canned questions
    Smoke {
        /// Where downloaded sample images are kept
        #[arg(long, default_value = "test_images")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server, cli.session)?;

    match cli.command {
        Command::Upload { path } => {
            let reply = client.upload(&path).await?;
            print_analysis(&reply);
        }
        Command::Ask { question } => {
            let reply = client.ask(&question).await?;
            print_answer(&reply);
        }
        Command::Chat { path } => chat(&client, &path).await?,
        Command::Reset => {
            let reply = client.reset().await?;
            print_status(&reply);
        }
        Command::Health => {
            let reply = client.health().await?;
            print_status(&reply);
            println!("{}", pretty(&reply.body));
        }
        Command::Smoke { dir } => smoke(&client, &dir).await?,
    }

    Ok(())
}

async fn chat(client: &ApiClient, path: &Path) -> Result<()> {
    let reply = client.upload(path).await?;
    print_analysis(&reply);
    if !reply.status.is_success() {
        bail!("upload failed with status {}", reply.status);
    }

    let stdin = io::stdin();
    loop {
        print!("{} ", "you>".bold().blue());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = client.ask(question).await?;
        print_answer(&reply);
    }
    Ok(())
}

async fn smoke(client: &ApiClient, dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;

    for (name, url) in SMOKE_IMAGES {
        println!("\n{} {name}", "Downloading".bold());
        let path = dir.join(name);
        match client.download(url).await {
            Ok(bytes) => tokio::fs::write(&path, bytes).await?,
            Err(err) => {
                println!("{} {name}: {err:#}", "Failed to download".red());
                continue;
            }
        }

        println!("\n{} {}", "Uploading".bold(), path.display());
        let reply = client.upload(&path).await?;
        print_status(&reply);
        println!("{}", pretty(&reply.body));

        if reply.body["success"] != Value::Bool(true) {
            continue;
        }
        for question in SMOKE_QUESTIONS {
            println!("\n{} {question}", "Asking".bold());
            let reply = client.ask(question).await?;
            print_status(&reply);
            println!("{}", pretty(&reply.body));
        }
    }
    Ok(())
}

fn print_status(reply: &Reply) {
    let code = reply.status.as_u16().to_string();
    let code = if reply.status.is_success() {
        code.green()
    } else {
        code.red()
    };
    println!("Status Code: {code}");
}

fn print_analysis(reply: &Reply) {
    if !reply.status.is_success() {
        print_error(reply);
        return;
    }
    let analysis = &reply.body["analysis"];
    println!("{}", "Predictions".bold().underline());
    if let Some(predictions) = analysis["predictions"].as_array() {
        for p in predictions {
            let label = p["label"].as_str().unwrap_or("?");
            let confidence = p["confidence"].as_f64().unwrap_or(0.0);
            println!("  {:<32} {:>5.1}%", label.cyan(), confidence * 100.0);
        }
    }
    if let Some(description) = analysis["description"].as_str() {
        println!("\n{}", description.italic());
    }
}

fn print_answer(reply: &Reply) {
    match reply.body["answer"].as_str() {
        Some(answer) if reply.status.is_success() => {
            println!("{} {answer}", "bot>".bold().green());
        }
        _ => print_error(reply),
    }
}

fn print_error(reply: &Reply) {
    print_status(reply);
    let message = reply.body["error"].as_str().unwrap_or("unexpected response");
    eprintln!("{} {message}", "error:".bold().red());
}

fn pretty(body: &Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
}
