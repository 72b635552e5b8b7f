// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Reqpipe CLI - Layered HTTP Request Builder
//!
//! Small front end over the reqpipe library.

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context};
use reqpipe::{Client, Response, Values};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reqpipe=info".parse().expect("static directive")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: reqpipe fetch <url>");
                return ExitCode::from(1);
            }
            fetch_url(&args[2]).await
        }
        "pipe" => {
            if args.len() < 3 {
                eprintln!("Usage: reqpipe pipe <url>");
                return ExitCode::from(1);
            }
            pipe_url(&args[2]).await
        }
        "form" => {
            if args.len() < 3 {
                eprintln!("Usage: reqpipe form <url> [key=value ...]");
                return ExitCode::from(1);
            }
            post_form(&args[2], &args[3..]).await
        }
        "json" => {
            if args.len() < 4 {
                eprintln!("Usage: reqpipe json <url> <json>");
                return ExitCode::from(1);
            }
            post_json(&args[2], &args[3]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("reqpipe {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Reqpipe - Layered HTTP Request Builder

USAGE:
    reqpipe <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>                 Fetch a URL and display the response
    pipe <url>                  Stream a response body to stdout
    form <url> [key=value ...]  POST a form
    json <url> <json>           POST a JSON document as-is
    help                        Show this help message
    version                     Show version information

EXAMPLES:
    reqpipe fetch https://example.com
    reqpipe pipe https://example.com/archive.tar.gz > archive.tar
    reqpipe form https://example.com/login userName=nxu pwd=111
    reqpipe json https://example.com/api '{{"Name":"xdw","Age":30}}'

Set RUST_LOG=reqpipe=debug for request assembly details.
"#
    );
}

fn print_response(response: &Response) -> ExitCode {
    println!("\n=== Response ===");
    println!("Status: {}", response.status);
    println!("URL: {}", response.url);
    println!("Content-Type: {:?}", response.content_type());
    println!("Size: {} bytes", response.body.len());
    println!("Time: {}ms", response.response_time_ms);
    if response.redirected {
        println!("Redirected: yes");
    }

    if !response.body.is_empty() {
        println!("\n=== Body ===");
        println!("{}", response.text_lossy());
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

async fn fetch_url(url: &str) -> anyhow::Result<ExitCode> {
    println!("Fetching: {}", url);

    let client = Client::new().context("failed to create client")?;
    let response = client.req(None).get(url).fetch().await?;
    Ok(print_response(&response))
}

async fn pipe_url(url: &str) -> anyhow::Result<ExitCode> {
    let client = Client::new().context("failed to create client")?;
    let mut stdout = tokio::io::stdout();

    let written = client.req(None).get(url).pipe_stream(&mut stdout).await?;
    tracing::info!(bytes = written, url = %url, "Piped response body");
    Ok(ExitCode::SUCCESS)
}

fn parse_pairs(pairs: &[String]) -> anyhow::Result<Values> {
    let mut form = Values::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected key=value, got {:?}", pair);
        };
        form.add(key, value);
    }
    Ok(form)
}

async fn post_form(url: &str, pairs: &[String]) -> anyhow::Result<ExitCode> {
    let form = parse_pairs(pairs)?;
    println!("Posting form to: {} ({})", url, form.encode());

    let client = Client::new().context("failed to create client")?;
    let response = client.req(None).post(url).form_data(form).fetch().await?;
    Ok(print_response(&response))
}

async fn post_json(url: &str, json: &str) -> anyhow::Result<ExitCode> {
    serde_json::from_str::<serde_json::Value>(json).context("argument is not valid JSON")?;
    println!("Posting JSON to: {}", url);

    let client = Client::new().context("failed to create client")?;
    let response = client
        .req(None)
        .post(url)
        .json_string(json.to_string())
        .fetch()
        .await?;
    Ok(print_response(&response))
}
