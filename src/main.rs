// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Hostshim CLI - Userscript Host Compatibility Layer
//!
//! Example usage and demonstration of the hostshim library, running against
//! the file-backed native host.

use std::env;
use std::process::ExitCode;

use serde_json::{json, Value};

use hostshim::{Level, NotifyOptions, Shim};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hostshim=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let shim = match Shim::new("hostshim-cli", Level::Info) {
        Ok(shim) => shim,
        Err(e) => {
            eprintln!("Failed to open the store document: {}", e);
            return ExitCode::from(1);
        }
    };

    match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: hostshim fetch <url>");
                return ExitCode::from(1);
            }
            fetch_url(&shim, &args[2]).await
        }
        "read" => {
            if args.len() < 3 {
                eprintln!("Usage: hostshim read <key> [session]");
                return ExitCode::from(1);
            }
            read_key(&shim, &args[2], args.get(3).map(String::as_str))
        }
        "write" => {
            if args.len() < 4 {
                eprintln!("Usage: hostshim write <key> <value> [session]");
                return ExitCode::from(1);
            }
            write_key(&shim, &args[2], &args[3], args.get(4).map(String::as_str))
        }
        "del" => {
            if args.len() < 3 {
                eprintln!("Usage: hostshim del <key> [session]");
                return ExitCode::from(1);
            }
            match args.get(3) {
                Some(session) => shim.store().del_session(&args[2], session),
                None => shim.store().del(&args[2]),
            }
            println!("Deleted: {}", args[2]);
            ExitCode::SUCCESS
        }
        "notify" => {
            if args.len() < 4 {
                eprintln!("Usage: hostshim notify <title> <body>");
                return ExitCode::from(1);
            }
            shim.notifier()
                .post(&args[2], "", &args[3], NotifyOptions::None)
                .await;
            ExitCode::SUCCESS
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("hostshim {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Hostshim - Userscript Host Compatibility Layer

USAGE:
    hostshim <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>                      Fetch a URL through the interceptor pipeline
    read <key> [session]             Read a stored value
    write <key> <value> [session]    Store a value (JSON or plain text)
    del <key> [session]              Delete a stored value
    notify <title> <body>            Post a notification
    help                             Show this help message
    version                          Show version information

EXAMPLES:
    hostshim fetch https://example.com/api
    hostshim write settings '{{"retries": 3}}'
    hostshim write token abc123 account-a
    hostshim read token account-a

For more information, see: https://github.com/bountyyfi/hostshim
"#
    );
}

async fn fetch_url(shim: &Shim, url: &str) -> ExitCode {
    println!("Fetching: {}", url);

    match shim.http().get(url).await {
        Ok(response) => {
            println!("\n=== Response ===");
            println!("Status: {}", response.status);
            if let Some(content_type) = response.header("content-type") {
                println!("Content-Type: {}", content_type);
            }
            println!("Size: {} bytes", response.text().len());
            println!("\n{}", response.text());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to fetch URL: {}", e);
            ExitCode::from(1)
        }
    }
}

fn read_key(shim: &Shim, key: &str, session: Option<&str>) -> ExitCode {
    let value = match session {
        Some(session) => shim.store().read_session(key, session),
        None => shim.store().read(key),
    };
    match value {
        Value::Null => {
            println!("(not set)");
            ExitCode::from(1)
        }
        value => {
            println!("{}", value);
            ExitCode::SUCCESS
        }
    }
}

fn write_key(shim: &Shim, key: &str, raw: &str, session: Option<&str>) -> ExitCode {
    // Values that parse as JSON are stored structured, everything else as text
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| json!(raw));
    let written = match session {
        Some(session) => shim.store().write_session(key, session, &value),
        None => shim.store().write(key, &value),
    };
    if written {
        println!("Stored: {}", key);
        ExitCode::SUCCESS
    } else {
        eprintln!("Failed to store: {}", key);
        ExitCode::from(1)
    }
}
