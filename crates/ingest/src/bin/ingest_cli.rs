use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use ingest::usage_event_from_line;
use tracker_core::TokenCounts;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: ingest_cli <path|->");
        std::process::exit(2);
    }

    let path = &args[1];
    let reader: Box<dyn Read> = if path == "-" {
        Box::new(io::stdin())
    } else {
        match File::open(path) {
            Ok(file) => Box::new(file),
            Err(err) => {
                eprintln!("failed to open {}: {}", path, err);
                std::process::exit(1);
            }
        }
    };
    // Session ids come from the file name; stdin gets a fixed one.
    let source = if path == "-" { Path::new("stdin.jsonl") } else { Path::new(path) };

    let mut by_model: BTreeMap<String, (TokenCounts, u64)> = BTreeMap::new();
    for line in BufReader::new(reader).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("failed to read {}: {}", path, err);
                std::process::exit(1);
            }
        };
        if let Some(event) = usage_event_from_line(source, &line) {
            let entry = by_model.entry(event.model).or_default();
            entry.0 = entry.0.saturating_add(event.tokens);
            entry.1 += 1;
        }
    }

    if by_model.is_empty() {
        eprintln!("no usage events found");
        std::process::exit(3);
    }

    let mut grand = TokenCounts::default();
    for (model, (tokens, messages)) in &by_model {
        grand = grand.saturating_add(*tokens);
        println!("{model}");
        println!("  messages {messages}");
        println!("  input_tokens {}", tokens.input_tokens);
        println!("  output_tokens {}", tokens.output_tokens);
        println!("  cache_creation_tokens {}", tokens.cache_creation_tokens);
        println!("  cache_read_tokens {}", tokens.cache_read_tokens);
        println!("  total_tokens {}", tokens.total());
    }
    println!("total_tokens {}", grand.total());
}
