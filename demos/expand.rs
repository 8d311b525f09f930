//! Expands a domain name embedded in a hex-encoded DNS message.
//!
//! Usage: `expand <hex-message> [offset]`

use std::{env, process};

use log::LevelFilter;
use wirename::wire::expand;
use wirename::MAXDNAME;

fn parse_hex(s: &str) -> Option<Vec<u8>> {
    if !s.is_ascii() || s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

fn main() {
    env_logger::Builder::new()
        .filter_module("wirename", LevelFilter::Trace)
        .filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Trace)
        .init();

    let mut args = env::args().skip(1);
    let msg = args.next().and_then(|hex| parse_hex(&hex));
    let msg = match msg {
        Some(msg) => msg,
        None => {
            eprintln!("usage: expand <hex-message> [offset]");
            process::exit(1);
        }
    };
    let offset = match args.next() {
        Some(arg) => arg.parse().expect("offset must be an integer"),
        None => 0,
    };

    let mut out = [0; MAXDNAME];
    match expand::expand(&msg, offset, &mut out) {
        Ok(consumed) => {
            let nul = out.iter().position(|&b| b == 0).unwrap();
            let text = String::from_utf8_lossy(&out[..nul]);
            println!("{} ({} bytes on the wire)", text, consumed);
        }
        Err(e) => {
            eprintln!("failed to expand name: {}", e);
            process::exit(1);
        }
    }
}
