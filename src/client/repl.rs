//! The interactive command loop. Parses one line at a time into a
//! [`RequestBody`], sends it through an [`Invoker`], and prints whatever
//! comes back, including any monitor pushes interleaved while waiting.
//!
//! Grounded in `original_source/client/BookingClient.cpp`'s command-parsing
//! `main` loop; commands and argument order match spec.md §6's examples.

use std::io::{self, BufRead, Write};

use crate::client::invoker::Invoker;
use crate::time_model::DateTime;
use crate::wire::{encode_request, RequestBody};

fn parse_clock(s: &str) -> Option<(u8, u8)> {
    let (h, m) = s.split_once(':')?;
    Some((h.parse().ok()?, m.parse().ok()?))
}

fn parse_datetime(day: &str, clock: &str) -> Option<DateTime> {
    let day: u8 = day.parse().ok()?;
    let (hour, minute) = parse_clock(clock)?;
    DateTime::new(day, hour, minute).ok()
}

fn print_push(facility: &str, body: &str) {
    println!();
    println!("[monitor] {}: {}", facility, body);
    print!("> ");
    let _ = io::stdout().flush();
}

/// Parses a REPL line into a request body, or an error message to show the
/// user directly (never sent to the server).
fn parse_command(line: &str) -> Result<RequestBody, String> {
    let mut parts = line.split_whitespace();
    let command = parts.next().ok_or_else(|| "empty command".to_string())?;

    match command {
        "query" => {
            let facility = parts.next().ok_or("usage: query <facility> <day>...")?.to_string();
            let days: Vec<u8> = parts.map(|d| d.parse().map_err(|_| format!("bad day {:?}", d))).collect::<Result<_, _>>()?;
            if days.is_empty() {
                return Err("query requires at least one day".to_string());
            }
            Ok(RequestBody::Query { facility, days })
        }
        "book" => {
            let facility = parts.next().ok_or("usage: book <facility> <startDay> <HH:MM> <endDay> <HH:MM>")?.to_string();
            let start_day = parts.next().ok_or("missing startDay")?;
            let start_clock = parts.next().ok_or("missing start HH:MM")?;
            let end_day = parts.next().ok_or("missing endDay")?;
            let end_clock = parts.next().ok_or("missing end HH:MM")?;
            let start = parse_datetime(start_day, start_clock).ok_or("bad start time")?;
            let end = parse_datetime(end_day, end_clock).ok_or("bad end time")?;
            Ok(RequestBody::Book { facility, start, end })
        }
        "change" => {
            let confirmation_id = parts.next().ok_or("usage: change <id> <offsetMinutes>")?.to_string();
            let offset_minutes: i32 = parts.next().ok_or("missing offsetMinutes")?.parse().map_err(|_| "offsetMinutes must be an integer")?;
            Ok(RequestBody::Change { confirmation_id, offset_minutes })
        }
        "extend" => {
            let confirmation_id = parts.next().ok_or("usage: extend <id> <extendMinutes>")?.to_string();
            let extend_minutes: i32 = parts.next().ok_or("missing extendMinutes")?.parse().map_err(|_| "extendMinutes must be an integer")?;
            Ok(RequestBody::Extend { confirmation_id, extend_minutes })
        }
        "monitor" => {
            let facility = parts.next().ok_or("usage: monitor <facility> <intervalMinutes>")?.to_string();
            let interval_minutes: i32 = parts.next().ok_or("missing intervalMinutes")?.parse().map_err(|_| "intervalMinutes must be an integer")?;
            Ok(RequestBody::Monitor { facility, interval_minutes })
        }
        "status" => Ok(RequestBody::Status),
        other => Err(format!("unknown command {:?} (try query/book/change/extend/monitor/status/exit)", other)),
    }
}

/// Runs the interactive loop until `exit`/EOF. Each accepted command gets
/// its own monotonically increasing request id, starting at 1.
pub async fn run(invoker: Invoker) {
    let stdin = io::stdin();
    let mut next_request_id: i32 = 1;

    print!("> ");
    let _ = io::stdout().flush();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("input error: {}", e);
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            print!("> ");
            let _ = io::stdout().flush();
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        match parse_command(trimmed) {
            Ok(body) => {
                let request_id = next_request_id;
                next_request_id += 1;
                let bytes = encode_request(request_id, &body);
                match invoker.invoke(&bytes, request_id, |facility, text| print_push(facility, text)).await {
                    Ok(reply) => println!("{}", String::from_utf8_lossy(&reply)),
                    Err(e) => println!("{}", e),
                }
            }
            Err(message) => println!("{}", message),
        }

        print!("> ");
        let _ = io::stdout().flush();
    }
}
