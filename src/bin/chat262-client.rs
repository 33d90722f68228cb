//! A minimal line-oriented Chat262 client.
//!
//! Terminal UI is out of scope; this reads commands from stdin one line
//! at a time and prints the server's response, which is enough to drive
//! [`chat262::client::Client`] interactively or via a pipe.

use std::io::{self, BufRead, Write};
use std::net::Ipv4Addr;
use std::process::ExitCode;

use chat262::client::{Client, ClientConfig};

fn usage(prog: &str) {
    eprintln!(
        "usage: {prog} [-h] <ip address>\n\
         \n\
         Start the Chat262 client and connect to a Chat262 server on IP\n\
         address <ip address>. The address should be in the\n\
         xxx.xxx.xxx.xxx format.\n\
         \n\
         Options:\n\
         \t-h\t\t Display this message and exit."
    );
}

fn run_repl(mut client: Client) {
    println!(
        "connected. commands: register <user> <pass> | login <user> <pass> |\n\
         logout | accounts <pattern> | send <to> <text> | recv <from> |\n\
         correspondents | delete | quit"
    );

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let mut parts = line.splitn(3, ' ');
        let cmd = parts.next().unwrap_or("");

        let result = match cmd {
            "register" => {
                let (Some(user), Some(pass)) = (parts.next(), parts.next()) else {
                    println!("usage: register <user> <pass>");
                    continue;
                };
                client.register(user.as_bytes(), pass.as_bytes()).map(|s| format!("status {s}"))
            }
            "login" => {
                let (Some(user), Some(pass)) = (parts.next(), parts.next()) else {
                    println!("usage: login <user> <pass>");
                    continue;
                };
                client.login(user.as_bytes(), pass.as_bytes()).map(|s| format!("status {s}"))
            }
            "logout" => client.logout().map(|s| format!("status {s}")),
            "accounts" => {
                let Some(pattern) = parts.next() else {
                    println!("usage: accounts <pattern>");
                    continue;
                };
                client
                    .accounts(pattern.as_bytes())
                    .map(|(s, names)| format!("status {s} {:?}", names_to_strings(&names)))
            }
            "send" => {
                let (Some(to), Some(text)) = (parts.next(), parts.next()) else {
                    println!("usage: send <to> <text>");
                    continue;
                };
                client.send_txt(to.as_bytes(), text.as_bytes()).map(|s| format!("status {s}"))
            }
            "recv" => {
                let Some(from) = parts.next() else {
                    println!("usage: recv <from>");
                    continue;
                };
                client.recv_txt(from.as_bytes()).map(|(s, texts)| {
                    format!("status {s} {} texts", texts.len())
                })
            }
            "correspondents" => client
                .correspondents()
                .map(|(s, names)| format!("status {s} {:?}", names_to_strings(&names))),
            "delete" => client.delete_account().map(|s| format!("status {s}")),
            "quit" | "exit" => break,
            "" => continue,
            other => {
                println!("unknown command: {other}");
                continue;
            }
        };

        match result {
            Ok(msg) => println!("{msg}"),
            Err(e) => println!("error: {e}"),
        }
        let _ = io::stdout().flush();
    }
}

fn names_to_strings(names: &[Vec<u8>]) -> Vec<String> {
    names.iter().map(|n| String::from_utf8_lossy(n).into_owned()).collect()
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("chat262-client");

    if args.len() != 2 {
        usage(prog);
        return ExitCode::FAILURE;
    }

    if args[1] == "-h" || args[1] == "--help" {
        usage(prog);
        return ExitCode::SUCCESS;
    }

    let addr: Ipv4Addr = match args[1].parse() {
        Ok(addr) => addr,
        Err(_) => {
            eprintln!("invalid IP address: {}", args[1]);
            usage(prog);
            return ExitCode::FAILURE;
        }
    };

    let config = ClientConfig::new(addr.into());
    let client = match Client::connect(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("could not connect to server: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("successfully connected to server on {}:{}", addr, chat262::wire::DEFAULT_PORT);
    run_repl(client);

    ExitCode::SUCCESS
}
