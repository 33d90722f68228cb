use std::net::Ipv4Addr;
use std::process::ExitCode;

use chat262::server::{self, ServerConfig};

fn usage(prog: &str) {
    eprintln!(
        "usage: {prog} [-h] <ip address>\n\
         \n\
         Start the Chat262 server on IP address <ip address>.\n\
         The address should be in the xxx.xxx.xxx.xxx format.\n\
         \n\
         Options:\n\
         \t-h\t\t Display this message and exit."
    );
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("chat262-server");

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

    let config = ServerConfig::new(addr.into());
    if let Err(e) = server::run(&config) {
        eprintln!("server failed: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
