use std::process::ExitCode;
use clap::Parser as ClapParser;
use eras_lang::Config;

fn main() -> ExitCode {
    let config: Config = Config::parse();

    match eras_lang::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        },
    }
}
