mod commands;
mod terminal;

use commands::{CommandLine, Commands, info, scan, tools};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);
    print::banner(commands.no_banner || commands.quiet);

    match commands.command {
        Commands::Scan(args) => scan::scan(args, commands.quiet).await,
        Commands::Tools => {
            print::header("registered tools");
            Ok(tools::list())
        }
        Commands::Info => {
            print::header("about the tool");
            Ok(info::info())
        }
    }
}
