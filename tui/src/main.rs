use clap::Parser;
use quill_tui::Cli;
use quill_tui::run_main;

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();
    if let Some(value) = run_main(cli)? {
        #[allow(clippy::print_stdout)]
        {
            println!("{value}");
        }
    }
    Ok(())
}
