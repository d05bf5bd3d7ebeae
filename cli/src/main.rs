use clap::Parser;
use stackgen::generate::GenerateCommand;
use stackgen::logger::Logger;
use stackgen::runner::{Runnable, Runner};

#[derive(Parser)]
#[command(
    name = "stackgen",
    version,
    about = "Generate the CloudFormation template of a single-instance web server",
    long_about = "Generates a CloudFormation template with an EC2 instance bootstrapped by ansible-pull, \
its IAM role and a security group open only to your current public IP, and prints it to stdout."
)]
struct Cli {
    #[command(flatten)]
    generate: GenerateCommand,
}

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("Failed to install error report handler: {e}");
    }

    Logger::init();
    let cli = Cli::parse();

    let mut runner = cli.generate.runner();

    if let Err(error) = runner.run() {
        eprintln!("\n{}\n{error}", console::style("Error").red().bold());
        std::process::exit(1);
    }
}
