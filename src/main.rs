use std::io;
use std::process::ExitCode;

use chrono::Local;
use streamgrab::browser::ChromeLauncher;
use streamgrab::cli::{self, Args, Flags};
use streamgrab::config::Config;
use streamgrab::error::Result;
use streamgrab::pipeline::Grabber;
use streamgrab::request::DownloadRequest;
use streamgrab::ytdlp::{ProcessResult, YtDlp};
use streamgrab::{input, logging, ui};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_flags(std::env::args_os()) {
        Flags::Help => {
            cli::print_help();
            return ExitCode::SUCCESS;
        }
        Flags::Exit(err) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Flags::Invalid(err) => {
            let _ = err.print();
            cli::print_help();
            println!("Falling back to interactive mode.");
            None
        }
        Flags::Interactive => None,
        Flags::Parsed(args) => Some(args),
    };

    logging::init_tracing(args.as_ref().map_or(false, |a| a.verbose));
    ui::banner();

    let config = args.as_ref().map(Args::to_config).unwrap_or_default();
    let request = match resolve_request(args.as_ref()) {
        Ok(request) => request,
        Err(err) => {
            ui::error(err.to_string());
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(?request, "resolved request");

    let code = match download(config, &request).await {
        Ok(result) if result.succeeded => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            ui::error(err.to_string());
            ExitCode::FAILURE
        }
    };
    ui::status("Process finished.");
    code
}

fn resolve_request(args: Option<&Args>) -> Result<DownloadRequest> {
    input::resolve(args, &mut io::stdin().lock(), &mut io::stdout(), Local::now())
}

async fn download(config: Config, request: &DownloadRequest) -> Result<ProcessResult> {
    let downloader = YtDlp::new(config.downloader.clone());
    let grabber = Grabber::new(ChromeLauncher, downloader, config);
    grabber.run(request).await
}
