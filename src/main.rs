use std::io;
use ish::config::ConfigLoader;
use ish::environment::Environment;
use ish::executor::ForkExecutor;
use ish::io::LineReader;
use ish::jobs::JobTable;
use ish::prompt::ShellPrompt;
use ish::repl::Shell;
use ish::{logging, signal};

static JOBS: JobTable = JobTable::new();

fn main() {
    let config = ConfigLoader::load();
    logging::init(config.log_level);
    log::debug!("configuration: {:?}", config);

    if let Err(e) = signal::install(&JOBS, config.quit_window_secs) {
        eprintln!("ish: cannot install signal handlers: {}", e.desc());
        std::process::exit(1);
    }

    let mut reader = LineReader::open(config.startup_file.as_deref());
    let mut shell = Shell::new(
        ForkExecutor::new(&JOBS),
        Environment::new(),
        &JOBS,
        signal::notices(),
        ShellPrompt::new(&config.prompt),
    );
    let code = shell.run(&mut reader, &mut io::stdout());
    std::process::exit(code);
}
