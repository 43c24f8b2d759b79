use std::fmt::Display;
use std::io;
use std::process::ExitCode;
use std::rc::Rc;

use appdata_native::ScopedNativeFs;
use file_manager_app::config::default_config_path;
use file_manager_app::logging::init_logging;
use file_manager_app::{AppDataFiles, ConfigLoader, FileManagerConfig, FileManagerSession, Screen};
use futures::executor::block_on;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Display>> {
    let config = match default_config_path() {
        Some(path) => ConfigLoader::<FileManagerConfig>::new(path)
            .load_or_default()
            .map_err(boxed)?,
        None => FileManagerConfig::default(),
    };
    init_logging(&config.log_filter);

    let root = config.resolve_root().map_err(boxed)?;
    let host = ScopedNativeFs::from_root(&root).map_err(boxed)?;
    tracing::info!(root = %host.root().display(), "app-data root ready");

    let files = AppDataFiles::new(Rc::new(host));
    block_on(async {
        files.ensure_root().await.map_err(boxed)?;
        let session = FileManagerSession::open(files).await.map_err(boxed)?;
        let mut screen = Screen::new(session, io::stdout().lock());
        screen.run(io::stdin().lock()).await.map_err(boxed)
    })
}

fn boxed<E: Display + 'static>(err: E) -> Box<dyn Display> {
    Box::new(err)
}
