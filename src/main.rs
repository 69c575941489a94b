use anyhow::Result;
use havadurumu_core::{App, AppError};

fn main() -> Result<()> {
    // Initialize core
    havadurumu_core::init()?;

    // Missing API key or a malformed overrides file aborts before any window opens
    let mut app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            eprintln!("{}", e.user_message());
            return Err(e.into());
        }
    };

    tracing::info!("Havadurumu application started");

    let exit_code = match havadurumu_ui::run(app.shared_config()) {
        Ok(code) => code,
        Err(e) => {
            let e = AppError::from(e);
            tracing::error!("UI failed: {}", e);
            eprintln!("{}", e.user_message());
            app.shutdown();
            return Err(e.into());
        }
    };

    // Graceful shutdown
    app.shutdown();

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
