use taskdeck::cli::run;

fn main() {
    #[cfg(windows)]
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        if taskdeck::error::is_user_error(&e) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }

        // Anything else is a storage or environment failure
        eprintln!("Internal error: {}", e);
        let mut source = e.source();
        if source.is_some() {
            eprintln!("\nCaused by:");
            let mut indent = 1;
            while let Some(err) = source {
                eprintln!("{:indent$}  {}", "", err);
                source = err.source();
                indent += 1;
            }
        }
        std::process::exit(2);
    }
}
