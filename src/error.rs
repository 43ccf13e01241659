//! Process-wide error reporting

/// Install color-eyre and route panics through tracing
pub fn install_error_handlers() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // color-eyre installs its own hook; route panics through tracing as well
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Some(location) = panic_info.location() {
            tracing::error!(
                message = %panic_info,
                panic.file = location.file(),
                panic.line = location.line(),
                panic.column = location.column(),
                "Application panic"
            );
        } else {
            tracing::error!(message = %panic_info, "Application panic");
        }

        default_hook(panic_info);
    }));

    Ok(())
}
