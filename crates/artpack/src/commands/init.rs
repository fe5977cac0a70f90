use crate::println_pad;
use crate::utils::config::write_template;
use camino::Utf8PathBuf;
use colored::Colorize;

#[derive(Debug, Clone)]
pub struct InitConfigArgs {
    pub output: Utf8PathBuf,
    pub force: bool,
}

pub fn init_config(args: InitConfigArgs) -> miette::Result<()> {
    write_template(&args.output, args.force)?;

    println_pad!(
        "{}\n{} {}",
        "Configuration created!".bright_green().bold(),
        "Location:".bright_green(),
        args.output.as_str().bright_white().bold()
    );
    println_pad!(
        "{}",
        "Fill in pack_paths and pack_labels, then run `artpack merge`.".dimmed()
    );

    Ok(())
}
