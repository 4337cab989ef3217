mod app;
use app::{App, Args};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    app::init_tracing(args.verbose);

    let app = App::new(args)?;
    app.run()?;

    Ok(())
}
