use passive_fill_sim::cli::run_cli;

fn main() -> anyhow::Result<()> {
    run_cli()
}
