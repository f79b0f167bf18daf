//! sevenbench binary entry point.

fn main() -> anyhow::Result<()> {
    sevenbench_cli::run()
}
