use anyhow::Result;

fn main() -> Result<()> {
    brew_setup_generator::run()
}
