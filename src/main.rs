use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let app = gander::default();
    app.run();

    Ok(())
}
